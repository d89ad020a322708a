//! Observation records delivered by the host.

use crate::model::NodeId;

/// One intersection-ratio report for an observed element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionEntry {
    /// The observed element.
    pub target: NodeId,
    /// Fraction of the element's box inside the viewport, `0.0..=1.0`.
    pub ratio: f64,
}

impl IntersectionEntry {
    /// Report `ratio` for `target`.
    pub fn new(target: NodeId, ratio: f64) -> Self {
        Self { target, ratio }
    }
}

/// What a [`MutationRecord`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    /// Children were added or removed.
    ChildList,
    /// An attribute changed.
    Attributes,
    /// Text or comment data changed.
    CharacterData,
}

/// One structural change reported by the mutation facility.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    /// Kind of change.
    pub kind: MutationKind,
    /// Node whose children changed.
    pub target: NodeId,
    /// Nodes inserted under `target`, in order.
    pub added: Vec<NodeId>,
    /// Nodes taken out of `target`, in order.
    pub removed: Vec<NodeId>,
}

impl MutationRecord {
    /// A child-list record.
    pub fn child_list(target: NodeId, added: Vec<NodeId>, removed: Vec<NodeId>) -> Self {
        Self {
            kind: MutationKind::ChildList,
            target,
            added,
            removed,
        }
    }

    /// An attribute record for `target`.
    pub fn attributes(target: NodeId) -> Self {
        Self {
            kind: MutationKind::Attributes,
            target,
            added: Vec::new(),
            removed: Vec::new(),
        }
    }
}
