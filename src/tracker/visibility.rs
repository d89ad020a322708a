//! The set of elements currently visible in the viewport.

use crate::host::IntersectionEntry;
use crate::model::{NodeId, TrackerError};
use std::collections::HashMap;
use tracing::trace;

/// Minimum intersection ratio for an element to count as visible.
///
/// # Invariants
/// - `0.0 < value <= 1.0`
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Threshold(f64);

impl Threshold {
    /// Three quarters of the element inside the viewport.
    pub const DEFAULT: Self = Self(0.75);

    /// Validate `value` against `(0, 1]`.
    pub fn new(value: f64) -> Result<Self, TrackerError> {
        if value > 0.0 && value <= 1.0 {
            Ok(Self(value))
        } else {
            Err(TrackerError::InvalidThreshold(value))
        }
    }

    /// The ratio as a plain number.
    pub fn get(self) -> f64 {
        self.0
    }

    /// `ratio >= threshold`. NaN never meets it.
    pub fn is_met(self, ratio: f64) -> bool {
        ratio >= self.0
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Elements entering and leaving the set during one batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VisibilityDelta {
    /// Elements added to the set.
    pub entered: usize,
    /// Elements removed from the set.
    pub left: usize,
}

/// Elements whose most recent intersection report met the threshold.
///
/// Add, remove and contains are O(1). Iteration follows the order in which
/// elements entered the set; an element that leaves and re-enters moves to the
/// end.
#[derive(Debug, Clone, Default)]
pub struct VisibilitySet {
    members: HashMap<NodeId, u64>,
    next_seq: u64,
}

impl VisibilitySet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the element was not already visible.
    pub fn insert(&mut self, node: NodeId) -> bool {
        if self.members.contains_key(&node) {
            return false;
        }
        self.members.insert(node, self.next_seq);
        self.next_seq += 1;
        true
    }

    /// Returns `true` if the element was visible.
    pub fn remove(&mut self, node: NodeId) -> bool {
        self.members.remove(&node).is_some()
    }

    /// Whether `node` is visible.
    pub fn contains(&self, node: NodeId) -> bool {
        self.members.contains_key(&node)
    }

    /// Number of visible elements.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// No element is visible.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Members in the order they entered the set.
    pub fn iter(&self) -> impl Iterator<Item = NodeId> {
        let mut ordered: Vec<(NodeId, u64)> =
            self.members.iter().map(|(node, seq)| (*node, *seq)).collect();
        ordered.sort_unstable_by_key(|(_, seq)| *seq);
        ordered.into_iter().map(|(node, _)| node)
    }

    /// Apply one batch of intersection reports in order.
    pub fn apply(&mut self, batch: &[IntersectionEntry], threshold: Threshold) -> VisibilityDelta {
        let mut delta = VisibilityDelta::default();
        for entry in batch {
            if threshold.is_met(entry.ratio) {
                if self.insert(entry.target) {
                    trace!(node = %entry.target, ratio = entry.ratio, "entered viewport");
                    delta.entered += 1;
                }
            } else if self.remove(entry.target) {
                trace!(node = %entry.target, ratio = entry.ratio, "left viewport");
                delta.left += 1;
            }
        }
        delta
    }
}
