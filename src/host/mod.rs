//! Host environment seams.
//!
//! The tracker never talks to a browser directly. Everything it needs (the
//! document tree, intersection and mutation reporting, event listening) comes
//! through the traits in this module, and the host delivers observation
//! batches back through [`ObserverCallbacks`].
//!
//! [`memory::MemoryHost`] is an in-memory implementation used by tests and by
//! the replay harness.

pub mod memory;
pub mod records;

use crate::model::{ComputedStyle, NodeId, NodeKind, Tag};
use serde::{Deserialize, Serialize};
use std::fmt;

pub use memory::{CommentSpec, ElementSpec, MemoryHost, MemoryHostError, NodeSpec, TextSpec};
pub use records::{IntersectionEntry, MutationKind, MutationRecord};

/// Read access to the live document tree.
pub trait Document {
    /// The `<body>` element, if the document has one.
    fn body(&self) -> Option<NodeId>;

    /// Node type, or `None` for a handle the document does not know.
    fn kind(&self, node: NodeId) -> Option<NodeKind>;

    /// Tag of an element node. `None` for text, comments and unknown handles.
    fn tag(&self, node: NodeId) -> Option<&Tag>;

    /// Computed style; the default style for non-elements and unknown handles.
    fn computed_style(&self, node: NodeId) -> ComputedStyle;

    /// Element children in document order (text and comments excluded).
    fn element_children(&self, node: NodeId) -> Vec<NodeId>;

    /// Whether any direct child node is a text node.
    fn has_text_child(&self, node: NodeId) -> bool;

    /// Rendered text: whitespace collapsed, hidden content excluded.
    fn rendered_text(&self, node: NodeId) -> String;
}

/// Reports intersection-ratio changes of observed elements with the viewport.
pub trait IntersectionFacility {
    /// Start reporting for `target`. Observing twice is undefined by hosts,
    /// callers must not do it.
    fn observe_intersection(&mut self, target: NodeId);

    /// Stop reporting for `target`. A no-op if it was never observed.
    fn unobserve_intersection(&mut self, target: NodeId);
}

/// Options for structural mutation reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MutationObserverInit {
    /// Report child additions and removals.
    pub child_list: bool,
    /// Report for every descendant of the root, not just its children.
    pub subtree: bool,
    /// Report attribute changes.
    pub attributes: bool,
}

impl MutationObserverInit {
    /// Child additions/removals anywhere below the root, no attributes.
    pub const fn structural_subtree() -> Self {
        Self {
            child_list: true,
            subtree: true,
            attributes: false,
        }
    }
}

/// Reports structural changes below a root node.
pub trait MutationFacility {
    /// Start reporting changes below `root` as selected by `init`.
    fn observe_mutations(&mut self, root: NodeId, init: MutationObserverInit);
}

/// User interaction events that signal a possible change of what is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionKind {
    /// The document scrolled.
    Scroll,
    /// A click anywhere in the document.
    Click,
    /// The page finished loading.
    Load,
}

impl InteractionKind {
    /// Every kind the tracker listens for.
    pub const ALL: [InteractionKind; 3] = [
        InteractionKind::Scroll,
        InteractionKind::Click,
        InteractionKind::Load,
    ];
}

impl fmt::Display for InteractionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InteractionKind::Scroll => "scroll",
            InteractionKind::Click => "click",
            InteractionKind::Load => "load",
        };
        f.write_str(name)
    }
}

/// Event listener registration on the document.
pub trait EventTarget {
    /// Deliver events of `kind` to the tracker from now on.
    fn listen(&mut self, kind: InteractionKind);
}

/// Which observation facilities a host actually provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Intersection reporting is available.
    pub intersection: bool,
    /// Mutation reporting is available.
    pub mutation: bool,
}

impl Capabilities {
    /// Both facilities present.
    pub const fn full() -> Self {
        Self {
            intersection: true,
            mutation: true,
        }
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::full()
    }
}

/// Everything the tracker needs from its environment.
pub trait Host: Document + IntersectionFacility + MutationFacility + EventTarget {
    /// Facilities this host supports. Checked once by `start_tracking`.
    fn capabilities(&self) -> Capabilities {
        Capabilities::full()
    }
}

/// Receiver of observation batches, implemented by the tracker.
///
/// Entries are processed in the order the host reports them.
pub trait ObserverCallbacks {
    /// A batch of intersection-ratio changes.
    fn on_intersect(&mut self, batch: &[IntersectionEntry]);

    /// A batch of structural mutation records.
    fn on_mutate(&mut self, batch: &[MutationRecord]);
}
