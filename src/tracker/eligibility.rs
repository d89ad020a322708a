//! Which elements qualify for intersection tracking.
//!
//! Two rules exist on purpose:
//! - the initial scan checks the tag, `display` and `position`;
//! - dynamically inserted nodes are checked for being an element with an
//!   allowed tag only. Their style is never consulted.

use crate::host::Document;
use crate::model::{NodeId, NodeKind, Tag};
use std::collections::HashSet;
use tracing::warn;

/// Tags whose content is never tracked.
pub const DEFAULT_EXCLUDED_TAGS: [&str; 8] = [
    "noscript", "script", "object", "embed", "img", "iframe", "audio", "video",
];

/// Set of excluded tags plus the eligibility checks built on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagFilter {
    excluded: HashSet<Tag>,
}

impl TagFilter {
    /// Exclude exactly `excluded`.
    pub fn new(excluded: impl IntoIterator<Item = Tag>) -> Self {
        Self {
            excluded: excluded.into_iter().collect(),
        }
    }

    /// Build from raw tag names, skipping (and logging) invalid ones.
    pub fn from_names<S: AsRef<str>>(names: impl IntoIterator<Item = S>) -> Self {
        let excluded = names
            .into_iter()
            .filter_map(|name| match Tag::new(name.as_ref()) {
                Ok(tag) => Some(tag),
                Err(err) => {
                    warn!(name = name.as_ref(), %err, "ignoring invalid excluded tag");
                    None
                }
            })
            .collect();
        Self { excluded }
    }

    /// Whether `tag` is not excluded.
    pub fn allows(&self, tag: &Tag) -> bool {
        !self.excluded.contains(tag)
    }

    /// Number of excluded tags.
    pub fn len(&self) -> usize {
        self.excluded.len()
    }

    /// Nothing is excluded.
    pub fn is_empty(&self) -> bool {
        self.excluded.is_empty()
    }

    /// Initial-scan rule: allowed tag, not `display: none`, not `position: fixed`.
    ///
    /// A node failing this check is pruned together with its descendants.
    pub fn admits_scanned<D: Document + ?Sized>(&self, doc: &D, node: NodeId) -> bool {
        let Some(tag) = doc.tag(node) else {
            return false;
        };
        if !self.allows(tag) {
            return false;
        }
        let style = doc.computed_style(node);
        !style.is_hidden() && !style.is_fixed()
    }

    /// Insertion rule: an element node with an allowed tag.
    pub fn admits_inserted<D: Document + ?Sized>(&self, doc: &D, node: NodeId) -> bool {
        if doc.kind(node) != Some(NodeKind::Element) {
            return false;
        }
        doc.tag(node).is_some_and(|tag| self.allows(tag))
    }
}

impl Default for TagFilter {
    fn default() -> Self {
        Self::from_names(DEFAULT_EXCLUDED_TAGS)
    }
}
