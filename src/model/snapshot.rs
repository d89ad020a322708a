//! Content snapshot: tag -> visible text captured at one point in time.

use super::element::Tag;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Text content of the visible elements, grouped by tag.
///
/// Built fresh on every capture and handed to the snapshot callback. A tag key
/// exists only if at least one visible element with that tag contributed text,
/// so an empty snapshot serializes as `{}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentSnapshot(BTreeMap<Tag, Vec<String>>);

impl ContentSnapshot {
    /// An empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `text` to the sequence for `tag`, creating the key if needed.
    pub fn push(&mut self, tag: Tag, text: impl Into<String>) {
        self.0.entry(tag).or_default().push(text.into());
    }

    /// Texts recorded for `tag`, looked up case-insensitively.
    pub fn texts(&self, tag: &str) -> Option<&[String]> {
        let tag = Tag::new(tag).ok()?;
        self.0.get(&tag).map(Vec::as_slice)
    }

    /// Number of distinct tags.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// No tag contributed text.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total number of text entries across all tags.
    pub fn text_count(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    /// Tags in sorted order with their texts in capture order.
    pub fn iter(&self) -> impl Iterator<Item = (&Tag, &[String])> {
        self.0.iter().map(|(tag, texts)| (tag, texts.as_slice()))
    }
}
