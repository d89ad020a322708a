//! Serialization of the visibility set into a content snapshot.

use super::visibility::VisibilitySet;
use crate::host::Document;
use crate::model::ContentSnapshot;
use std::time::Instant;
use tracing::debug;

/// Build a snapshot from the currently visible elements.
///
/// An element contributes its rendered text under its tag if it has at least
/// one direct text child and the rendered text is non-empty. Everything else
/// contributes nothing, not even an empty tag key.
pub fn capture<D: Document + ?Sized>(doc: &D, visible: &VisibilitySet) -> ContentSnapshot {
    let started = Instant::now();
    let mut snapshot = ContentSnapshot::new();

    for node in visible.iter() {
        let Some(tag) = doc.tag(node) else {
            continue;
        };
        if !doc.has_text_child(node) {
            continue;
        }
        let text = doc.rendered_text(node);
        if text.is_empty() {
            continue;
        }
        snapshot.push(tag.clone(), text);
    }

    debug!(
        visible = visible.len(),
        texts = snapshot.text_count(),
        elapsed_us = started.elapsed().as_micros() as u64,
        "captured visible content"
    );
    snapshot
}
