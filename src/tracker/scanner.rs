//! Initial scan of the document for trackable elements.

use super::eligibility::TagFilter;
use crate::host::Document;
use crate::model::NodeId;
use std::time::Instant;
use tracing::{debug, trace};

/// Walk the body's element children depth-first and return every eligible
/// element in document order.
///
/// Ineligible nodes are pruned: none of their descendants are visited. Each
/// call is a fresh traversal.
pub fn scan<D: Document + ?Sized>(doc: &D, filter: &TagFilter) -> Vec<NodeId> {
    let started = Instant::now();

    let Some(body) = doc.body() else {
        debug!("document has no body, nothing to scan");
        return Vec::new();
    };

    let mut eligible = Vec::new();
    let mut stack: Vec<NodeId> = doc.element_children(body).into_iter().rev().collect();
    while let Some(node) = stack.pop() {
        if !filter.admits_scanned(doc, node) {
            trace!(%node, "pruned from scan");
            continue;
        }
        eligible.push(node);
        stack.extend(doc.element_children(node).into_iter().rev());
    }

    debug!(
        count = eligible.len(),
        elapsed_us = started.elapsed().as_micros() as u64,
        "initial scan complete"
    );
    eligible
}
