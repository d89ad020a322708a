//! Keeps intersection registrations in sync with structural changes.
//!
//! Added element nodes with an allowed tag are watched; removed nodes are
//! unwatched unconditionally. Only the added node itself is considered, its
//! descendants are not walked, and its style is not checked (unlike the
//! initial scan).

use super::eligibility::TagFilter;
use super::registry::WatchRegistry;
use crate::host::{Document, IntersectionFacility, MutationKind, MutationRecord};
use tracing::trace;

/// What one batch of mutation records did to the registry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MutationSummary {
    /// Added nodes that received a registration.
    pub watched: usize,
    /// Removed nodes whose registration was revoked.
    pub unwatched: usize,
    /// Added nodes that were not eligible or already registered.
    pub skipped: usize,
}

/// Apply a batch of mutation records in reported order.
pub fn apply_mutations<H>(
    host: &mut H,
    registry: &mut WatchRegistry,
    filter: &TagFilter,
    batch: &[MutationRecord],
) -> MutationSummary
where
    H: Document + IntersectionFacility + ?Sized,
{
    let mut summary = MutationSummary::default();

    for record in batch {
        if record.kind != MutationKind::ChildList {
            trace!(kind = ?record.kind, target = %record.target, "ignoring non-structural record");
            continue;
        }

        for &node in &record.added {
            if filter.admits_inserted(&*host, node) && registry.watch(&mut *host, node) {
                summary.watched += 1;
            } else {
                summary.skipped += 1;
            }
        }

        for &node in &record.removed {
            if registry.unwatch(&mut *host, node) {
                summary.unwatched += 1;
            }
        }
    }

    summary
}

#[cfg(test)]
#[path = "mutation_tests.rs"]
mod tests;
