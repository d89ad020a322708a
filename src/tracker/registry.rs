//! Active intersection registrations.

use crate::host::IntersectionFacility;
use crate::model::NodeId;
use std::collections::HashSet;
use tracing::{trace, warn};

/// Elements currently observed for intersection.
///
/// # Invariants
/// - Each element holds at most one registration; the host never sees a
///   second `observe` for an element already registered here.
/// - Revoking an element that holds no registration changes nothing.
#[derive(Debug, Clone, Default)]
pub struct WatchRegistry {
    active: HashSet<NodeId>,
}

impl WatchRegistry {
    /// A registry with nothing watched.
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin observing `target`. Returns `false` (and skips the host call) if
    /// it is already registered.
    pub fn watch<F: IntersectionFacility + ?Sized>(
        &mut self,
        facility: &mut F,
        target: NodeId,
    ) -> bool {
        if !self.active.insert(target) {
            warn!(node = %target, "element already watched, skipping second registration");
            return false;
        }
        facility.observe_intersection(target);
        trace!(node = %target, "watching");
        true
    }

    /// Stop observing `target`.
    ///
    /// The host is always told to unobserve. Returns whether a registration
    /// was actually revoked.
    pub fn unwatch<F: IntersectionFacility + ?Sized>(
        &mut self,
        facility: &mut F,
        target: NodeId,
    ) -> bool {
        facility.unobserve_intersection(target);
        let revoked = self.active.remove(&target);
        trace!(node = %target, revoked, "unwatching");
        revoked
    }

    /// Whether `target` is registered.
    pub fn contains(&self, target: NodeId) -> bool {
        self.active.contains(&target)
    }

    /// Number of registrations.
    pub fn len(&self) -> usize {
        self.active.len()
    }

    /// Nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}
