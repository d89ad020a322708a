//! Viewport visibility tracker.
//!
//! [`start_tracking`] scans the document, watches every eligible element for
//! intersection, registers for structural mutations and for interaction
//! events, and returns the running [`ViewportTracker`]. From then on the host
//! drives it:
//!
//! - intersection batches -> [`ObserverCallbacks::on_intersect`]
//! - mutation batches -> [`ObserverCallbacks::on_mutate`]
//! - scroll/click/load -> [`ViewportTracker::on_interaction`]
//! - clock movement -> [`ViewportTracker::tick`]
//!
//! Once interaction has been quiet for the configured period, a
//! [`ContentSnapshot`] is built and handed to the snapshot callback.

pub mod debounce;
pub mod eligibility;
pub mod mutation;
pub mod registry;
pub mod scanner;
pub mod snapshot;
pub mod visibility;

pub use debounce::{DebounceState, Debouncer, DEFAULT_QUIET_PERIOD};
pub use eligibility::{TagFilter, DEFAULT_EXCLUDED_TAGS};
pub use mutation::MutationSummary;
pub use registry::WatchRegistry;
pub use visibility::{Threshold, VisibilityDelta, VisibilitySet};

use crate::config::TrackerConfig;
use crate::host::{
    Host, InteractionKind, IntersectionEntry, MemoryHost, MutationObserverInit, MutationRecord,
    ObserverCallbacks,
};
use crate::model::{ContentSnapshot, Facility, Millis, TrackerError};
use tracing::{debug, info, trace, warn};

/// Receives every snapshot captured after interaction settles.
pub type SnapshotCallback = Box<dyn FnMut(ContentSnapshot)>;

/// Start tracking visible content on `host`.
///
/// Without a callback every capture is dumped as pretty JSON at `info` level.
///
/// # Errors
///
/// - [`TrackerError::UnsupportedHost`] if the host lacks intersection or
///   mutation reporting
/// - [`TrackerError::InvalidThreshold`] / [`TrackerError::InvalidQuietPeriod`]
///   for out-of-range settings
pub fn start_tracking<H: Host>(
    mut host: H,
    config: &TrackerConfig,
    on_snapshot: Option<SnapshotCallback>,
) -> Result<ViewportTracker<H>, TrackerError> {
    let threshold = Threshold::new(config.threshold)?;
    let debouncer = Debouncer::new(config.quiet_period())?;

    let capabilities = host.capabilities();
    if !capabilities.intersection {
        return Err(TrackerError::UnsupportedHost {
            facility: Facility::Intersection,
        });
    }
    if !capabilities.mutation {
        return Err(TrackerError::UnsupportedHost {
            facility: Facility::Mutation,
        });
    }

    for kind in InteractionKind::ALL {
        host.listen(kind);
    }

    let mut tracker = ViewportTracker {
        host,
        threshold,
        filter: TagFilter::from_names(&config.excluded_tags),
        visible: VisibilitySet::new(),
        registry: WatchRegistry::new(),
        debouncer,
        on_snapshot,
        captures: 0,
    };

    for node in scanner::scan(&tracker.host, &tracker.filter) {
        tracker.registry.watch(&mut tracker.host, node);
    }

    match tracker.host.body() {
        Some(body) => tracker
            .host
            .observe_mutations(body, MutationObserverInit::structural_subtree()),
        None => warn!("document has no body, structural changes will not be tracked"),
    }

    info!(
        watched = tracker.registry.len(),
        threshold = threshold.get(),
        quiet_period_ms = config.quiet_period_ms,
        "viewport tracking started"
    );
    Ok(tracker)
}

/// Owns the host and all tracking state for one page session.
pub struct ViewportTracker<H: Host> {
    host: H,
    threshold: Threshold,
    filter: TagFilter,
    visible: VisibilitySet,
    registry: WatchRegistry,
    debouncer: Debouncer,
    on_snapshot: Option<SnapshotCallback>,
    captures: u64,
}

impl<H: Host> ViewportTracker<H> {
    /// Record a user interaction at `now`, restarting the quiet period.
    ///
    /// A capture that was already due is flushed first.
    pub fn on_interaction(&mut self, kind: InteractionKind, now: Millis) {
        self.tick(now);
        self.debouncer.schedule(now);
        trace!(%kind, %now, "interaction, capture deferred");
    }

    /// Advance the clock to `now`; captures if the quiet period has elapsed.
    pub fn tick(&mut self, now: Millis) -> bool {
        if !self.debouncer.poll(now) {
            return false;
        }
        debug!(%now, "interaction settled");
        self.capture();
        true
    }

    /// Capture immediately and dispatch the snapshot.
    pub fn capture(&mut self) {
        let snapshot = self.snapshot();
        self.captures += 1;
        match self.on_snapshot.as_mut() {
            Some(callback) => callback(snapshot),
            None => dump_snapshot(&snapshot),
        }
    }

    /// Build a snapshot of the current visible content without dispatching it.
    pub fn snapshot(&self) -> ContentSnapshot {
        snapshot::capture(&self.host, &self.visible)
    }

    /// Deadline of the pending capture, for hosts that arm a real timer.
    pub fn next_deadline(&self) -> Option<Millis> {
        self.debouncer.next_deadline()
    }

    /// Snapshots dispatched so far.
    pub fn captures(&self) -> u64 {
        self.captures
    }

    /// Elements currently at or above the threshold.
    pub fn visible(&self) -> &VisibilitySet {
        &self.visible
    }

    /// Elements currently observed for intersection.
    pub fn registry(&self) -> &WatchRegistry {
        &self.registry
    }

    /// Threshold in effect.
    pub fn threshold(&self) -> Threshold {
        self.threshold
    }

    /// The host being tracked.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable access to the host, e.g. to edit an in-memory document.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }
}

impl<H: Host> ObserverCallbacks for ViewportTracker<H> {
    fn on_intersect(&mut self, batch: &[IntersectionEntry]) {
        let delta = self.visible.apply(batch, self.threshold);
        debug!(
            entries = batch.len(),
            entered = delta.entered,
            left = delta.left,
            visible = self.visible.len(),
            "intersection batch"
        );
    }

    fn on_mutate(&mut self, batch: &[MutationRecord]) {
        let summary =
            mutation::apply_mutations(&mut self.host, &mut self.registry, &self.filter, batch);
        debug!(
            records = batch.len(),
            watched = summary.watched,
            unwatched = summary.unwatched,
            skipped = summary.skipped,
            registered = self.registry.len(),
            "mutation batch"
        );
    }
}

impl ViewportTracker<MemoryHost> {
    /// Deliver everything the in-memory host has queued: mutation records
    /// first, then intersection entries.
    pub fn deliver_pending(&mut self) {
        let mutations = self.host.take_mutations();
        if !mutations.is_empty() {
            self.on_mutate(&mutations);
        }
        let entries = self.host.take_intersections();
        if !entries.is_empty() {
            self.on_intersect(&entries);
        }
    }
}

fn dump_snapshot(snapshot: &ContentSnapshot) {
    match serde_json::to_string_pretty(snapshot) {
        Ok(json) => info!(
            tags = snapshot.len(),
            texts = snapshot.text_count(),
            "the following text has been captured:\n{json}"
        ),
        Err(err) => warn!(%err, "failed to serialize snapshot"),
    }
}

#[cfg(test)]
#[path = "tracker_tests.rs"]
mod tests;
