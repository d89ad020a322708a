//! Scripted replay of a page session against the in-memory host.
//!
//! A [`Scenario`] describes the initial document and a timeline of steps
//! (interactions, ratio reports, tree edits). [`run`] plays the timeline
//! through a real [`ViewportTracker`] and returns every capture with the time
//! it fired.
//!
//! ```json
//! {
//!   "document": [{"tag": "p", "id": "a", "children": [{"text": "hello"}]}],
//!   "steps": [
//!     {"at": 0, "action": "intersect", "id": "a", "ratio": 0.9},
//!     {"at": 10, "action": "scroll"}
//!   ]
//! }
//! ```

use crate::config::TrackerConfig;
use crate::host::{Document, InteractionKind, MemoryHost, MemoryHostError, NodeSpec};
use crate::model::{ContentSnapshot, Millis, NodeId, TrackerError};
use crate::tracker::{start_tracking, SnapshotCallback, ViewportTracker};
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use thiserror::Error;
use tracing::{debug, info};

/// Failures loading or playing a scenario.
#[derive(Debug, Error)]
pub enum ReplayError {
    /// The scenario file could not be read.
    #[error("Failed to read scenario {path:?}: {source}")]
    Read {
        /// Scenario file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The scenario file is not a valid scenario.
    #[error("Invalid scenario {path:?}: {source}")]
    Parse {
        /// Scenario file.
        path: PathBuf,
        /// JSON error, with line and column.
        #[source]
        source: serde_json::Error,
    },

    /// A step names an id that is not (or no longer) in the document.
    #[error("Step at {at} refers to unknown element id {id:?}")]
    UnknownElement {
        /// Time of the failing step.
        at: Millis,
        /// The unresolved DOM id.
        id: String,
    },

    /// The document or an edit to it is invalid.
    #[error("Document error: {0}")]
    Document(#[from] MemoryHostError),

    /// The tracker refused to start.
    #[error(transparent)]
    Tracker(#[from] TrackerError),
}

/// Initial document plus a timeline of steps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    /// Children of `<body>`.
    #[serde(default)]
    pub document: Vec<NodeSpec>,

    /// Timeline, in any order.
    #[serde(default)]
    pub steps: Vec<Step>,

    /// Run the clock to here after the last step. Defaults to the last
    /// pending capture deadline.
    #[serde(default)]
    pub until: Option<Millis>,
}

impl Scenario {
    /// Read a JSON scenario from `path`.
    pub fn load(path: &Path) -> Result<Self, ReplayError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ReplayError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| ReplayError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// One timed action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// When the action happens.
    pub at: Millis,
    /// What happens.
    #[serde(flatten)]
    pub action: Action,
}

/// Things a scenario can do to the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    /// A scroll event.
    Scroll,
    /// A click event.
    Click,
    /// A load event.
    Load,
    /// Report an intersection ratio for an element.
    Intersect {
        /// DOM id of the element.
        id: String,
        /// New intersection ratio.
        ratio: f64,
    },
    /// Append a subtree under `parent` (the body when absent).
    Append {
        /// DOM id of the new parent.
        #[serde(default)]
        parent: Option<String>,
        /// Subtree to build.
        node: NodeSpec,
    },
    /// Detach an element and its subtree.
    Remove {
        /// DOM id of the element.
        id: String,
    },
}

/// One capture produced during a replay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Capture {
    /// When the quiet period ran out.
    pub at: Millis,
    /// Snapshot handed to the callback.
    pub content: ContentSnapshot,
}

/// Play `scenario` through a fresh tracker.
///
/// Steps run in time order (ties keep file order). Before each step the clock
/// advances to the step's time, firing any capture that came due on the way;
/// after each step the host's queued batches are delivered.
pub fn run(scenario: &Scenario, config: &TrackerConfig) -> Result<Vec<Capture>, ReplayError> {
    let host = MemoryHost::new(scenario.document.iter().cloned())?;

    let clock = Rc::new(Cell::new(Millis::ZERO));
    let captures: Rc<RefCell<Vec<Capture>>> = Rc::new(RefCell::new(Vec::new()));
    let callback: SnapshotCallback = {
        let clock = Rc::clone(&clock);
        let captures = Rc::clone(&captures);
        Box::new(move |content| {
            captures.borrow_mut().push(Capture {
                at: clock.get(),
                content,
            });
        })
    };

    let mut tracker = start_tracking(host, config, Some(callback))?;

    let mut steps: Vec<&Step> = scenario.steps.iter().collect();
    steps.sort_by_key(|step| step.at);

    for step in steps {
        advance(&mut tracker, &clock, step.at);
        apply(&mut tracker, step)?;
        tracker.deliver_pending();
    }

    let end = scenario
        .until
        .or_else(|| tracker.next_deadline())
        .unwrap_or_else(|| clock.get());
    advance(&mut tracker, &clock, end);

    drop(tracker);
    let captures = captures.take();
    info!(captures = captures.len(), "replay finished");
    Ok(captures)
}

/// Move the clock to `to`, firing due captures at their own deadlines.
fn advance(tracker: &mut ViewportTracker<MemoryHost>, clock: &Cell<Millis>, to: Millis) {
    while let Some(deadline) = tracker.next_deadline() {
        if deadline > to {
            break;
        }
        clock.set(deadline);
        tracker.tick(deadline);
    }
    if to > clock.get() {
        clock.set(to);
    }
}

fn apply(tracker: &mut ViewportTracker<MemoryHost>, step: &Step) -> Result<(), ReplayError> {
    debug!(at = %step.at, action = ?step.action, "replay step");
    match &step.action {
        Action::Scroll => interact(tracker, InteractionKind::Scroll, step.at),
        Action::Click => interact(tracker, InteractionKind::Click, step.at),
        Action::Load => interact(tracker, InteractionKind::Load, step.at),
        Action::Intersect { id, ratio } => {
            let node = resolve(tracker, id, step.at)?;
            tracker.host_mut().set_ratio(node, *ratio);
        }
        Action::Append { parent, node } => {
            let parent = match parent {
                Some(id) => resolve(tracker, id, step.at)?,
                None => tracker
                    .host()
                    .body()
                    .ok_or_else(|| ReplayError::UnknownElement {
                        at: step.at,
                        id: "body".to_string(),
                    })?,
            };
            tracker.host_mut().append_child(parent, node)?;
        }
        Action::Remove { id } => {
            let node = resolve(tracker, id, step.at)?;
            tracker.host_mut().remove(node)?;
        }
    }
    Ok(())
}

fn interact(tracker: &mut ViewportTracker<MemoryHost>, kind: InteractionKind, at: Millis) {
    if tracker.host().is_listening(kind) {
        tracker.on_interaction(kind, at);
    }
}

fn resolve(
    tracker: &ViewportTracker<MemoryHost>,
    id: &str,
    at: Millis,
) -> Result<NodeId, ReplayError> {
    tracker
        .host()
        .lookup(id)
        .ok_or_else(|| ReplayError::UnknownElement {
            at,
            id: id.to_string(),
        })
}

#[cfg(test)]
#[path = "replay_tests.rs"]
mod tests;
