//! Domain model types (pure).
//!
//! Handles, style values, timestamps and the snapshot produced by a capture.

pub mod element;
pub mod error;
pub mod snapshot;
pub mod time;

pub use element::{ComputedStyle, Display, InvalidTag, NodeId, NodeKind, Position, Tag};
pub use error::{AppError, Facility, TrackerError};
pub use snapshot::ContentSnapshot;
pub use time::Millis;
