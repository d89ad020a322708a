//! Viewport visibility tracker (vistrack)
//!
//! Tracks which elements of a document are visible in the viewport, keeps
//! that set current as the document changes, and captures the visible text
//! once user interaction settles.
//!
//! The tracker talks to its environment only through the traits in [`host`],
//! so a browser binding, a headless renderer or the in-memory
//! [`host::MemoryHost`] can drive it.

pub mod config;
pub mod host;
pub mod logging;
pub mod model;
pub mod replay;
pub mod tracker;

pub use tracker::{start_tracking, SnapshotCallback, ViewportTracker};
