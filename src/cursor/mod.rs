//! Cursor tracking module
//!
//! Converts raw pointer movement into engagement-relevant metrics: speed over
//! a short rolling window, jitter from direction reversals, and idle time.
//!
//! Pipeline: pointer events → ring buffer → metrics → classified reading

pub mod metrics;
pub mod tracker;
pub mod types;

pub use tracker::{CursorTracker, TrackerStats};
pub use types::{
    ActivityLevel, AttentionState, CursorEngagement, CursorMetrics, CursorPosition, CursorReading,
    CursorSample, FocusQuality, IdleState,
};
