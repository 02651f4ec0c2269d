//! Media playback monitoring module
//!
//! Determines whether video is the user's current activity from periodic page
//! snapshots: visibility geometry, native playback state, player-container
//! and streaming-domain fallbacks, fullscreen, and main-content
//! classification. The answer flips the sign of cursor idleness in the
//! fusion engine.

pub mod monitor;
pub mod types;

pub use monitor::VideoPlaybackMonitor;
pub use types::{MediaPlaybackState, MediaStateSummary, PlaybackStats, VideoReading};
