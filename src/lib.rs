//! Engagemetry - On-device compute engine for learner engagement signals
//!
//! Engagemetry transforms raw interaction signals (pointer movement, captured
//! audio, media playback context) into a fused engagement result through a
//! deterministic pipeline: signal capture → metric derivation → rule-based
//! classification → context-sensitive fusion → report encoding.
//!
//! ## Modules
//!
//! - **Cursor Tracker**: Pointer samples into speed/jitter/idle metrics
//! - **Audio Detector**: Audio chunks into emotion and engagement labels
//! - **Video Monitor**: Page snapshots into media playback state
//! - **Analyzer**: Fuses all sources into a scored engagement result

pub mod analyzer;
pub mod audio;
pub mod config;
pub mod cursor;
pub mod error;
pub mod platform;
pub mod report;
pub mod session;
pub mod sink;
pub mod transport;
pub mod video;

pub use analyzer::{EngagementAnalyzer, EngagementResult, EngagementState};
pub use audio::{AudioEmotionDetector, AudioFeatureReading};
pub use config::TrackerConfig;
pub use cursor::{CursorReading, CursorTracker};
pub use error::EngageError;
pub use session::EngagementSession;
pub use sink::EngagementStore;
pub use video::{MediaPlaybackState, VideoPlaybackMonitor};

/// Engine version embedded in all report payloads
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for report payloads
pub const PRODUCER_NAME: &str = "engagemetry";
