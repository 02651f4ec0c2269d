//! Engagement fusion module
//!
//! The sole decision point combining cursor, audio, and gaze signals with
//! media playback context into one reportable result. Scoring is additive
//! and context-sensitive: cursor idleness is a negative signal on a normal
//! page and a positive one while video plays.

pub mod engine;
pub mod scoring;
pub mod types;

pub use engine::EngagementAnalyzer;
pub use types::{
    AlertLevel, AlertSource, Confidence, EngagementAlert, EngagementBand, EngagementResult,
    EngagementState, VideoEngagementDetail,
};
