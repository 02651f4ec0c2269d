//! Media playback state types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::platform::Rect;

/// Counters kept across polls
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaybackStats {
    /// Number of polls that found active playback
    pub detection_count: u64,
    /// When playback last started or stopped
    pub last_state_change: Option<DateTime<Utc>>,
}

/// Whether video is the user's current activity.
///
/// Re-evaluated on the poll interval and mutated in place; no history beyond
/// the counters is retained.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaPlaybackState {
    pub is_video_playing: bool,
    pub is_fullscreen: bool,
    /// Video occupies more than half the viewport in either dimension
    pub is_main_content: bool,
    /// Bounding box of the playing video, if one was located
    pub video_bounds: Option<Rect>,
    pub stats: PlaybackStats,
}

impl MediaPlaybackState {
    /// Snapshot of the fields embedded in engagement results
    pub fn summary(&self) -> MediaStateSummary {
        MediaStateSummary {
            is_video_playing: self.is_video_playing,
            is_fullscreen: self.is_fullscreen,
            is_main_content: self.is_main_content,
        }
    }
}

/// The playback flags carried on every engagement result
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaStateSummary {
    pub is_video_playing: bool,
    pub is_fullscreen: bool,
    pub is_main_content: bool,
}

/// Gaze-derived payload from a page-context video analyzer, consumed opaquely
/// by the fusion engine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VideoReading {
    pub timestamp: DateTime<Utc>,
    /// 0 = closed, 1 = fully open
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eye_openness: Option<f64>,
    /// 0 = away, 1 = on screen
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attention: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state_is_inert() {
        let state = MediaPlaybackState::default();
        assert!(!state.is_video_playing);
        assert!(!state.is_fullscreen);
        assert!(!state.is_main_content);
        assert!(state.video_bounds.is_none());
        assert_eq!(state.stats.detection_count, 0);
    }

    #[test]
    fn test_video_reading_optional_fields() {
        let json = r#"{ "timestamp": "2024-03-10T09:00:00Z", "eye_openness": 0.25 }"#;
        let reading: VideoReading = serde_json::from_str(json).unwrap();
        assert_eq!(reading.eye_openness, Some(0.25));
        assert_eq!(reading.attention, None);
    }
}
