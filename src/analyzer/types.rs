//! Engagement result types

use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::cursor::CursorReading;
use crate::video::types::MediaStateSummary;

/// How much source data backs the current result
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

/// Score band shared by the browsing and viewing label sets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngagementBand {
    Unknown,
    Disengaged,
    Passive,
    Engaged,
    HighlyEngaged,
}

impl EngagementBand {
    /// Band thresholds over the clamped 0-100 score
    pub fn from_score(score: i32) -> Self {
        if score < 30 {
            EngagementBand::Disengaged
        } else if score < 60 {
            EngagementBand::Passive
        } else if score < 85 {
            EngagementBand::Engaged
        } else {
            EngagementBand::HighlyEngaged
        }
    }
}

/// The labeled engagement state.
///
/// Serialized as the exact label string downstream consumers key off, e.g.
/// `"passive"`, `"focused viewing"`, `"fullscreen immersed viewing"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngagementState {
    pub band: EngagementBand,
    /// Video was the user's activity when the state was derived
    pub viewing: bool,
    /// Only meaningful while viewing
    pub fullscreen: bool,
}

impl EngagementState {
    pub fn unknown() -> Self {
        Self {
            band: EngagementBand::Unknown,
            viewing: false,
            fullscreen: false,
        }
    }

    pub fn from_score(score: i32, viewing: bool, fullscreen: bool) -> Self {
        Self {
            band: EngagementBand::from_score(score),
            viewing,
            fullscreen: viewing && fullscreen,
        }
    }

    /// The exact label string for this state
    pub fn label(&self) -> String {
        let base = match (self.band, self.viewing) {
            (EngagementBand::Unknown, _) => "unknown",
            (EngagementBand::Disengaged, false) => "disengaged",
            (EngagementBand::Passive, false) => "passive",
            (EngagementBand::Engaged, false) => "engaged",
            (EngagementBand::HighlyEngaged, false) => "highly engaged",
            (EngagementBand::Disengaged, true) => "distracted viewing",
            (EngagementBand::Passive, true) => "casual viewing",
            (EngagementBand::Engaged, true) => "focused viewing",
            (EngagementBand::HighlyEngaged, true) => "immersed viewing",
        };

        if self.fullscreen {
            format!("fullscreen {base}")
        } else {
            base.to_string()
        }
    }
}

impl fmt::Display for EngagementState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for EngagementState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (fullscreen, base) = match s.strip_prefix("fullscreen ") {
            Some(rest) => (true, rest),
            None => (false, s),
        };

        let (band, viewing) = match base {
            "unknown" => (EngagementBand::Unknown, false),
            "disengaged" => (EngagementBand::Disengaged, false),
            "passive" => (EngagementBand::Passive, false),
            "engaged" => (EngagementBand::Engaged, false),
            "highly engaged" => (EngagementBand::HighlyEngaged, false),
            "distracted viewing" => (EngagementBand::Disengaged, true),
            "casual viewing" => (EngagementBand::Passive, true),
            "focused viewing" => (EngagementBand::Engaged, true),
            "immersed viewing" => (EngagementBand::HighlyEngaged, true),
            other => return Err(format!("unrecognized engagement state: {other}")),
        };

        Ok(Self {
            band,
            viewing,
            fullscreen: fullscreen && viewing,
        })
    }
}

impl Serialize for EngagementState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.label())
    }
}

impl<'de> Deserialize<'de> for EngagementState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}

/// Video-specific engagement detail attached while video plays
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VideoEngagementDetail {
    pub cursor_idle: bool,
    pub idle_duration_ms: i64,
    pub cursor_over_video: bool,
    pub steady_cursor: bool,
    /// Score with the viewing boost applied, capped at 100
    pub video_engagement_score: i32,
    pub timestamp: DateTime<Utc>,
}

/// The fused output, recomputed from scratch on every reporting tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngagementResult {
    /// Clamped to [0, 100]
    pub score: i32,
    pub state: EngagementState,
    pub confidence: Confidence,
    /// Human-readable explanations of which rules fired; not re-parsed
    pub factors: Vec<String>,
    pub timestamp: DateTime<Utc>,
    /// Latest cursor reading echoed for consumers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<CursorReading>,
    pub media_state: MediaStateSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_engagement: Option<VideoEngagementDetail>,
}

/// Where an alert originated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertSource {
    #[serde(rename = "cursor")]
    Cursor,
    #[serde(rename = "audio")]
    Audio,
    #[serde(rename = "video")]
    Video,
    /// Cursor behavior interpreted under video playback semantics
    #[serde(rename = "video-cursor")]
    VideoCursor,
}

/// Alert severity; `Engaged` is the positive signal emitted for idle cursors
/// during video playback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertLevel {
    Disengagement,
    Engaged,
}

/// Immediate side-effect notification, sent outside the reporting cadence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngagementAlert {
    pub source: AlertSource,
    pub level: AlertLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_thresholds() {
        assert_eq!(EngagementBand::from_score(0), EngagementBand::Disengaged);
        assert_eq!(EngagementBand::from_score(29), EngagementBand::Disengaged);
        assert_eq!(EngagementBand::from_score(30), EngagementBand::Passive);
        assert_eq!(EngagementBand::from_score(59), EngagementBand::Passive);
        assert_eq!(EngagementBand::from_score(60), EngagementBand::Engaged);
        assert_eq!(EngagementBand::from_score(84), EngagementBand::Engaged);
        assert_eq!(EngagementBand::from_score(85), EngagementBand::HighlyEngaged);
        assert_eq!(EngagementBand::from_score(100), EngagementBand::HighlyEngaged);
    }

    #[test]
    fn test_state_labels() {
        assert_eq!(EngagementState::from_score(45, false, false).label(), "passive");
        assert_eq!(
            EngagementState::from_score(70, true, false).label(),
            "focused viewing"
        );
        assert_eq!(
            EngagementState::from_score(90, true, true).label(),
            "fullscreen immersed viewing"
        );
        assert_eq!(EngagementState::unknown().label(), "unknown");
    }

    #[test]
    fn test_fullscreen_prefix_only_while_viewing() {
        let state = EngagementState::from_score(70, false, true);
        assert_eq!(state.label(), "engaged");
    }

    #[test]
    fn test_state_serde_round_trip() {
        let state = EngagementState::from_score(90, true, true);
        let json = serde_json::to_string(&state).unwrap();
        assert_eq!(json, "\"fullscreen immersed viewing\"");

        let parsed: EngagementState = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, state);
    }

    #[test]
    fn test_state_parse_rejects_garbage() {
        assert!("very engaged".parse::<EngagementState>().is_err());
    }

    #[test]
    fn test_alert_source_wire_names() {
        assert_eq!(
            serde_json::to_string(&AlertSource::VideoCursor).unwrap(),
            "\"video-cursor\""
        );
        assert_eq!(
            serde_json::to_string(&AlertLevel::Disengagement).unwrap(),
            "\"disengagement\""
        );
    }

    #[test]
    fn test_confidence_ordering() {
        assert!(Confidence::Low < Confidence::Medium);
        assert!(Confidence::Medium < Confidence::High);
    }
}
