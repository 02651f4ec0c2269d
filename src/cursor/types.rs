//! Cursor reading types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Coarse movement speed bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Low,
    Medium,
    High,
}

/// Movement steadiness bucket derived from jitter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FocusQuality {
    Steady,
    Normal,
    Erratic,
}

/// Attention bucket derived from idle duration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttentionState {
    Active,
    Paused,
    Inactive,
    Disengaged,
}

/// A buffered pointer sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CursorSample {
    pub x: f64,
    pub y: f64,
    pub timestamp: DateTime<Utc>,
}

/// Last known cursor coordinates (px)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CursorPosition {
    pub x: f64,
    pub y: f64,
}

/// Idle flag and accumulated duration
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct IdleState {
    pub is_idle: bool,
    pub duration_ms: i64,
}

/// Raw movement metrics over the rolling buffer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CursorMetrics {
    /// Average movement speed in px/s
    pub speed: f64,
    /// Normalized direction-reversal score
    pub jitter: f64,
    pub idle: IdleState,
}

/// Classified engagement indicators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorEngagement {
    pub activity_level: ActivityLevel,
    pub focus_quality: FocusQuality,
    pub attention_state: AttentionState,
}

/// Point-in-time cursor snapshot emitted every reporting tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CursorReading {
    pub timestamp: DateTime<Utc>,
    pub position: CursorPosition,
    pub metrics: CursorMetrics,
    pub engagement: CursorEngagement,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attention_state_serialization() {
        let state = AttentionState::Disengaged;
        let json = serde_json::to_string(&state).unwrap();
        assert_eq!(json, "\"disengaged\"");

        let parsed: AttentionState = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, AttentionState::Disengaged);
    }

    #[test]
    fn test_activity_level_serialization() {
        assert_eq!(
            serde_json::to_string(&ActivityLevel::Medium).unwrap(),
            "\"medium\""
        );
        assert_eq!(
            serde_json::to_string(&FocusQuality::Erratic).unwrap(),
            "\"erratic\""
        );
    }
}
