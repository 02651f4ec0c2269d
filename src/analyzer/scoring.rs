//! Additive scoring rules
//!
//! Each branch returns a score delta plus the factor strings for the rules
//! that fired. The cursor branch switches between two rule sets on playback
//! context; the audio and gaze branches follow the same additive style.

use crate::audio::{AudioEngagement, AudioFeatureReading};
use crate::cursor::{ActivityLevel, AttentionState, CursorReading, FocusQuality};
use crate::video::types::MediaPlaybackState;
use crate::video::VideoReading;

/// Margin around the video bounds within which cursor activity counts as
/// control interaction (px)
pub const VIDEO_CONTROL_MARGIN_PX: f64 = 50.0;

/// Eye openness below which the gaze source signals disengagement
pub const EYE_OPENNESS_DISENGAGED: f64 = 0.3;

/// Eye openness above which the gaze source signals attentiveness
pub const EYE_OPENNESS_ATTENTIVE: f64 = 0.7;

/// Outcome of one scoring branch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleOutcome {
    pub delta: i32,
    pub factors: Vec<String>,
}

impl RuleOutcome {
    fn add(&mut self, delta: i32, factor: &str) {
        self.delta += delta;
        self.factors.push(factor.to_string());
    }
}

/// Whether the cursor sits within the control margin of the video bounds
pub fn cursor_over_video(cursor: &CursorReading, media: &MediaPlaybackState) -> bool {
    media
        .video_bounds
        .map(|bounds| {
            bounds.contains_with_margin(
                cursor.position.x,
                cursor.position.y,
                VIDEO_CONTROL_MARGIN_PX,
            )
        })
        .unwrap_or(false)
}

/// Cursor rules while video plays. An idle cursor is a positive sign here:
/// the user is watching content, not moving the pointer.
pub fn score_video_mode(cursor: &CursorReading, media: &MediaPlaybackState) -> RuleOutcome {
    let mut outcome = RuleOutcome::default();

    let attention = cursor.engagement.attention_state;
    let activity = cursor.engagement.activity_level;
    let steady = cursor.engagement.focus_quality == FocusQuality::Steady;
    let is_idle = cursor.metrics.idle.is_idle;
    let over_video = cursor_over_video(cursor, media);

    if attention == AttentionState::Disengaged || attention == AttentionState::Inactive {
        outcome.add(20, "steady/idle cursor during video (strong positive)");
    } else if attention == AttentionState::Paused {
        outcome.add(10, "occasional pauses during video (positive)");
    }

    if attention != AttentionState::Disengaged && steady {
        outcome.add(15, "steady cursor movement during video (positive)");
    }

    // High activity only makes sense when interacting with controls
    if activity == ActivityLevel::High {
        if over_video {
            outcome.add(5, "interactive video control usage");
        } else {
            outcome.add(-15, "excessive cursor activity away from video (negative)");
        }
    }

    if media.is_fullscreen {
        if is_idle {
            outcome.add(
                15,
                "appropriate idle cursor during fullscreen video (strong positive)",
            );
        }
        if activity == ActivityLevel::Low && !is_idle {
            outcome.add(10, "minimal movement during fullscreen (positive)");
        }
    }

    if activity == ActivityLevel::Low && over_video {
        outcome.add(5, "checking video progress (positive)");
    }

    outcome
}

/// Cursor rules on a normal page, where idle time reads as disengagement
pub fn score_standard(cursor: &CursorReading) -> RuleOutcome {
    let mut outcome = RuleOutcome::default();

    match cursor.engagement.activity_level {
        ActivityLevel::High => outcome.add(15, "high cursor activity"),
        ActivityLevel::Low => outcome.add(-10, "low cursor activity"),
        ActivityLevel::Medium => {}
    }

    match cursor.engagement.focus_quality {
        FocusQuality::Erratic => outcome.add(-5, "erratic cursor movement"),
        FocusQuality::Steady => outcome.add(5, "steady cursor movement"),
        FocusQuality::Normal => {}
    }

    match cursor.engagement.attention_state {
        AttentionState::Disengaged => outcome.add(-25, "cursor idle"),
        AttentionState::Active => outcome.add(10, "cursor active"),
        _ => {}
    }

    outcome
}

/// Audio rules keyed off the engagement label
pub fn score_audio(reading: &AudioFeatureReading) -> RuleOutcome {
    let mut outcome = RuleOutcome::default();

    match reading.engagement {
        AudioEngagement::Engaged => outcome.add(10, "audio suggests engagement"),
        AudioEngagement::NotFullyEngaged => outcome.add(-5, "audio suggests partial engagement"),
        AudioEngagement::NotEngaged => outcome.add(-15, "audio suggests disengagement"),
        AudioEngagement::Unknown => {}
    }

    outcome
}

/// Gaze rules keyed off eye openness
pub fn score_video_signal(reading: &VideoReading) -> RuleOutcome {
    let mut outcome = RuleOutcome::default();

    if let Some(openness) = reading.eye_openness {
        if openness >= EYE_OPENNESS_ATTENTIVE {
            outcome.add(10, "eyes open and attentive");
        } else if openness < EYE_OPENNESS_DISENGAGED {
            outcome.add(-20, "low eye openness");
        }
    }

    outcome
}
