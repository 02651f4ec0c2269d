//! Cursor metric derivation
//!
//! Pure functions from buffered pointer samples to speed, jitter, and the
//! classified engagement buckets.

use crate::cursor::types::{ActivityLevel, AttentionState, CursorSample, FocusQuality};

/// Angle above which a consecutive displacement pair counts as a direction
/// change (30 degrees)
const DIRECTION_CHANGE_ANGLE_RAD: f64 = std::f64::consts::PI / 6.0;

/// Scale factor applied to the normalized jitter product
const JITTER_SCALE: f64 = 10.0;

/// Speed below which activity is low (px/s)
const ACTIVITY_LOW_MAX: f64 = 50.0;

/// Speed below which activity is medium (px/s)
const ACTIVITY_MEDIUM_MAX: f64 = 300.0;

/// Jitter below which focus is steady
const FOCUS_STEADY_MAX: f64 = 0.2;

/// Jitter below which focus is normal
const FOCUS_NORMAL_MAX: f64 = 0.6;

/// Idle duration below which attention is paused (ms)
const ATTENTION_PAUSED_MAX_MS: i64 = 5000;

/// Idle duration below which attention is inactive (ms)
const ATTENTION_INACTIVE_MAX_MS: i64 = 15_000;

/// Average movement speed over the buffer in px/s.
///
/// Sums Euclidean distances between consecutive samples and divides by the
/// elapsed time, counting only pairs with actual movement and positive time.
/// Zero with fewer than two samples.
pub fn compute_speed(buffer: &[CursorSample]) -> f64 {
    if buffer.len() < 2 {
        return 0.0;
    }

    let mut total_distance = 0.0;
    let mut total_time_ms = 0i64;

    for pair in buffer.windows(2) {
        let dx = pair[1].x - pair[0].x;
        let dy = pair[1].y - pair[0].y;
        let distance = (dx * dx + dy * dy).sqrt();
        let time_ms = (pair[1].timestamp - pair[0].timestamp).num_milliseconds();

        if distance > 0.0 && time_ms > 0 {
            total_distance += distance;
            total_time_ms += time_ms;
        }
    }

    if total_time_ms > 0 {
        (total_distance / total_time_ms as f64) * 1000.0
    } else {
        0.0
    }
}

/// Direction-reversal score over the buffer.
///
/// For every consecutive sample triple, the two displacement vectors are
/// compared. Displacements shorter than `jitter_threshold_px` are ignored as
/// sub-pixel noise. Angles above 30 degrees count as direction changes and
/// accumulate; the score grows with both the frequency and the magnitude of
/// sharp turns and stays at zero for smooth monotonic motion.
pub fn compute_jitter(buffer: &[CursorSample], jitter_threshold_px: f64) -> f64 {
    if buffer.len() < 3 {
        return 0.0;
    }

    let mut angle_sum = 0.0;
    let mut direction_changes = 0usize;

    for triple in buffer.windows(3) {
        let v1 = (triple[1].x - triple[0].x, triple[1].y - triple[0].y);
        let v2 = (triple[2].x - triple[1].x, triple[2].y - triple[1].y);

        let mag1 = (v1.0 * v1.0 + v1.1 * v1.1).sqrt();
        let mag2 = (v2.0 * v2.0 + v2.1 * v2.1).sqrt();

        if mag1 < jitter_threshold_px || mag2 < jitter_threshold_px {
            continue;
        }

        let dot = v1.0 * v2.0 + v1.1 * v2.1;
        let cos_angle = (dot / (mag1 * mag2)).clamp(-1.0, 1.0);
        let angle = cos_angle.acos();

        if angle > DIRECTION_CHANGE_ANGLE_RAD {
            direction_changes += 1;
            angle_sum += angle;
        }
    }

    let triple_count = (buffer.len() - 2) as f64;
    (angle_sum / triple_count) * (direction_changes as f64 / triple_count) * JITTER_SCALE
}

/// Low speed may indicate boredom, high speed focused activity
pub fn classify_activity(speed: f64) -> ActivityLevel {
    if speed < ACTIVITY_LOW_MAX {
        ActivityLevel::Low
    } else if speed < ACTIVITY_MEDIUM_MAX {
        ActivityLevel::Medium
    } else {
        ActivityLevel::High
    }
}

/// High jitter may indicate anxiety or distraction
pub fn classify_focus(jitter: f64) -> FocusQuality {
    if jitter < FOCUS_STEADY_MAX {
        FocusQuality::Steady
    } else if jitter < FOCUS_NORMAL_MAX {
        FocusQuality::Normal
    } else {
        FocusQuality::Erratic
    }
}

/// Long idle time indicates disengagement
pub fn classify_attention(idle_duration_ms: i64) -> AttentionState {
    if idle_duration_ms == 0 {
        AttentionState::Active
    } else if idle_duration_ms < ATTENTION_PAUSED_MAX_MS {
        AttentionState::Paused
    } else if idle_duration_ms < ATTENTION_INACTIVE_MAX_MS {
        AttentionState::Inactive
    } else {
        AttentionState::Disengaged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn samples_from_points(points: &[(f64, f64)]) -> Vec<CursorSample> {
        let start = Utc.with_ymd_and_hms(2024, 3, 10, 9, 0, 0).unwrap();
        points
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| CursorSample {
                x,
                y,
                timestamp: start + Duration::milliseconds(100 * i as i64),
            })
            .collect()
    }

    #[test]
    fn test_speed_requires_two_points() {
        assert_eq!(compute_speed(&[]), 0.0);
        assert_eq!(compute_speed(&samples_from_points(&[(10.0, 10.0)])), 0.0);
    }

    #[test]
    fn test_speed_constant_motion() {
        // 30 px every 100 ms = 300 px/s
        let buffer = samples_from_points(&[(0.0, 0.0), (30.0, 0.0), (60.0, 0.0), (90.0, 0.0)]);
        let speed = compute_speed(&buffer);
        assert!((speed - 300.0).abs() < 0.001);
    }

    #[test]
    fn test_speed_ignores_stationary_pairs() {
        let buffer = samples_from_points(&[(0.0, 0.0), (0.0, 0.0), (30.0, 0.0)]);
        // Only the moving pair counts: 30 px over 100 ms
        let speed = compute_speed(&buffer);
        assert!((speed - 300.0).abs() < 0.001);
    }

    #[test]
    fn test_jitter_zero_for_linear_motion() {
        let buffer = samples_from_points(&[
            (0.0, 0.0),
            (20.0, 0.0),
            (40.0, 0.0),
            (60.0, 0.0),
            (80.0, 0.0),
        ]);
        assert_eq!(compute_jitter(&buffer, 5.0), 0.0);
    }

    #[test]
    fn test_jitter_zigzag_exceeds_linear() {
        let linear = samples_from_points(&[
            (0.0, 0.0),
            (20.0, 0.0),
            (40.0, 0.0),
            (60.0, 0.0),
            (80.0, 0.0),
        ]);
        // Direction reverses on every sample
        let zigzag = samples_from_points(&[
            (0.0, 0.0),
            (20.0, 0.0),
            (0.0, 0.0),
            (20.0, 0.0),
            (0.0, 0.0),
        ]);

        let linear_jitter = compute_jitter(&linear, 5.0);
        let zigzag_jitter = compute_jitter(&zigzag, 5.0);
        assert!(zigzag_jitter > linear_jitter);
        assert!(zigzag_jitter > 0.0);
    }

    #[test]
    fn test_jitter_skips_sub_threshold_displacements() {
        // 2 px wiggles stay below the 5 px detection threshold
        let buffer = samples_from_points(&[(0.0, 0.0), (2.0, 0.0), (0.0, 0.0), (2.0, 0.0)]);
        assert_eq!(compute_jitter(&buffer, 5.0), 0.0);
    }

    #[test]
    fn test_classify_activity_buckets() {
        assert_eq!(classify_activity(0.0), ActivityLevel::Low);
        assert_eq!(classify_activity(49.9), ActivityLevel::Low);
        assert_eq!(classify_activity(50.0), ActivityLevel::Medium);
        assert_eq!(classify_activity(299.9), ActivityLevel::Medium);
        assert_eq!(classify_activity(300.0), ActivityLevel::High);
    }

    #[test]
    fn test_classify_focus_buckets() {
        assert_eq!(classify_focus(0.1), FocusQuality::Steady);
        assert_eq!(classify_focus(0.3), FocusQuality::Normal);
        assert_eq!(classify_focus(0.7), FocusQuality::Erratic);
    }

    #[test]
    fn test_classify_attention_buckets() {
        assert_eq!(classify_attention(0), AttentionState::Active);
        assert_eq!(classify_attention(4000), AttentionState::Paused);
        assert_eq!(classify_attention(10_000), AttentionState::Inactive);
        assert_eq!(classify_attention(20_000), AttentionState::Disengaged);
    }
}
