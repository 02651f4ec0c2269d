//! Tracker configuration
//!
//! Recognized options for the signal trackers and the fusion engine. Invalid
//! values are clamped to defaults rather than rejected, so a bad settings
//! payload degrades to default behavior instead of stopping the pipeline.

use serde::{Deserialize, Serialize};

/// Default cursor reporting interval in milliseconds
pub const DEFAULT_REPORTING_INTERVAL_MS: i64 = 2000;

/// Default idle threshold in milliseconds
pub const DEFAULT_IDLE_THRESHOLD_MS: i64 = 3000;

/// Default position ring buffer capacity
pub const DEFAULT_BUFFER_SIZE: usize = 15;

/// Default jitter detection threshold in pixels
pub const DEFAULT_JITTER_THRESHOLD_PX: f64 = 5.0;

/// Default video poll interval in milliseconds
pub const DEFAULT_VIDEO_POLL_INTERVAL_MS: i64 = 3000;

/// Default idle evaluation interval in milliseconds
pub const DEFAULT_IDLE_CHECK_INTERVAL_MS: i64 = 1000;

/// Default engagement reporting interval in milliseconds
pub const DEFAULT_ENGAGEMENT_INTERVAL_MS: i64 = 5000;

/// Smallest accepted ring buffer capacity (three points are needed for jitter)
const MIN_BUFFER_SIZE: usize = 3;

/// Confidence handling when a source stops reporting.
///
/// The sticky policy reproduces the historical behavior: confidence never
/// drops once a source has reported, even if that source goes permanently
/// silent. The decay policy excludes readings older than `max_age_ms` from
/// the confidence calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "policy")]
pub enum ConfidencePolicy {
    Sticky,
    Decay { max_age_ms: i64 },
}

impl Default for ConfidencePolicy {
    fn default() -> Self {
        ConfidencePolicy::Sticky
    }
}

/// Per-session tracker configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Cursor reading cadence (ms)
    pub reporting_interval_ms: i64,
    /// No-movement time before the cursor counts as idle (ms)
    pub idle_threshold_ms: i64,
    /// Position ring buffer capacity
    pub buffer_size: usize,
    /// Minimum displacement magnitude considered for jitter (px)
    pub jitter_threshold_px: f64,
    /// Media playback poll cadence (ms)
    pub video_poll_interval_ms: i64,
    /// Idle re-evaluation cadence (ms)
    pub idle_check_interval_ms: i64,
    /// Fused engagement reporting cadence (ms)
    pub engagement_interval_ms: i64,
    /// Confidence staleness policy
    pub confidence_policy: ConfidencePolicy,
    /// Verbose diagnostic logging; no effect on scoring
    pub debug: bool,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            reporting_interval_ms: DEFAULT_REPORTING_INTERVAL_MS,
            idle_threshold_ms: DEFAULT_IDLE_THRESHOLD_MS,
            buffer_size: DEFAULT_BUFFER_SIZE,
            jitter_threshold_px: DEFAULT_JITTER_THRESHOLD_PX,
            video_poll_interval_ms: DEFAULT_VIDEO_POLL_INTERVAL_MS,
            idle_check_interval_ms: DEFAULT_IDLE_CHECK_INTERVAL_MS,
            engagement_interval_ms: DEFAULT_ENGAGEMENT_INTERVAL_MS,
            confidence_policy: ConfidencePolicy::default(),
            debug: false,
        }
    }
}

impl TrackerConfig {
    /// Clamp out-of-range values back to defaults.
    ///
    /// Intervals must be positive, the buffer must hold at least three
    /// points, and the jitter threshold must be non-negative.
    pub fn sanitize(mut self) -> Self {
        let defaults = Self::default();

        if self.reporting_interval_ms <= 0 {
            self.reporting_interval_ms = defaults.reporting_interval_ms;
        }
        if self.idle_threshold_ms <= 0 {
            self.idle_threshold_ms = defaults.idle_threshold_ms;
        }
        if self.buffer_size < MIN_BUFFER_SIZE {
            self.buffer_size = defaults.buffer_size;
        }
        if !self.jitter_threshold_px.is_finite() || self.jitter_threshold_px < 0.0 {
            self.jitter_threshold_px = defaults.jitter_threshold_px;
        }
        if self.video_poll_interval_ms <= 0 {
            self.video_poll_interval_ms = defaults.video_poll_interval_ms;
        }
        if self.idle_check_interval_ms <= 0 {
            self.idle_check_interval_ms = defaults.idle_check_interval_ms;
        }
        if self.engagement_interval_ms <= 0 {
            self.engagement_interval_ms = defaults.engagement_interval_ms;
        }
        if let ConfidencePolicy::Decay { max_age_ms } = self.confidence_policy {
            if max_age_ms <= 0 {
                self.confidence_policy = ConfidencePolicy::Sticky;
            }
        }

        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TrackerConfig::default();
        assert_eq!(config.reporting_interval_ms, 2000);
        assert_eq!(config.idle_threshold_ms, 3000);
        assert_eq!(config.buffer_size, 15);
        assert_eq!(config.jitter_threshold_px, 5.0);
        assert_eq!(config.confidence_policy, ConfidencePolicy::Sticky);
        assert!(!config.debug);
    }

    #[test]
    fn test_sanitize_clamps_invalid_values() {
        let config = TrackerConfig {
            reporting_interval_ms: -50,
            idle_threshold_ms: 0,
            buffer_size: 1,
            jitter_threshold_px: f64::NAN,
            video_poll_interval_ms: -1,
            idle_check_interval_ms: 0,
            engagement_interval_ms: 0,
            confidence_policy: ConfidencePolicy::Decay { max_age_ms: -10 },
            debug: true,
        }
        .sanitize();

        let defaults = TrackerConfig::default();
        assert_eq!(config.reporting_interval_ms, defaults.reporting_interval_ms);
        assert_eq!(config.idle_threshold_ms, defaults.idle_threshold_ms);
        assert_eq!(config.buffer_size, defaults.buffer_size);
        assert_eq!(config.jitter_threshold_px, defaults.jitter_threshold_px);
        assert_eq!(config.video_poll_interval_ms, defaults.video_poll_interval_ms);
        assert_eq!(config.idle_check_interval_ms, defaults.idle_check_interval_ms);
        assert_eq!(config.engagement_interval_ms, defaults.engagement_interval_ms);
        assert_eq!(config.confidence_policy, ConfidencePolicy::Sticky);
        // Sanitizing does not touch flags
        assert!(config.debug);
    }

    #[test]
    fn test_sanitize_keeps_valid_values() {
        let config = TrackerConfig {
            reporting_interval_ms: 500,
            buffer_size: 30,
            confidence_policy: ConfidencePolicy::Decay { max_age_ms: 10_000 },
            ..Default::default()
        }
        .sanitize();

        assert_eq!(config.reporting_interval_ms, 500);
        assert_eq!(config.buffer_size, 30);
        assert_eq!(
            config.confidence_policy,
            ConfidencePolicy::Decay { max_age_ms: 10_000 }
        );
    }

    #[test]
    fn test_config_deserializes_with_partial_fields() {
        let json = r#"{ "reporting_interval_ms": 1000, "debug": true }"#;
        let config: TrackerConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.reporting_interval_ms, 1000);
        assert!(config.debug);
        assert_eq!(config.buffer_size, DEFAULT_BUFFER_SIZE);
    }
}
