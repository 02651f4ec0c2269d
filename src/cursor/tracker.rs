//! Cursor tracker
//!
//! Maintains a bounded ring buffer of recent pointer samples and assembles an
//! immutable [`CursorReading`] on every reporting tick. The tracker holds no
//! timers itself; the owning session drives it with explicit timestamps.

use chrono::{DateTime, Utc};
use log::debug;
use std::collections::VecDeque;

use crate::config::TrackerConfig;
use crate::cursor::metrics::{
    classify_activity, classify_attention, classify_focus, compute_jitter, compute_speed,
};
use crate::cursor::types::{
    CursorEngagement, CursorMetrics, CursorPosition, CursorReading, CursorSample, IdleState,
};

/// Diagnostic counters kept alongside the tracker
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrackerStats {
    pub total_movements: u64,
    pub reports: u64,
}

/// Pointer movement tracker
#[derive(Debug)]
pub struct CursorTracker {
    config: TrackerConfig,
    buffer: VecDeque<CursorSample>,
    position: CursorPosition,
    last_move_time: DateTime<Utc>,
    idle: IdleState,
    stats: TrackerStats,
    started_at: DateTime<Utc>,
}

impl CursorTracker {
    /// Create a tracker. With no movement events the tracker counts as idle
    /// once `idle_threshold_ms` has elapsed since `now`.
    pub fn new(config: TrackerConfig, now: DateTime<Utc>) -> Self {
        let config = config.sanitize();
        Self {
            buffer: VecDeque::with_capacity(config.buffer_size),
            position: CursorPosition::default(),
            last_move_time: now,
            idle: IdleState::default(),
            stats: TrackerStats::default(),
            started_at: now,
            config,
        }
    }

    /// Record a pointer movement event. Resets the idle state immediately.
    pub fn record_move(&mut self, x: f64, y: f64, now: DateTime<Utc>) {
        self.position = CursorPosition { x, y };
        self.idle = IdleState::default();
        self.last_move_time = now;

        self.buffer.push_back(CursorSample {
            x,
            y,
            timestamp: now,
        });
        while self.buffer.len() > self.config.buffer_size {
            self.buffer.pop_front();
        }

        self.stats.total_movements += 1;
    }

    /// Re-evaluate the idle state against the configured threshold and return
    /// the current value.
    pub fn evaluate_idle(&mut self, now: DateTime<Utc>) -> IdleState {
        let since_last_move = (now - self.last_move_time).num_milliseconds();
        if since_last_move > self.config.idle_threshold_ms {
            self.idle = IdleState {
                is_idle: true,
                duration_ms: since_last_move,
            };
        }
        self.idle
    }

    /// Assemble a reading from the current buffer. Called once per reporting
    /// tick regardless of event arrival rate; with no events this yields a
    /// zero-movement, idle-by-default reading.
    pub fn take_reading(&mut self, now: DateTime<Utc>) -> CursorReading {
        let buffer: Vec<CursorSample> = self.buffer.iter().copied().collect();
        let speed = compute_speed(&buffer);
        let jitter = compute_jitter(&buffer, self.config.jitter_threshold_px);
        let idle = self.evaluate_idle(now);

        let reading = CursorReading {
            timestamp: now,
            position: self.position,
            metrics: CursorMetrics {
                speed,
                jitter,
                idle,
            },
            engagement: CursorEngagement {
                activity_level: classify_activity(speed),
                focus_quality: classify_focus(jitter),
                attention_state: classify_attention(idle.duration_ms),
            },
        };

        self.stats.reports += 1;
        if self.config.debug {
            debug!(
                "cursor reading: speed={:.1} jitter={:.2} idle={}ms",
                speed, jitter, idle.duration_ms
            );
        }

        reading
    }

    /// Diagnostic counters since construction
    pub fn stats(&self) -> TrackerStats {
        self.stats
    }

    /// Uptime since construction (ms)
    pub fn uptime_ms(&self, now: DateTime<Utc>) -> i64 {
        (now - self.started_at).num_milliseconds()
    }

    /// Number of samples currently buffered
    pub fn buffered_samples(&self) -> usize {
        self.buffer.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::types::{ActivityLevel, AttentionState, FocusQuality};
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 9, 0, 0).unwrap()
    }

    fn tracker() -> CursorTracker {
        CursorTracker::new(TrackerConfig::default(), t0())
    }

    #[test]
    fn test_buffer_evicts_oldest() {
        let mut tracker = CursorTracker::new(
            TrackerConfig {
                buffer_size: 3,
                ..Default::default()
            },
            t0(),
        );

        for i in 0..5 {
            tracker.record_move(i as f64 * 10.0, 0.0, t0() + Duration::milliseconds(i * 100));
        }

        assert_eq!(tracker.buffered_samples(), 3);
        assert_eq!(tracker.stats().total_movements, 5);
    }

    #[test]
    fn test_no_movement_reading_is_zeroed() {
        let mut tracker = tracker();
        let reading = tracker.take_reading(t0() + Duration::milliseconds(500));

        assert_eq!(reading.metrics.speed, 0.0);
        assert_eq!(reading.metrics.jitter, 0.0);
        assert!(!reading.metrics.idle.is_idle);
        assert_eq!(reading.engagement.activity_level, ActivityLevel::Low);
        assert_eq!(reading.engagement.attention_state, AttentionState::Active);
    }

    #[test]
    fn test_idle_flag_after_threshold() {
        let mut tracker = tracker();
        tracker.record_move(100.0, 100.0, t0());

        // 4 seconds with no movement exceeds the 3 second threshold
        let reading = tracker.take_reading(t0() + Duration::milliseconds(4000));
        assert!(reading.metrics.idle.is_idle);
        assert_eq!(reading.metrics.idle.duration_ms, 4000);
        assert_eq!(reading.engagement.attention_state, AttentionState::Paused);
    }

    #[test]
    fn test_idle_buckets_by_elapsed_duration() {
        let mut tracker = tracker();
        tracker.record_move(100.0, 100.0, t0());

        let reading = tracker.take_reading(t0() + Duration::milliseconds(10_000));
        assert_eq!(reading.engagement.attention_state, AttentionState::Inactive);

        let reading = tracker.take_reading(t0() + Duration::milliseconds(20_000));
        assert_eq!(
            reading.engagement.attention_state,
            AttentionState::Disengaged
        );
    }

    #[test]
    fn test_movement_resets_idle_immediately() {
        let mut tracker = tracker();
        tracker.record_move(100.0, 100.0, t0());

        let reading = tracker.take_reading(t0() + Duration::milliseconds(20_000));
        assert!(reading.metrics.idle.is_idle);

        tracker.record_move(110.0, 100.0, t0() + Duration::milliseconds(20_100));
        let reading = tracker.take_reading(t0() + Duration::milliseconds(20_200));
        assert!(!reading.metrics.idle.is_idle);
        assert_eq!(reading.metrics.idle.duration_ms, 0);
        assert_eq!(reading.engagement.attention_state, AttentionState::Active);
    }

    #[test]
    fn test_identical_points_yield_no_motion() {
        let mut tracker = tracker();
        for i in 0..10 {
            tracker.record_move(250.0, 250.0, t0() + Duration::milliseconds(i * 100));
        }

        let reading = tracker.take_reading(t0() + Duration::milliseconds(1000));
        assert_eq!(reading.metrics.speed, 0.0);
        assert_eq!(reading.metrics.jitter, 0.0);
        // The last event was 100 ms ago, well under the idle threshold
        assert!(!reading.metrics.idle.is_idle);
    }

    #[test]
    fn test_erratic_motion_classified() {
        let mut tracker = tracker();
        // Sharp reversal every 50 ms
        for i in 0..12 {
            let x = if i % 2 == 0 { 100.0 } else { 200.0 };
            tracker.record_move(x, 100.0, t0() + Duration::milliseconds(i * 50));
        }

        let reading = tracker.take_reading(t0() + Duration::milliseconds(600));
        assert_eq!(reading.engagement.focus_quality, FocusQuality::Erratic);
        assert_eq!(reading.engagement.activity_level, ActivityLevel::High);
    }

    #[test]
    fn test_reading_reports_counted() {
        let mut tracker = tracker();
        tracker.take_reading(t0() + Duration::milliseconds(2000));
        tracker.take_reading(t0() + Duration::milliseconds(4000));
        assert_eq!(tracker.stats().reports, 2);
    }
}
