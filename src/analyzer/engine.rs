//! Engagement analyzer
//!
//! Holds the latest reading per source plus the media playback state, and
//! recomputes a fused result on demand. Readings arrive independently and
//! overwrite in place; a recomputation may observe a mix of old and new
//! sources, which is accepted behavior.

use chrono::{DateTime, Utc};
use log::debug;

use crate::analyzer::scoring::{
    cursor_over_video, score_audio, score_standard, score_video_mode, score_video_signal,
    EYE_OPENNESS_DISENGAGED,
};
use crate::analyzer::types::{
    AlertLevel, AlertSource, Confidence, EngagementAlert, EngagementResult, EngagementState,
    VideoEngagementDetail,
};
use crate::audio::AudioFeatureReading;
use crate::config::{ConfidencePolicy, TrackerConfig};
use crate::cursor::{AttentionState, CursorReading};
use crate::platform::PageSnapshot;
use crate::video::types::MediaPlaybackState;
use crate::video::{VideoPlaybackMonitor, VideoReading};

/// Neutral starting score before any rule fires
const BASE_SCORE: i32 = 50;

/// Boost applied to the video-specific engagement score
const VIDEO_SCORE_BOOST: i32 = 10;

/// Fusion engine over the three signal sources
#[derive(Debug)]
pub struct EngagementAnalyzer {
    config: TrackerConfig,
    monitor: VideoPlaybackMonitor,
    cursor: Option<CursorReading>,
    audio: Option<AudioFeatureReading>,
    video: Option<VideoReading>,
}

impl EngagementAnalyzer {
    pub fn new(config: TrackerConfig) -> Self {
        let config = config.sanitize();
        Self {
            monitor: VideoPlaybackMonitor::with_debug(config.debug),
            cursor: None,
            audio: None,
            video: None,
            config,
        }
    }

    /// Current media playback state
    pub fn media_state(&self) -> &MediaPlaybackState {
        self.monitor.state()
    }

    /// Re-evaluate playback against a fresh page snapshot
    pub fn poll_media(&mut self, snapshot: &PageSnapshot, now: DateTime<Utc>) {
        self.monitor.poll(snapshot, now);
    }

    /// Out-of-band fullscreen-change notification
    pub fn handle_fullscreen_change(&mut self, fullscreen: bool) {
        self.monitor.handle_fullscreen_change(fullscreen);
    }

    /// Store a cursor reading. A disengaged attention state triggers the
    /// alert side-effect immediately rather than waiting for the reporting
    /// tick.
    pub fn handle_cursor(
        &mut self,
        reading: CursorReading,
        now: DateTime<Utc>,
    ) -> Option<EngagementAlert> {
        let disengaged = reading.engagement.attention_state == AttentionState::Disengaged;
        self.cursor = Some(reading);

        if disengaged {
            self.notify_disengagement(AlertSource::Cursor, now)
        } else {
            None
        }
    }

    /// Store an audio reading
    pub fn handle_audio(&mut self, reading: AudioFeatureReading) {
        self.audio = Some(reading);
    }

    /// Store a gaze reading. Eye openness below the disengagement floor
    /// alerts immediately regardless of cursor state.
    pub fn handle_video(
        &mut self,
        reading: VideoReading,
        now: DateTime<Utc>,
    ) -> Option<EngagementAlert> {
        let low_openness = reading
            .eye_openness
            .map(|o| o < EYE_OPENNESS_DISENGAGED)
            .unwrap_or(false);
        self.video = Some(reading);

        if low_openness {
            self.notify_disengagement(AlertSource::Video, now)
        } else {
            None
        }
    }

    /// Combine the stored readings into a result. Pure read of current
    /// state; safe to call at any time.
    pub fn analyze(&self, now: DateTime<Utc>) -> EngagementResult {
        let media = self.monitor.state();

        if self.cursor.is_none() && self.audio.is_none() && self.video.is_none() {
            return EngagementResult {
                score: BASE_SCORE,
                state: EngagementState::unknown(),
                confidence: Confidence::Low,
                factors: Vec::new(),
                timestamp: now,
                cursor: None,
                media_state: media.summary(),
                video_engagement: None,
            };
        }

        let mut score = BASE_SCORE;
        let mut factors = Vec::new();
        let mut confidence = Confidence::Medium;
        let watching = media.is_video_playing;

        if let Some(cursor) = &self.cursor {
            let outcome = if watching {
                score_video_mode(cursor, media)
            } else {
                score_standard(cursor)
            };
            score += outcome.delta;
            factors.extend(outcome.factors);

            if self.source_counts(cursor.timestamp, now) {
                confidence = Confidence::High;
            }
        }

        if let Some(audio) = &self.audio {
            let outcome = score_audio(audio);
            score += outcome.delta;
            factors.extend(outcome.factors);

            if self.source_counts(audio.timestamp, now) {
                confidence = Confidence::High;
            }
        }

        if let Some(video) = &self.video {
            let outcome = score_video_signal(video);
            score += outcome.delta;
            factors.extend(outcome.factors);

            if self.source_counts(video.timestamp, now) {
                confidence = Confidence::High;
            }
        }

        let score = score.clamp(0, 100);
        let state = EngagementState::from_score(score, watching, media.is_fullscreen);

        let video_engagement = if watching {
            self.cursor.as_ref().map(|cursor| VideoEngagementDetail {
                cursor_idle: cursor.metrics.idle.is_idle,
                idle_duration_ms: cursor.metrics.idle.duration_ms,
                cursor_over_video: cursor_over_video(cursor, media),
                steady_cursor: cursor.engagement.focus_quality
                    == crate::cursor::FocusQuality::Steady,
                video_engagement_score: (score + VIDEO_SCORE_BOOST).min(100),
                timestamp: now,
            })
        } else {
            None
        };

        EngagementResult {
            score,
            state,
            confidence,
            factors,
            timestamp: now,
            cursor: self.cursor.clone(),
            media_state: media.summary(),
            video_engagement,
        }
    }

    /// Build the alert for a disengagement signal from `source`.
    ///
    /// During video playback a disengaged cursor is normal viewing behavior:
    /// the standard alert is suppressed, and an idle/inactive cursor emits a
    /// positive notification instead.
    pub fn notify_disengagement(
        &self,
        source: AlertSource,
        now: DateTime<Utc>,
    ) -> Option<EngagementAlert> {
        if source == AlertSource::Cursor && self.monitor.state().is_video_playing {
            let idle_attention = self.cursor.as_ref().map(|c| {
                matches!(
                    c.engagement.attention_state,
                    AttentionState::Disengaged | AttentionState::Inactive
                )
            });

            if idle_attention == Some(true) {
                if self.config.debug {
                    debug!("idle cursor during playback treated as focused viewing");
                }
                return Some(EngagementAlert {
                    source: AlertSource::VideoCursor,
                    level: AlertLevel::Engaged,
                    details: Some(
                        "Steady cursor during video playback indicates focused viewing"
                            .to_string(),
                    ),
                    timestamp: now,
                });
            }

            return None;
        }

        Some(EngagementAlert {
            source,
            level: AlertLevel::Disengagement,
            details: None,
            timestamp: now,
        })
    }

    /// Whether a reading at `timestamp` contributes to confidence under the
    /// configured policy
    fn source_counts(&self, timestamp: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match self.config.confidence_policy {
            ConfidencePolicy::Sticky => true,
            ConfidencePolicy::Decay { max_age_ms } => {
                (now - timestamp).num_milliseconds() <= max_age_ms
            }
        }
    }
}
