//! Playback detection
//!
//! Applies the detection rules to a page snapshot: a candidate must be
//! reasonably sized and substantially on screen; a native element must
//! actually be progressing through content; when several qualify, the
//! largest visible playing element wins. Pages that hide the native element
//! behind custom player chrome fall back to visible player containers or a
//! streaming-domain hint.

use chrono::{DateTime, Utc};
use log::debug;

use crate::platform::{MediaCandidate, MediaKind, PageSnapshot, Rect, Viewport};
use crate::video::types::MediaPlaybackState;

/// Minimum candidate dimension to count as a watchable surface (px)
const MIN_VIDEO_DIMENSION: f64 = 200.0;

/// Domains where video is assumed to be the main activity even when the
/// native element is obscured by player chrome
const STREAMING_DOMAINS: &[&str] = &[
    "youtube.com",
    "youtu.be",
    "netflix.com",
    "vimeo.com",
    "disneyplus.com",
    "twitch.tv",
    "primevideo.com",
    "amazon.com/gp/video",
    "hulu.com",
    "hbomax.com",
    "max.com",
    "peacocktv.com",
    "spotify.com",
];

/// Media playback monitor
#[derive(Debug, Default)]
pub struct VideoPlaybackMonitor {
    state: MediaPlaybackState,
    debug: bool,
}

impl VideoPlaybackMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_debug(debug: bool) -> Self {
        Self {
            state: MediaPlaybackState::default(),
            debug,
        }
    }

    /// Current playback state
    pub fn state(&self) -> &MediaPlaybackState {
        &self.state
    }

    /// Fullscreen-change notification, delivered out of band from polling
    pub fn handle_fullscreen_change(&mut self, fullscreen: bool) {
        self.state.is_fullscreen = fullscreen;
        if self.debug {
            debug!("fullscreen changed: {}", fullscreen);
        }
    }

    /// Re-evaluate playback against a fresh snapshot. Returns the updated
    /// state.
    pub fn poll(&mut self, snapshot: &PageSnapshot, now: DateTime<Utc>) -> &MediaPlaybackState {
        let was_playing = self.state.is_video_playing;
        let viewport = snapshot.viewport;

        // Largest visible, actively playing native element wins
        let playing = snapshot
            .media
            .iter()
            .filter(|c| is_playing_native(c) && is_visible(&c.bounds, &viewport))
            .max_by(|a, b| a.bounds.area().total_cmp(&b.bounds.area()));

        self.state.is_video_playing = playing.is_some();
        self.state.video_bounds = playing.map(|c| c.bounds);

        if let Some(candidate) = playing {
            self.state.is_main_content = is_main_content(&candidate.bounds, &viewport);
        } else {
            self.apply_fallback(snapshot);
        }

        self.state.is_fullscreen = snapshot.fullscreen;

        if self.state.is_video_playing {
            self.state.stats.detection_count += 1;
        }
        if self.state.is_video_playing != was_playing {
            self.state.stats.last_state_change = Some(now);
            if self.debug {
                debug!(
                    "playback {} (bounds: {:?})",
                    if self.state.is_video_playing {
                        "detected"
                    } else {
                        "ended"
                    },
                    self.state.video_bounds
                );
            }
        }

        &self.state
    }

    /// No native element qualifies: look for a visible player container, or
    /// a streaming domain with any visible native element.
    fn apply_fallback(&mut self, snapshot: &PageSnapshot) {
        let viewport = snapshot.viewport;

        let visible_container = snapshot
            .media
            .iter()
            .filter(|c| matches!(c.kind, MediaKind::PlayerContainer))
            .find(|c| is_visible(&c.bounds, &viewport));

        if let Some(container) = visible_container {
            self.state.is_video_playing = true;
            self.state.video_bounds = Some(container.bounds);
            self.state.is_main_content = is_main_content(&container.bounds, &viewport);
            return;
        }

        if is_streaming_url(&snapshot.url) {
            let visible_native = snapshot
                .media
                .iter()
                .filter(|c| matches!(c.kind, MediaKind::NativeVideo { .. }))
                .find(|c| is_visible(&c.bounds, &viewport));

            if let Some(native) = visible_native {
                self.state.is_video_playing = true;
                self.state.video_bounds = Some(native.bounds);
                self.state.is_main_content = true;
                return;
            }
        }

        self.state.is_main_content = false;
        self.state.video_bounds = None;
    }
}

/// A native element counts as playing when it is progressing through content
fn is_playing_native(candidate: &MediaCandidate) -> bool {
    match candidate.kind {
        MediaKind::NativeVideo {
            paused,
            ended,
            current_time_sec,
        } => !paused && !ended && current_time_sec > 0.0,
        MediaKind::PlayerContainer => false,
    }
}

/// Reasonably sized and substantially within the viewport, tolerating a
/// half-off-screen position
fn is_visible(bounds: &Rect, viewport: &Viewport) -> bool {
    bounds.width >= MIN_VIDEO_DIMENSION
        && bounds.height >= MIN_VIDEO_DIMENSION
        && bounds.top >= -bounds.height / 2.0
        && bounds.left >= -bounds.width / 2.0
        && bounds.bottom() <= viewport.height + bounds.height / 2.0
        && bounds.right() <= viewport.width + bounds.width / 2.0
}

/// Covers more than half the viewport in either dimension
fn is_main_content(bounds: &Rect, viewport: &Viewport) -> bool {
    bounds.width > viewport.width * 0.5 || bounds.height > viewport.height * 0.5
}

fn is_streaming_url(url: &str) -> bool {
    let url = url.to_lowercase();
    STREAMING_DOMAINS.iter().any(|domain| url.contains(domain))
}
