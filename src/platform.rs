//! Platform adapters
//!
//! The core pipeline is pure over explicit timestamps and page snapshots.
//! These traits are the only seams touching the host environment: a clock for
//! driving timers outside of tests, and a media probe that surfaces what the
//! page currently shows. Everything behind them is unit-testable without a
//! browser.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Wall clock abstraction
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// System wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Axis-aligned bounding box in viewport coordinates (px)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Whether a point falls inside the rect expanded by `margin` px on all sides
    pub fn contains_with_margin(&self, x: f64, y: f64, margin: f64) -> bool {
        x >= self.left - margin
            && x <= self.right() + margin
            && y >= self.top - margin
            && y <= self.bottom() + margin
    }
}

/// Viewport dimensions (px)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

/// A media element candidate observed on the page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaCandidate {
    pub bounds: Rect,
    #[serde(flatten)]
    pub kind: MediaKind,
}

/// What sort of media surface a candidate is
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum MediaKind {
    /// A native video element with direct playback state
    NativeVideo {
        paused: bool,
        ended: bool,
        current_time_sec: f64,
    },
    /// A known player container that hides its native element
    PlayerContainer,
}

/// Point-in-time view of the page used for playback detection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageSnapshot {
    pub url: String,
    pub viewport: Viewport,
    pub fullscreen: bool,
    #[serde(default)]
    pub media: Vec<MediaCandidate>,
}

impl PageSnapshot {
    /// A snapshot of a page with no media surfaces at all
    pub fn empty(url: impl Into<String>, viewport: Viewport) -> Self {
        Self {
            url: url.into(),
            viewport,
            fullscreen: false,
            media: Vec::new(),
        }
    }
}

/// Source of page snapshots for the playback monitor
pub trait MediaProbe {
    fn snapshot(&self) -> PageSnapshot;
}
