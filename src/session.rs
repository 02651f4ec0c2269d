//! Session orchestration
//!
//! One [`EngagementSession`] per tab owns the trackers, the analyzer, and
//! every timer the pipeline runs on: cursor reporting, video polling, idle
//! evaluation, and engagement reporting. Timers are deadline fields advanced
//! with explicit timestamps, so the whole pipeline runs deterministically in
//! tests and off a wall clock in production. `stop()` cancels all four
//! families; an advanced-but-stopped session does nothing.

use chrono::{DateTime, Duration, Utc};
use log::debug;

use crate::analyzer::EngagementAnalyzer;
use crate::config::TrackerConfig;
use crate::cursor::{AttentionState, CursorTracker};
use crate::platform::{MediaProbe, PageSnapshot};
use crate::transport::{
    page_channel, MessageReceiver, MessageSender, PageMessage, SinkMessage, TabId,
};

/// Deadlines for the four timer families; `None` while stopped
#[derive(Debug, Clone, Copy, Default)]
struct Timers {
    cursor_report: Option<DateTime<Utc>>,
    video_poll: Option<DateTime<Utc>>,
    idle_check: Option<DateTime<Utc>>,
    engagement_report: Option<DateTime<Utc>>,
}

/// Per-tab monitoring session
pub struct EngagementSession {
    tab_id: TabId,
    config: TrackerConfig,
    tracker: CursorTracker,
    analyzer: EngagementAnalyzer,
    page_tx: MessageSender<PageMessage>,
    page_rx: MessageReceiver<PageMessage>,
    sink_tx: MessageSender<SinkMessage>,
    probe: Option<Box<dyn MediaProbe>>,
    timers: Timers,
    running: bool,
    last_attention: AttentionState,
}

impl EngagementSession {
    /// Create a stopped session. Call [`start`](Self::start) to arm the
    /// timers.
    pub fn new(
        tab_id: TabId,
        config: TrackerConfig,
        sink_tx: MessageSender<SinkMessage>,
        now: DateTime<Utc>,
    ) -> Self {
        let config = config.sanitize();
        let (page_tx, page_rx) = page_channel();

        Self {
            tab_id,
            tracker: CursorTracker::new(config.clone(), now),
            analyzer: EngagementAnalyzer::new(config.clone()),
            page_tx,
            page_rx,
            sink_tx,
            probe: None,
            timers: Timers::default(),
            running: false,
            last_attention: AttentionState::Active,
            config,
        }
    }

    /// Attach a media probe polled on the video-poll interval
    pub fn with_probe(mut self, probe: Box<dyn MediaProbe>) -> Self {
        self.probe = Some(probe);
        self
    }

    /// Sender for page-context producers posting readings into this session
    pub fn page_sender(&self) -> MessageSender<PageMessage> {
        self.page_tx.clone()
    }

    pub fn tab_id(&self) -> TabId {
        self.tab_id
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Read access to the fusion engine
    pub fn analyzer(&self) -> &EngagementAnalyzer {
        &self.analyzer
    }

    /// Arm all four timer families. Starting a running session is a no-op.
    pub fn start(&mut self, now: DateTime<Utc>) {
        if self.running {
            return;
        }
        self.running = true;
        self.timers = Timers {
            cursor_report: Some(now + Duration::milliseconds(self.config.reporting_interval_ms)),
            video_poll: Some(now + Duration::milliseconds(self.config.video_poll_interval_ms)),
            idle_check: Some(now + Duration::milliseconds(self.config.idle_check_interval_ms)),
            engagement_report: Some(
                now + Duration::milliseconds(self.config.engagement_interval_ms),
            ),
        };

        if self.config.debug {
            debug!("session started for tab {}", self.tab_id);
        }
    }

    /// Cancel every timer. Readings already stored remain; nothing further
    /// fires until the session is started again.
    pub fn stop(&mut self) {
        self.running = false;
        self.timers = Timers::default();

        if self.config.debug {
            debug!("session stopped for tab {}", self.tab_id);
        }
    }

    /// Pointer movement from the host environment
    pub fn on_pointer_move(&mut self, x: f64, y: f64, now: DateTime<Utc>) {
        if !self.running {
            return;
        }
        self.tracker.record_move(x, y, now);
    }

    /// Fullscreen-change notification from the host environment
    pub fn on_fullscreen_change(&mut self, fullscreen: bool) {
        self.analyzer.handle_fullscreen_change(fullscreen);
    }

    /// Feed a page snapshot directly, outside the probe-driven poll cycle
    pub fn on_page_snapshot(&mut self, snapshot: &PageSnapshot, now: DateTime<Utc>) {
        self.analyzer.poll_media(snapshot, now);
    }

    /// Route one page message into the analyzer, forwarding any immediate
    /// alert to the sink
    pub fn handle_message(&mut self, message: PageMessage, now: DateTime<Utc>) {
        let alert = match message {
            PageMessage::Cursor(reading) => self.analyzer.handle_cursor(reading, now),
            PageMessage::Audio(reading) => {
                self.analyzer.handle_audio(reading);
                None
            }
            PageMessage::Video(reading) => self.analyzer.handle_video(reading, now),
        };

        if let Some(alert) = alert {
            self.sink_tx.send(SinkMessage::Alert {
                tab_id: self.tab_id,
                alert,
            });
        }
    }

    /// Fire every due timer and drain pending page messages.
    ///
    /// Order within one call: cursor reporting and idle evaluation first
    /// (they produce page messages), then the message drain, then the video
    /// poll, then the engagement report.
    pub fn advance(&mut self, now: DateTime<Utc>) {
        if !self.running {
            return;
        }

        if due(&mut self.timers.cursor_report, now, self.config.reporting_interval_ms) {
            let reading = self.tracker.take_reading(now);
            self.last_attention = reading.engagement.attention_state;
            self.page_tx.send(PageMessage::Cursor(reading));
        }

        if due(&mut self.timers.idle_check, now, self.config.idle_check_interval_ms) {
            self.evaluate_idle(now);
        }

        for message in self.page_rx.drain() {
            self.handle_message(message, now);
        }

        if due(&mut self.timers.video_poll, now, self.config.video_poll_interval_ms) {
            if let Some(probe) = &self.probe {
                let snapshot = probe.snapshot();
                self.analyzer.poll_media(&snapshot, now);
            }
        }

        if due(&mut self.timers.engagement_report, now, self.config.engagement_interval_ms) {
            self.report_engagement(now);
        }
    }

    /// Analyze current state and push the result to the sink. Safe to call
    /// repeatedly; each call overwrites the previous report.
    pub fn report_engagement(&mut self, now: DateTime<Utc>) {
        let result = self.analyzer.analyze(now);
        self.sink_tx.send(SinkMessage::Update {
            tab_id: self.tab_id,
            data: result,
        });
    }

    /// Idle-evaluation tick: when the idle duration pushes the attention
    /// state into disengaged, emit a reading immediately instead of waiting
    /// for the next reporting tick, so the alert side-effect fires without
    /// delay.
    fn evaluate_idle(&mut self, now: DateTime<Utc>) {
        use crate::cursor::metrics::classify_attention;

        let idle = self.tracker.evaluate_idle(now);
        let attention = classify_attention(idle.duration_ms);

        if attention == AttentionState::Disengaged
            && self.last_attention != AttentionState::Disengaged
        {
            let reading = self.tracker.take_reading(now);
            self.last_attention = reading.engagement.attention_state;
            self.page_tx.send(PageMessage::Cursor(reading));
        }
    }
}

/// Check a deadline; when due, advance it by one interval and report true
fn due(deadline: &mut Option<DateTime<Utc>>, now: DateTime<Utc>, interval_ms: i64) -> bool {
    if let Some(at) = *deadline {
        if now >= at {
            *deadline = Some(now + Duration::milliseconds(interval_ms));
            return true;
        }
    }
    false
}
