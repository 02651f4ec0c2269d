//! Message transport
//!
//! Typed messages between the page-context trackers and the analyzer, and
//! between the analyzer and the background sink. Delivery is asynchronous
//! in-process message passing with no synchronous waits; a failed send means
//! the receiving side is gone and is logged and swallowed, never propagated.

use log::warn;
use serde::{Deserialize, Serialize};
use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};

use crate::analyzer::{EngagementAlert, EngagementResult};
use crate::audio::AudioFeatureReading;
use crate::cursor::CursorReading;
use crate::video::VideoReading;

/// Identifier of the tab a session is attached to
pub type TabId = u32;

/// Page-context tracker output, routed to the analyzer by tag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PageMessage {
    #[serde(rename = "CURSOR_DATA")]
    Cursor(CursorReading),
    #[serde(rename = "AUDIO_DATA")]
    Audio(AudioFeatureReading),
    #[serde(rename = "VIDEO_DATA")]
    Video(VideoReading),
}

/// Analyzer output bound for the background sink
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SinkMessage {
    #[serde(rename = "ENGAGEMENT_UPDATE")]
    Update {
        tab_id: TabId,
        data: EngagementResult,
    },
    #[serde(rename = "ENGAGEMENT_ALERT")]
    Alert {
        tab_id: TabId,
        #[serde(flatten)]
        alert: EngagementAlert,
    },
}

/// Sending half of a channel; drops messages when the receiver is gone
#[derive(Debug, Clone)]
pub struct MessageSender<T> {
    inner: Sender<T>,
    label: &'static str,
}

impl<T> MessageSender<T> {
    /// Send a message. Returns whether delivery succeeded; failure is logged
    /// and otherwise ignored.
    pub fn send(&self, message: T) -> bool {
        match self.inner.send(message) {
            Ok(()) => true,
            Err(_) => {
                warn!("{} channel closed, dropping message", self.label);
                false
            }
        }
    }
}

/// Receiving half of a channel
#[derive(Debug)]
pub struct MessageReceiver<T> {
    inner: Receiver<T>,
}

impl<T> MessageReceiver<T> {
    /// Drain every pending message without blocking
    pub fn drain(&self) -> Vec<T> {
        let mut messages = Vec::new();
        loop {
            match self.inner.try_recv() {
                Ok(message) => messages.push(message),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        messages
    }
}

/// Channel for page-context tracker readings
pub fn page_channel() -> (MessageSender<PageMessage>, MessageReceiver<PageMessage>) {
    let (tx, rx) = channel();
    (
        MessageSender {
            inner: tx,
            label: "page",
        },
        MessageReceiver { inner: rx },
    )
}

/// Channel for sink-bound analyzer output
pub fn sink_channel() -> (MessageSender<SinkMessage>, MessageReceiver<SinkMessage>) {
    let (tx, rx) = channel();
    (
        MessageSender {
            inner: tx,
            label: "sink",
        },
        MessageReceiver { inner: rx },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::{AlertLevel, AlertSource};
    use crate::cursor::{
        ActivityLevel, AttentionState, CursorEngagement, CursorMetrics, CursorPosition,
        FocusQuality, IdleState,
    };
    use chrono::{TimeZone, Utc};

    fn cursor_reading() -> CursorReading {
        CursorReading {
            timestamp: Utc.with_ymd_and_hms(2024, 3, 10, 9, 0, 0).unwrap(),
            position: CursorPosition { x: 12.0, y: 34.0 },
            metrics: CursorMetrics {
                speed: 120.0,
                jitter: 0.3,
                idle: IdleState::default(),
            },
            engagement: CursorEngagement {
                activity_level: ActivityLevel::Medium,
                focus_quality: FocusQuality::Normal,
                attention_state: AttentionState::Active,
            },
        }
    }

    #[test]
    fn test_cursor_message_wire_format() {
        let message = PageMessage::Cursor(cursor_reading());
        let json = serde_json::to_value(&message).unwrap();

        assert_eq!(json["type"], "CURSOR_DATA");
        assert_eq!(json["position"]["x"], 12.0);
        assert_eq!(json["metrics"]["speed"], 120.0);
        assert_eq!(json["engagement"]["activity_level"], "medium");

        let parsed: PageMessage = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, message);
    }

    #[test]
    fn test_alert_message_wire_format() {
        let message = SinkMessage::Alert {
            tab_id: 7,
            alert: EngagementAlert {
                source: AlertSource::Cursor,
                level: AlertLevel::Disengagement,
                details: None,
                timestamp: Utc.with_ymd_and_hms(2024, 3, 10, 9, 0, 0).unwrap(),
            },
        };

        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["type"], "ENGAGEMENT_ALERT");
        assert_eq!(json["source"], "cursor");
        assert_eq!(json["level"], "disengagement");
        assert_eq!(json["tab_id"], 7);
    }

    #[test]
    fn test_channel_round_trip_and_drain() {
        let (tx, rx) = page_channel();
        assert!(tx.send(PageMessage::Cursor(cursor_reading())));
        assert!(tx.send(PageMessage::Cursor(cursor_reading())));

        let messages = rx.drain();
        assert_eq!(messages.len(), 2);
        assert!(rx.drain().is_empty());
    }

    #[test]
    fn test_send_to_dropped_receiver_is_swallowed() {
        let (tx, rx) = page_channel();
        drop(rx);
        // Must not panic; reports failure
        assert!(!tx.send(PageMessage::Cursor(cursor_reading())));
    }
}
