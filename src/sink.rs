//! Background engagement store
//!
//! Passive sink for analyzer output: keeps the latest result per tab,
//! appends disengagement alerts, answers data queries, and evicts state when
//! a tab closes.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::analyzer::types::{AlertLevel, EngagementAlert, EngagementResult};
use crate::analyzer::{Confidence, EngagementState};
use crate::transport::{SinkMessage, TabId};

/// Stored record for one tab
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredEngagement {
    pub result: EngagementResult,
    #[serde(default)]
    pub alerts: Vec<EngagementAlert>,
}

/// Answer to a data query: the stored result, or a clearly-flagged
/// placeholder when nothing has been reported for the tab yet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngagementQueryResponse {
    pub data: EngagementResult,
    /// True when no real data exists for the tab
    pub is_placeholder: bool,
}

/// Latest-result store keyed by tab
#[derive(Debug, Default)]
pub struct EngagementStore {
    tabs: HashMap<TabId, StoredEngagement>,
}

impl EngagementStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one sink message
    pub fn apply(&mut self, message: SinkMessage) {
        match message {
            SinkMessage::Update { tab_id, data } => self.update(tab_id, data),
            SinkMessage::Alert { tab_id, alert } => self.record_alert(tab_id, alert),
        }
    }

    /// Overwrite the latest result for a tab, preserving its alert log
    pub fn update(&mut self, tab_id: TabId, result: EngagementResult) {
        self.tabs
            .entry(tab_id)
            .and_modify(|stored| stored.result = result.clone())
            .or_insert_with(|| StoredEngagement {
                result,
                alerts: Vec::new(),
            });
    }

    /// Append a disengagement alert to the tab's log. Positive alerts are
    /// informational and not retained.
    pub fn record_alert(&mut self, tab_id: TabId, alert: EngagementAlert) {
        if alert.level != AlertLevel::Disengagement {
            return;
        }

        if let Some(stored) = self.tabs.get_mut(&tab_id) {
            stored.alerts.push(alert);
        }
    }

    /// Answer a data query for a tab
    pub fn query(&self, tab_id: TabId) -> EngagementQueryResponse {
        match self.tabs.get(&tab_id) {
            Some(stored) => EngagementQueryResponse {
                data: stored.result.clone(),
                is_placeholder: false,
            },
            None => EngagementQueryResponse {
                data: placeholder_result(),
                is_placeholder: true,
            },
        }
    }

    /// Stored record for a tab, if any
    pub fn get(&self, tab_id: TabId) -> Option<&StoredEngagement> {
        self.tabs.get(&tab_id)
    }

    /// Drop all state for a closed tab
    pub fn remove_tab(&mut self, tab_id: TabId) {
        self.tabs.remove(&tab_id);
    }

    /// Number of tabs with stored data
    pub fn tab_count(&self) -> usize {
        self.tabs.len()
    }
}

/// Neutral response shown when a tab has not reported yet
fn placeholder_result() -> EngagementResult {
    EngagementResult {
        score: 50,
        state: EngagementState::from_score(50, false, false),
        confidence: Confidence::Low,
        factors: vec!["no real data yet".to_string()],
        timestamp: chrono::Utc::now(),
        cursor: None,
        media_state: Default::default(),
        video_engagement: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::AlertSource;
    use chrono::{DateTime, TimeZone, Utc};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 9, 0, 0).unwrap()
    }

    fn result(score: i32) -> EngagementResult {
        EngagementResult {
            score,
            state: EngagementState::from_score(score, false, false),
            confidence: Confidence::High,
            factors: vec![],
            timestamp: t0(),
            cursor: None,
            media_state: Default::default(),
            video_engagement: None,
        }
    }

    fn disengagement_alert() -> EngagementAlert {
        EngagementAlert {
            source: AlertSource::Cursor,
            level: AlertLevel::Disengagement,
            details: None,
            timestamp: t0(),
        }
    }

    #[test]
    fn test_query_before_data_returns_placeholder() {
        let store = EngagementStore::new();
        let response = store.query(1);

        assert!(response.is_placeholder);
        assert_eq!(response.data.score, 50);
        assert_eq!(response.data.state.label(), "passive");
        assert_eq!(response.data.confidence, Confidence::Low);
    }

    #[test]
    fn test_update_overwrites_latest() {
        let mut store = EngagementStore::new();
        store.update(1, result(70));
        store.update(1, result(40));

        let response = store.query(1);
        assert!(!response.is_placeholder);
        assert_eq!(response.data.score, 40);
        assert_eq!(store.tab_count(), 1);
    }

    #[test]
    fn test_tabs_are_independent() {
        let mut store = EngagementStore::new();
        store.update(1, result(70));
        store.update(2, result(30));

        assert_eq!(store.query(1).data.score, 70);
        assert_eq!(store.query(2).data.score, 30);
    }

    #[test]
    fn test_alerts_accumulate_with_updates() {
        let mut store = EngagementStore::new();
        store.update(1, result(70));
        store.record_alert(1, disengagement_alert());
        store.update(1, result(20));
        store.record_alert(1, disengagement_alert());

        let stored = store.get(1).unwrap();
        assert_eq!(stored.alerts.len(), 2);
        assert_eq!(stored.result.score, 20);
    }

    #[test]
    fn test_positive_alerts_not_retained() {
        let mut store = EngagementStore::new();
        store.update(1, result(70));
        store.record_alert(
            1,
            EngagementAlert {
                source: AlertSource::VideoCursor,
                level: AlertLevel::Engaged,
                details: None,
                timestamp: t0(),
            },
        );

        assert!(store.get(1).unwrap().alerts.is_empty());
    }

    #[test]
    fn test_tab_close_evicts() {
        let mut store = EngagementStore::new();
        store.update(1, result(70));
        store.remove_tab(1);

        assert!(store.query(1).is_placeholder);
        assert_eq!(store.tab_count(), 0);
    }

    #[test]
    fn test_apply_routes_messages() {
        let mut store = EngagementStore::new();
        store.apply(SinkMessage::Update {
            tab_id: 3,
            data: result(65),
        });
        store.apply(SinkMessage::Alert {
            tab_id: 3,
            alert: disengagement_alert(),
        });

        let stored = store.get(3).unwrap();
        assert_eq!(stored.result.score, 65);
        assert_eq!(stored.alerts.len(), 1);
    }
}
