//! Report encoding
//!
//! Wraps an [`EngagementResult`] in a versioned payload with producer
//! metadata and tab provenance for consumers outside the process.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analyzer::EngagementResult;
use crate::error::EngageError;
use crate::transport::TabId;
use crate::{ENGINE_VERSION, PRODUCER_NAME};

/// Current report schema version
pub const REPORT_VERSION: &str = "1.0";

/// Producer metadata stamped on every payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
    /// Unique instance identifier (UUID)
    pub instance_id: String,
}

/// Versioned engagement report payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngagementReport {
    pub report_version: String,
    pub producer: ReportProducer,
    pub tab_id: TabId,
    pub session_id: String,
    pub computed_at_utc: String,
    pub result: EngagementResult,
}

/// Report encoder with a stable per-process instance ID
#[derive(Debug, Clone)]
pub struct ReportEncoder {
    instance_id: String,
    session_id: String,
}

impl Default for ReportEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportEncoder {
    /// Create an encoder with generated instance and session IDs
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
            session_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with specific IDs
    pub fn with_ids(instance_id: String, session_id: String) -> Self {
        Self {
            instance_id,
            session_id,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Wrap a result in a report payload
    pub fn encode(
        &self,
        tab_id: TabId,
        result: EngagementResult,
        now: DateTime<Utc>,
    ) -> EngagementReport {
        EngagementReport {
            report_version: REPORT_VERSION.to_string(),
            producer: ReportProducer {
                name: PRODUCER_NAME.to_string(),
                version: ENGINE_VERSION.to_string(),
                instance_id: self.instance_id.clone(),
            },
            tab_id,
            session_id: self.session_id.clone(),
            computed_at_utc: now.to_rfc3339(),
            result,
        }
    }

    /// Encode to a JSON string
    pub fn encode_to_json(
        &self,
        tab_id: TabId,
        result: EngagementResult,
        now: DateTime<Utc>,
    ) -> Result<String, EngageError> {
        let report = self.encode(tab_id, result, now);
        serde_json::to_string(&report).map_err(EngageError::JsonError)
    }
}
