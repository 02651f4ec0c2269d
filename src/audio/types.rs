//! Audio reading types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Rule-classified coarse emotion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Emotion {
    Neutral,
    Confusion,
    Boredom,
    Distress,
}

/// Engagement label mapped from the detected emotion.
///
/// The display strings are a contract with downstream consumers and must not
/// be reworded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AudioEngagement {
    #[serde(rename = "Engaged")]
    Engaged,
    #[serde(rename = "Not Fully Engaged")]
    NotFullyEngaged,
    #[serde(rename = "Not Engaged")]
    NotEngaged,
    #[serde(rename = "Unknown")]
    Unknown,
}

impl AudioEngagement {
    /// The exact label string consumers key off
    pub fn label(&self) -> &'static str {
        match self {
            AudioEngagement::Engaged => "Engaged",
            AudioEngagement::NotFullyEngaged => "Not Fully Engaged",
            AudioEngagement::NotEngaged => "Not Engaged",
            AudioEngagement::Unknown => "Unknown",
        }
    }
}

/// Extracted time-domain features, each normalized to [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AudioFeatures {
    /// RMS energy against the [0, 0.3] calibration range
    pub energy: f64,
    /// Adjacent-sample sign changes against the [0, 0.5] range
    pub zero_crossing_rate: f64,
    /// Above-floor magnitude sum against a buffer-length-scaled range
    pub spectral_variance: f64,
}

/// Classified snapshot for one audio chunk; independent of previous chunks
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AudioFeatureReading {
    pub timestamp: DateTime<Utc>,
    pub features: AudioFeatures,
    pub emotion: Emotion,
    pub engagement: AudioEngagement,
}
