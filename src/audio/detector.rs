//! Audio emotion detector
//!
//! Front door for the audio pipeline: decodes a chunk, extracts features, and
//! classifies it into one [`AudioFeatureReading`]. Each chunk is independent;
//! there is no temporal smoothing across chunks.

use chrono::{DateTime, Utc};
use log::debug;

use crate::audio::classifier::{classify_emotion, map_to_engagement, EmotionThresholds};
use crate::audio::features::{decode_pcm16, extract_features};
use crate::audio::types::AudioFeatureReading;
use crate::error::EngageError;

/// Stateless audio chunk detector
#[derive(Debug, Clone, Default)]
pub struct AudioEmotionDetector {
    thresholds: EmotionThresholds,
    debug: bool,
}

impl AudioEmotionDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a detector with custom classification thresholds
    pub fn with_thresholds(thresholds: EmotionThresholds) -> Self {
        Self {
            thresholds,
            debug: false,
        }
    }

    /// Enable verbose per-chunk diagnostics
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Classify a buffer of normalized single-channel samples.
    ///
    /// A failed extraction means the chunk is dropped by the caller; the
    /// error must not take down reporting for other sources.
    pub fn detect(
        &self,
        samples: &[f32],
        now: DateTime<Utc>,
    ) -> Result<AudioFeatureReading, EngageError> {
        let features = extract_features(samples)?;
        let emotion = classify_emotion(&features, &self.thresholds);
        let engagement = map_to_engagement(emotion);

        if self.debug {
            debug!(
                "audio chunk: energy={:.2} zcr={:.2} variance={:.2} -> {:?}",
                features.energy, features.zero_crossing_rate, features.spectral_variance, emotion
            );
        }

        Ok(AudioFeatureReading {
            timestamp: now,
            features,
            emotion,
            engagement,
        })
    }

    /// Decode a little-endian PCM16 chunk and classify it
    pub fn detect_pcm16(
        &self,
        bytes: &[u8],
        now: DateTime<Utc>,
    ) -> Result<AudioFeatureReading, EngageError> {
        let samples = decode_pcm16(bytes)?;
        self.detect(&samples, now)
    }
}
