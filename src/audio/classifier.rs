//! Rule-based emotion classification
//!
//! A deliberately crude, explainable decision tree over normalized features.
//! The thresholds and label taxonomy are a contract with downstream
//! consumers; tightening or "improving" them changes product behavior.

use serde::{Deserialize, Serialize};

use crate::audio::types::{AudioEngagement, AudioFeatures, Emotion};

/// Classification thresholds over normalized features
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmotionThresholds {
    pub energy_high: f64,
    pub energy_low: f64,
    pub zcr_high: f64,
    pub variance_low: f64,
}

impl Default for EmotionThresholds {
    fn default() -> Self {
        Self {
            energy_high: 0.7,
            energy_low: 0.3,
            zcr_high: 0.6,
            variance_low: 0.3,
        }
    }
}

/// Classify features into a coarse emotion.
///
/// High energy splits on zero-crossing rate (distress vs confusion); low
/// energy splits on spectral variance (boredom vs neutral); mid-range energy
/// is always neutral.
pub fn classify_emotion(features: &AudioFeatures, thresholds: &EmotionThresholds) -> Emotion {
    if features.energy > thresholds.energy_high {
        if features.zero_crossing_rate > thresholds.zcr_high {
            Emotion::Distress
        } else {
            Emotion::Confusion
        }
    } else if features.energy < thresholds.energy_low {
        if features.spectral_variance < thresholds.variance_low {
            Emotion::Boredom
        } else {
            Emotion::Neutral
        }
    } else {
        Emotion::Neutral
    }
}

/// Map a detected emotion onto the engagement label taxonomy
pub fn map_to_engagement(emotion: Emotion) -> AudioEngagement {
    match emotion {
        Emotion::Neutral => AudioEngagement::Engaged,
        Emotion::Confusion => AudioEngagement::NotFullyEngaged,
        Emotion::Boredom => AudioEngagement::NotEngaged,
        Emotion::Distress => AudioEngagement::NotEngaged,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features(energy: f64, zcr: f64, variance: f64) -> AudioFeatures {
        AudioFeatures {
            energy,
            zero_crossing_rate: zcr,
            spectral_variance: variance,
        }
    }

    #[test]
    fn test_high_energy_high_zcr_is_distress() {
        let emotion = classify_emotion(&features(0.8, 0.8, 0.5), &EmotionThresholds::default());
        assert_eq!(emotion, Emotion::Distress);
    }

    #[test]
    fn test_high_energy_low_zcr_is_confusion() {
        let emotion = classify_emotion(&features(0.8, 0.1, 0.5), &EmotionThresholds::default());
        assert_eq!(emotion, Emotion::Confusion);
    }

    #[test]
    fn test_low_energy_low_variance_is_boredom() {
        let emotion = classify_emotion(&features(0.1, 0.1, 0.1), &EmotionThresholds::default());
        assert_eq!(emotion, Emotion::Boredom);
    }

    #[test]
    fn test_low_energy_some_variance_is_neutral() {
        let emotion = classify_emotion(&features(0.1, 0.1, 0.5), &EmotionThresholds::default());
        assert_eq!(emotion, Emotion::Neutral);
    }

    #[test]
    fn test_mid_energy_is_neutral() {
        let emotion = classify_emotion(&features(0.5, 0.9, 0.9), &EmotionThresholds::default());
        assert_eq!(emotion, Emotion::Neutral);
    }

    #[test]
    fn test_engagement_mapping() {
        assert_eq!(map_to_engagement(Emotion::Neutral), AudioEngagement::Engaged);
        assert_eq!(
            map_to_engagement(Emotion::Confusion),
            AudioEngagement::NotFullyEngaged
        );
        assert_eq!(
            map_to_engagement(Emotion::Boredom),
            AudioEngagement::NotEngaged
        );
        assert_eq!(
            map_to_engagement(Emotion::Distress),
            AudioEngagement::NotEngaged
        );
    }
}
