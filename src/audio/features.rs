//! Audio feature extraction
//!
//! Time-domain features over a single-channel sample buffer. Normalization
//! ranges are fixed empirical calibrations; values are clamped to [0, 1].

use crate::audio::types::AudioFeatures;
use crate::error::EngageError;

/// RMS energy calibration ceiling
const ENERGY_RANGE_MAX: f64 = 0.3;

/// Zero-crossing rate calibration ceiling
const ZCR_RANGE_MAX: f64 = 0.5;

/// Amplitude floor below which samples do not count toward spectral variance
const VARIANCE_AMPLITUDE_FLOOR: f64 = 0.2;

/// Per-sample scale of the spectral variance calibration ceiling
const VARIANCE_RANGE_SCALE: f64 = 0.05;

/// Extract normalized features from a sample buffer.
///
/// Errors on an empty buffer; a caller dropping the chunk is the expected
/// handling, matching the decode-failure path.
pub fn extract_features(samples: &[f32]) -> Result<AudioFeatures, EngageError> {
    if samples.is_empty() {
        return Err(EngageError::InsufficientSamples(
            "audio chunk contains no samples".to_string(),
        ));
    }

    let len = samples.len() as f64;

    let sum_squares: f64 = samples.iter().map(|&s| (s as f64) * (s as f64)).sum();
    let rms_energy = (sum_squares / len).sqrt();

    let zero_crossings = samples
        .windows(2)
        .filter(|pair| (pair[0] >= 0.0) != (pair[1] >= 0.0))
        .count();
    let zero_crossing_rate = if samples.len() > 1 {
        zero_crossings as f64 / (len - 1.0)
    } else {
        0.0
    };

    // Spectral proxy: accumulated magnitude of samples above the floor,
    // not a true FFT
    let spectral_variance: f64 = samples
        .iter()
        .map(|&s| (s as f64).abs())
        .filter(|&m| m > VARIANCE_AMPLITUDE_FLOOR)
        .sum();

    Ok(AudioFeatures {
        energy: normalize(rms_energy, 0.0, ENERGY_RANGE_MAX),
        zero_crossing_rate: normalize(zero_crossing_rate, 0.0, ZCR_RANGE_MAX),
        spectral_variance: normalize(spectral_variance, 0.0, len * VARIANCE_RANGE_SCALE),
    })
}

/// Decode a little-endian PCM16 byte chunk into normalized f32 samples.
///
/// Empty or odd-length input is a decode failure; the chunk is dropped by the
/// caller with no retry.
pub fn decode_pcm16(bytes: &[u8]) -> Result<Vec<f32>, EngageError> {
    if bytes.is_empty() {
        return Err(EngageError::DecodeError("empty audio chunk".to_string()));
    }
    if bytes.len() % 2 != 0 {
        return Err(EngageError::DecodeError(format!(
            "PCM16 chunk has odd length {}",
            bytes.len()
        )));
    }

    Ok(bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]) as f32 / i16::MAX as f32)
        .collect())
}

fn normalize(value: f64, min: f64, max: f64) -> f64 {
    if max <= min {
        return 0.0;
    }
    ((value - min) / (max - min)).clamp(0.0, 1.0)
}
