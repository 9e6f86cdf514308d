//! End-point detection.
//!
//! Synthesized speech is usually followed by a tail of near-silence (and
//! sometimes babble once attention drifts). The end point is placed a quarter
//! window into the first window whose samples all stay under the threshold.

use crate::defaults;

/// Parameters for end-point detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SilenceConfig {
    /// Threshold in dB; converted to an amplitude with `10^(db / 20)`.
    pub threshold_db: f32,
    /// Minimum silence duration in seconds (the window length).
    pub min_silence_secs: f32,
}

impl Default for SilenceConfig {
    fn default() -> Self {
        Self {
            threshold_db: defaults::SILENCE_THRESHOLD_DB,
            min_silence_secs: defaults::MIN_SILENCE_SECS,
        }
    }
}

impl SilenceConfig {
    /// Amplitude threshold corresponding to `threshold_db`.
    pub fn threshold_amplitude(&self) -> f32 {
        db_to_amplitude(self.threshold_db)
    }

    /// Window length in samples at `sample_rate`.
    pub fn window_length(&self, sample_rate: u32) -> usize {
        (sample_rate as f32 * self.min_silence_secs) as usize
    }
}

/// Convert decibels to a linear amplitude.
pub fn db_to_amplitude(db: f32) -> f32 {
    10f32.powf(db * 0.05)
}

/// Find the index after which the waveform is sustained silence.
///
/// Windows of `window_length` samples start at `hop_length` and advance by
/// `hop_length` (a quarter window) while a full window fits. The first window
/// whose maximum sample value is below the threshold ends the scan and
/// `offset + hop_length` is returned. The maximum is taken over raw values,
/// not magnitudes.
///
/// Returns `samples.len()` when the buffer is shorter than one window or no
/// window qualifies.
pub fn find_end_point(samples: &[f32], sample_rate: u32, config: &SilenceConfig) -> usize {
    let total = samples.len();
    let window_length = config.window_length(sample_rate);
    if window_length == 0 || window_length > total {
        return total;
    }

    let hop_length = (window_length / 4).max(1);
    let threshold = config.threshold_amplitude();

    (1..)
        .map(|step| step * hop_length)
        .take_while(|offset| offset + window_length <= total)
        .find(|&offset| {
            let window = &samples[offset..offset + window_length];
            window_max(window) < threshold
        })
        .map_or(total, |offset| offset + hop_length)
}

fn window_max(window: &[f32]) -> f32 {
    window.iter().copied().fold(f32::NEG_INFINITY, f32::max)
}
