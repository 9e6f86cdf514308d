//! Pre-emphasis filter pair.
//!
//! Training data is pre-emphasized with `y[n] = x[n] - k * x[n-1]` and the
//! model output goes through a one-pole recurrence before playback.
//! `apply_preemphasis(x, c)` and `inverse_preemphasis(_, c)` undo each other
//! for the same `c`.

use crate::config::HyperParameters;
use crate::error::{Result, TtsPostError};

/// Reverse a pre-emphasis filter.
///
/// Computes `y[0] = x[0]` and `y[n] = x[n] + scale * y[n-1]`.
/// [`apply_preemphasis`] with the same `scale` is its exact inverse.
///
/// The recurrence is strictly sequential and runs as one forward pass in
/// single precision. No clamping is applied.
///
/// # Errors
/// `InvalidArgument` if `samples` is empty.
pub fn inverse_preemphasis(samples: &[f32], scale: f32) -> Result<Vec<f32>> {
    let (&first, rest) = samples
        .split_first()
        .ok_or_else(|| TtsPostError::InvalidArgument {
            message: "cannot de-emphasize an empty waveform".to_string(),
        })?;

    let mut output = Vec::with_capacity(samples.len());
    output.push(first);
    output.extend(rest.iter().scan(first, |previous, &x| {
        *previous = x + scale * *previous;
        Some(*previous)
    }));
    Ok(output)
}

/// Scale argument for [`inverse_preemphasis`] derived from hyperparameters.
///
/// The pipeline uses the negated coefficient, `-preemphasis`.
pub fn deemphasis_scale(hparams: &HyperParameters) -> f32 {
    -hparams.preemphasis
}

/// Apply the forward pre-emphasis filter `y[n] = x[n] - coefficient * x[n-1]`.
///
/// Empty input yields empty output.
pub fn apply_preemphasis(samples: &[f32], coefficient: f32) -> Vec<f32> {
    let Some(&first) = samples.first() else {
        return Vec::new();
    };

    std::iter::once(first)
        .chain(
            samples
                .windows(2)
                .map(|pair| pair[1] - coefficient * pair[0]),
        )
        .collect()
}
