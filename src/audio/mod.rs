//! Signal processing stages applied to the model output.

pub mod deemphasis;
pub mod silence;
pub mod wav;

pub use deemphasis::{apply_preemphasis, deemphasis_scale, inverse_preemphasis};
pub use silence::{SilenceConfig, db_to_amplitude, find_end_point};
pub use wav::{
    PcmBuffer, RawWaveform, WaveformEncoder, normalization_factor, peak_amplitude, quantize,
};
