//! Waveform normalization, 16-bit quantization and WAV container I/O.

use crate::defaults::{BITS_PER_SAMPLE, PCM_MAX, PCM_TARGET_PEAK, PEAK_FLOOR};
use crate::error::{Result, TtsPostError};
use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;

/// Largest absolute sample value.
///
/// # Errors
/// `EmptyBuffer` when there are no samples, since no peak is defined.
pub fn peak_amplitude(samples: &[f32]) -> Result<f32> {
    if samples.is_empty() {
        return Err(TtsPostError::EmptyBuffer {
            message: "cannot normalize a waveform with no samples".to_string(),
        });
    }
    Ok(samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max))
}

/// Gain that maps `peak` to full scale, with the peak floored at 0.01.
pub fn normalization_factor(peak: f32) -> f32 {
    PCM_TARGET_PEAK / peak.max(PEAK_FLOOR)
}

/// Scale samples so that `peak` lands on full scale, then saturate into
/// unsigned 16-bit values.
///
/// Samples are divided by the floored peak before the full-scale multiply, so a
/// sample equal to the peak becomes exactly 32767. Each scaled value is clamped
/// to `[0, 65535]` and truncated, so negative samples become 0 rather than
/// wrapping or being offset.
pub fn quantize(samples: &[f32], peak: f32) -> Vec<u16> {
    let peak = peak.max(PEAK_FLOOR);
    samples
        .iter()
        .map(|&s| (PCM_TARGET_PEAK * (s / peak)).clamp(0.0, PCM_MAX) as u16)
        .collect()
}

/// Quantized mono PCM ready to be written as a WAV file.
#[derive(Debug, Clone, PartialEq)]
pub struct PcmBuffer {
    samples: Vec<u16>,
    sample_rate: u32,
    peak: f32,
    factor: f32,
}

impl PcmBuffer {
    pub fn samples(&self) -> &[u16] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Peak absolute amplitude of the float input.
    pub fn peak(&self) -> f32 {
        self.peak
    }

    /// Normalization factor applied during quantization.
    pub fn factor(&self) -> f32 {
        self.factor
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds
    pub fn duration_secs(&self) -> f32 {
        self.samples.len() as f32 / self.sample_rate as f32
    }

    fn spec(&self) -> hound::WavSpec {
        hound::WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample: BITS_PER_SAMPLE,
            sample_format: hound::SampleFormat::Int,
        }
    }

    /// Serialize as a RIFF/WAV stream.
    ///
    /// The payload carries each 16-bit value unchanged; the container marks it
    /// as signed PCM, which is how players read a 16-bit data chunk.
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> hound::Result<()> {
        let mut wav = hound::WavWriter::new(writer, self.spec())?;
        for &sample in &self.samples {
            wav.write_sample(sample as i16)?;
        }
        wav.finalize()
    }

    /// Serialize into an in-memory WAV image.
    pub fn to_wav_bytes(&self) -> Result<Vec<u8>> {
        let mut cursor = Cursor::new(Vec::new());
        self.write_to(&mut cursor)
            .map_err(|e| TtsPostError::io("<memory>", e))?;
        Ok(cursor.into_inner())
    }

    /// Write to a WAV file, succeeding only once the header is finalized.
    ///
    /// # Errors
    /// `Io` naming `path` if the file cannot be created or fully written.
    pub fn write_wav(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path).map_err(|e| TtsPostError::io(path, e))?;
        self.write_to(std::io::BufWriter::new(file))
            .map_err(|e| TtsPostError::io(path, e))
    }
}

/// Normalizes and quantizes float waveforms at a fixed sample rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaveformEncoder {
    sample_rate: u32,
}

impl WaveformEncoder {
    pub fn new(sample_rate: u32) -> Self {
        Self { sample_rate }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Normalize to the 16-bit peak and quantize.
    ///
    /// # Errors
    /// `EmptyBuffer` if `samples` is empty.
    pub fn encode(&self, samples: &[f32]) -> Result<PcmBuffer> {
        let peak = peak_amplitude(samples)?;
        Ok(PcmBuffer {
            samples: quantize(samples, peak),
            sample_rate: self.sample_rate,
            peak,
            factor: normalization_factor(peak),
        })
    }
}

/// Float waveform read back from a WAV file.
#[derive(Debug, Clone, PartialEq)]
pub struct RawWaveform {
    /// Mono samples; integer formats are scaled to [-1.0, 1.0).
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl RawWaveform {
    /// Open and decode a WAV file.
    pub fn load(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path).map_err(|e| TtsPostError::io(path, e))?;
        Self::from_reader(std::io::BufReader::new(file), &path.display().to_string())
    }

    /// Decode WAV data from any reader. Multi-channel input is averaged to mono.
    pub fn from_reader<R: Read>(reader: R, resource: &str) -> Result<Self> {
        let parse_error = |e: hound::Error| TtsPostError::Parse {
            resource: resource.to_string(),
            message: format!("Failed to parse WAV file: {}", e),
        };

        let wav_reader = hound::WavReader::new(reader).map_err(parse_error)?;
        let spec = wav_reader.spec();
        let channels = spec.channels as usize;
        if channels == 0 {
            return Err(TtsPostError::Parse {
                resource: resource.to_string(),
                message: "WAV file declares zero channels".to_string(),
            });
        }

        let interleaved: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => wav_reader
                .into_samples::<f32>()
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(parse_error)?,
            hound::SampleFormat::Int => {
                let scale = (1u64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
                wav_reader
                    .into_samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / scale))
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map_err(parse_error)?
            }
        };

        let samples = if channels > 1 {
            interleaved
                .chunks_exact(channels)
                .map(|frame| frame.iter().sum::<f32>() / channels as f32)
                .collect()
        } else {
            interleaved
        };

        Ok(Self {
            samples,
            sample_rate: spec.sample_rate,
        })
    }
}
