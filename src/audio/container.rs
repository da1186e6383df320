use crate::foundation::error::{WaterfallError, WaterfallResult};
use std::path::Path;

/// How source bytes are reinterpreted as PCM.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// 1 (mono) or 2 (stereo).
    pub channels: u16,
    /// Bytes per sample: 1, 2, 3 or 4.
    pub sample_bytes: u16,
    /// Samples per second per channel, >= 1.
    pub sample_rate: u32,
    /// Percent of full scale, 0..=100.
    pub volume: u8,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            channels: 1,
            sample_bytes: 1,
            sample_rate: 32_000,
            volume: 100,
        }
    }
}

impl AudioSettings {
    /// Create validated settings.
    pub fn new(
        channels: u16,
        sample_bytes: u16,
        sample_rate: u32,
        volume: u8,
    ) -> WaterfallResult<Self> {
        let settings = Self {
            channels,
            sample_bytes,
            sample_rate,
            volume,
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> WaterfallResult<()> {
        if !matches!(self.channels, 1 | 2) {
            return Err(WaterfallError::validation(format!(
                "invalid number of audio channels {}, must be either 1 or 2",
                self.channels
            )));
        }
        if !matches!(self.sample_bytes, 1..=4) {
            return Err(WaterfallError::validation(format!(
                "invalid sample size {} bytes, must be either 1, 2, 3, or 4",
                self.sample_bytes
            )));
        }
        if self.sample_rate < 1 {
            return Err(WaterfallError::validation(
                "invalid sample rate 0, must be at least 1",
            ));
        }
        if self.volume > 100 {
            return Err(WaterfallError::validation(format!(
                "volume {} out of range, must be between 0 and 100",
                self.volume
            )));
        }
        Ok(())
    }

    /// Bytes per interleaved frame (one sample for every channel).
    pub fn frame_bytes(&self) -> u64 {
        u64::from(self.channels) * u64::from(self.sample_bytes)
    }

    /// Volume expressed as a gain in decibels (`-inf` at volume 0).
    pub fn gain_db(&self) -> f64 {
        20.0 * (f64::from(self.volume) / 100.0).log10()
    }
}

/// `ceil(1000 * data_len / (channels * sample_bytes * sample_rate))`.
pub fn duration_ms(data_len: u64, settings: &AudioSettings) -> u64 {
    let bytes_per_sec = u128::from(settings.frame_bytes()) * u128::from(settings.sample_rate);
    if bytes_per_sec == 0 {
        return 0;
    }
    (u128::from(data_len) * 1000).div_ceil(bytes_per_sec) as u64
}

/// Source bytes reinterpreted as little-endian integer PCM, volume applied.
///
/// Built in one shot; changing the source or the settings means building a new container.
#[derive(Clone, Debug)]
pub struct AudioContainer {
    settings: AudioSettings,
    pcm: Vec<u8>,
    duration_ms: u64,
}

impl AudioContainer {
    /// Build the PCM payload for `buffer` under `settings`.
    ///
    /// At volume 100 the payload is byte-identical to `buffer`. Otherwise every sample is scaled
    /// by `10^(gain_db / 20)`; the scale never exceeds 1 so nothing clips, and volume 0 yields
    /// silence.
    #[tracing::instrument(skip(buffer), fields(bytes = buffer.len()))]
    pub fn build(buffer: &[u8], settings: AudioSettings) -> WaterfallResult<Self> {
        settings.validate()?;

        let pcm = if settings.volume == 100 {
            buffer.to_vec()
        } else {
            let ratio = 10f64.powf(settings.gain_db() / 20.0);
            scale_pcm(buffer, usize::from(settings.sample_bytes), ratio)
        };
        let duration_ms = duration_ms(pcm.len() as u64, &settings);
        tracing::debug!(duration_ms, "built audio container");

        Ok(Self {
            settings,
            pcm,
            duration_ms,
        })
    }

    pub fn settings(&self) -> &AudioSettings {
        &self.settings
    }

    /// Raw little-endian PCM payload.
    pub fn pcm(&self) -> &[u8] {
        &self.pcm
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    /// Write the container as a RIFF/WAVE file.
    ///
    /// A trailing partial frame is zero-padded to a whole frame, since WAVE data must be
    /// frame aligned.
    pub fn write_wav(&self, path: &Path) -> WaterfallResult<()> {
        let map_err = |e: hound::Error| match e {
            hound::Error::IoError(io) => WaterfallError::io(path, io),
            other => WaterfallError::encode(format!(
                "failed to write wav '{}': {other}",
                path.display()
            )),
        };

        let spec = hound::WavSpec {
            channels: self.settings.channels,
            sample_rate: self.settings.sample_rate,
            bits_per_sample: self.settings.sample_bytes * 8,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).map_err(map_err)?;

        let frame_bytes = self.settings.frame_bytes() as usize;
        let sample_bytes = usize::from(self.settings.sample_bytes);
        let mut padded = [0u8; 8];
        for frame in self.pcm.chunks(frame_bytes) {
            let frame = if frame.len() == frame_bytes {
                frame
            } else {
                padded[..frame.len()].copy_from_slice(frame);
                padded[frame.len()..frame_bytes].fill(0);
                &padded[..frame_bytes]
            };
            for sample in frame.chunks_exact(sample_bytes) {
                writer
                    .write_sample(decode_sample(sample))
                    .map_err(map_err)?;
            }
        }
        writer.finalize().map_err(map_err)
    }
}

/// Signed value of one little-endian sample (8-bit PCM is unsigned with a 128 bias).
fn decode_sample(sample: &[u8]) -> i32 {
    match sample.len() {
        1 => i32::from(sample[0]) - 128,
        2 => i32::from(i16::from_le_bytes([sample[0], sample[1]])),
        3 => i32::from_le_bytes([0, sample[0], sample[1], sample[2]]) >> 8,
        _ => i32::from_le_bytes([sample[0], sample[1], sample[2], sample[3]]),
    }
}

fn encode_sample(v: i32, out: &mut [u8]) {
    match out.len() {
        1 => out[0] = (v + 128) as u8,
        2 => out.copy_from_slice(&(v as i16).to_le_bytes()),
        3 => out.copy_from_slice(&v.to_le_bytes()[..3]),
        _ => out.copy_from_slice(&v.to_le_bytes()),
    }
}

fn sample_bounds(sample_bytes: usize) -> (f64, f64) {
    let bits = sample_bytes as u32 * 8;
    let max = (1i64 << (bits - 1)) - 1;
    (-(max as f64) - 1.0, max as f64)
}

fn scale_pcm(buffer: &[u8], sample_bytes: usize, ratio: f64) -> Vec<u8> {
    let (min, max) = sample_bounds(sample_bytes);
    let mut out = Vec::with_capacity(buffer.len());
    let mut scratch = [0u8; 4];
    for chunk in buffer.chunks(sample_bytes) {
        // A trailing partial sample is scaled as if zero-extended, then truncated back.
        let sample = &mut scratch[..sample_bytes];
        sample.fill(0);
        sample[..chunk.len()].copy_from_slice(chunk);

        let scaled = (f64::from(decode_sample(sample)) * ratio).floor().clamp(min, max);
        encode_sample(scaled as i32, sample);
        out.extend_from_slice(&sample[..chunk.len()]);
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/audio/container.rs"]
mod tests;
