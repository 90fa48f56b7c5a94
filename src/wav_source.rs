//! Reference audio-block producer (module 4.H, ambient expansion): reads a
//! multichannel WAV file and yields successive (M, N, B) blocks satisfying
//! the audio-input contract in spec §6. Grounded on `original_source/wav.h`'s
//! `WAV` class — same validation against the camera's channel count, sample
//! rate, and bit depth before any block is produced.
//!
//! This is a producer external to the core: the pipeline never depends on
//! it, only the demo binary and integration tests do.

use log::info;

use crate::config::BeamformerConfig;
use crate::error::BeamformError;
use crate::tensor::Tensor;

/// (M, N) -> raw interleaved channel index. Defaults to row-major
/// (`m * n_channels + n`) unless the capture hardware wires channels
/// differently.
pub struct ChannelOrder {
    table: Vec<usize>,
    n_channels: usize,
}

impl ChannelOrder {
    pub fn row_major(m_channels: usize, n_channels: usize) -> Self {
        Self {
            table: (0..m_channels * n_channels).collect(),
            n_channels,
        }
    }

    pub fn raw_index(&self, m: usize, n: usize) -> usize {
        self.table[m * self.n_channels + n]
    }
}

pub struct WavAudioSource {
    reader: hound::WavReader<std::io::BufReader<std::fs::File>>,
    channel_order: ChannelOrder,
    m_channels: usize,
    n_channels: usize,
    fft_size: usize,
}

impl WavAudioSource {
    /// Opens `path` and validates it against `config`'s channel count,
    /// sample rate, and (32-bit float) bit depth, mirroring
    /// `WAV::setup`'s checks against `NUM_CHANNELS` / `SAMPLE_RATE`.
    pub fn open(path: impl AsRef<std::path::Path>, config: &BeamformerConfig) -> Result<Self, BeamformError> {
        let reader = hound::WavReader::open(path.as_ref())
            .map_err(|e| BeamformError::ConfigIo(std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())))?;
        let spec = reader.spec();

        let expected_channels = (config.m_channels * config.n_channels) as u16;
        if spec.channels != expected_channels {
            return Err(BeamformError::InvalidShape(format!(
                "wav file has {} channels, camera configuration expects {}",
                spec.channels, expected_channels
            )));
        }
        if spec.sample_rate != config.sample_rate {
            return Err(BeamformError::InvalidShape(format!(
                "wav file sample rate {} does not match configured {}",
                spec.sample_rate, config.sample_rate
            )));
        }
        if spec.sample_format != hound::SampleFormat::Float || spec.bits_per_sample != 32 {
            return Err(BeamformError::InvalidShape(
                "wav file must be 32-bit float PCM".into(),
            ));
        }

        info!(
            "loaded wav source: {} channels, {} Hz, 32-bit float",
            spec.channels, spec.sample_rate
        );

        Ok(Self {
            reader,
            channel_order: ChannelOrder::row_major(config.m_channels, config.n_channels),
            m_channels: config.m_channels,
            n_channels: config.n_channels,
            fft_size: config.fft_size,
        })
    }

    /// Reads the next `fft_size`-frame block, applying the channel
    /// permutation, or `Ok(None)` at end of file.
    pub fn next_block(&mut self) -> Result<Option<Tensor<f32, 3>>, BeamformError> {
        let num_channels = self.m_channels * self.n_channels;
        let mut interleaved = Vec::with_capacity(self.fft_size * num_channels);

        for sample in self.reader.samples::<f32>().take(self.fft_size * num_channels) {
            let sample = sample.map_err(|e| {
                BeamformError::ConfigIo(std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
            })?;
            interleaved.push(sample);
        }

        if interleaved.is_empty() {
            return Ok(None);
        }
        let frames_read = interleaved.len() / num_channels;

        let mut block = Tensor::<f32, 3>::new([self.m_channels, self.n_channels, self.fft_size])?;
        for b in 0..frames_read {
            for m in 0..self.m_channels {
                for n in 0..self.n_channels {
                    let raw = self.channel_order.raw_index(m, n);
                    *block.at_mut([m, n, b]) = interleaved[b * num_channels + raw];
                }
            }
        }
        Ok(Some(block))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_major_is_identity() {
        let order = ChannelOrder::row_major(2, 2);
        assert_eq!(order.raw_index(0, 0), 0);
        assert_eq!(order.raw_index(1, 1), 3);
    }
}
