//! Holds two consecutive audio blocks so per-channel time delays can reach
//! backward across a block boundary without copying. The current frequency-
//! domain beamformer only reads the current block (logical indices `0..B`),
//! but the component is still maintained so the audio-input contract matches
//! what a future fractional-delay consumer would need.

use crate::error::BeamformError;
use crate::tensor::Tensor;

pub struct AudioDoubleBuffer {
    previous: Tensor<f32, 3>,
    current: Tensor<f32, 3>,
    fft_size: usize,
}

impl AudioDoubleBuffer {
    pub fn new(m_channels: usize, n_channels: usize, fft_size: usize) -> Result<Self, BeamformError> {
        Ok(Self {
            previous: Tensor::new([m_channels, n_channels, fft_size])?,
            current: Tensor::new([m_channels, n_channels, fft_size])?,
            fft_size,
        })
    }

    /// `previous := old current; current := new_block`. No allocation.
    pub fn record(&mut self, new_block: &Tensor<f32, 3>) {
        std::mem::swap(&mut self.previous, &mut self.current);
        self.current.copy_from(new_block);
    }

    /// Reads the sample at logical index `b in [-fft_size, fft_size)`:
    /// `b < 0` selects `previous`, `b >= 0` selects `current`.
    pub fn at(&self, m: usize, n: usize, b: isize) -> f32 {
        debug_assert!(b >= -(self.fft_size as isize) && b < self.fft_size as isize);
        if b >= 0 {
            *self.current.at([m, n, b as usize])
        } else {
            *self.previous.at([m, n, (b + self.fft_size as isize) as usize])
        }
    }

    /// Contiguous view of the current block for one microphone, i.e. logical
    /// indices `0..fft_size`.
    pub fn current_channel(&self, m: usize, n: usize) -> &[f32] {
        self.current.trailing_slice(&[m, n])
    }

    /// Flat view of the whole current block, in (m, n, b) row-major order —
    /// `chunks(fft_size)` over this slice yields each channel's samples in
    /// the same order `Tensor::trailing_slice` would.
    pub fn current_flat(&self) -> &[f32] {
        self.current.as_slice()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_rotates_current_into_previous() {
        let mut buf = AudioDoubleBuffer::new(1, 1, 4).unwrap();
        let mut block_a = Tensor::<f32, 3>::new([1, 1, 4]).unwrap();
        block_a.fill(1.0);
        buf.record(&block_a);

        let mut block_b = Tensor::<f32, 3>::new([1, 1, 4]).unwrap();
        block_b.fill(2.0);
        buf.record(&block_b);

        assert_eq!(buf.at(0, 0, 0), 2.0);
        assert_eq!(buf.at(0, 0, -4), 1.0);
    }

    #[test]
    fn current_channel_matches_recorded_block() {
        let mut buf = AudioDoubleBuffer::new(2, 2, 4).unwrap();
        let mut block = Tensor::<f32, 3>::new([2, 2, 4]).unwrap();
        for (i, v) in block.trailing_slice_mut(&[1, 0]).iter_mut().enumerate() {
            *v = i as f32;
        }
        buf.record(&block);
        assert_eq!(buf.current_channel(1, 0), &[0.0, 1.0, 2.0, 3.0]);
    }
}
