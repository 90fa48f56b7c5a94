//! One reusable real-to-complex FFT plan, shared across every microphone
//! channel (all channels share the same block length). Planning happens once
//! in `FftEngine::new`, off the hot path; `transform_channel` is the per-call
//! per-(m, n) step.

use realfft::{RealFftPlanner, RealToComplex};
use rustfft::num_complex::Complex;
use std::sync::Arc;

use crate::error::BeamformError;
use crate::window::hamming;

/// Scratch space a single channel's transform needs; reused every call so the
/// hot path performs no per-frame allocation.
pub struct ChannelScratch {
    windowed: Vec<f32>,
    fft_scratch: Vec<Complex<f32>>,
}

pub struct FftEngine {
    fft_size: usize,
    num_bins: usize,
    window: Vec<f32>,
    plan: Arc<dyn RealToComplex<f32>>,
}

impl FftEngine {
    /// Builds the real-to-complex plan for `fft_size` samples. Expensive;
    /// call once at `setup`, never on the hot path.
    pub fn new(fft_size: usize) -> Result<Self, BeamformError> {
        if fft_size < 64 || !fft_size.is_power_of_two() {
            return Err(BeamformError::FftSetup(format!(
                "fft_size must be a power of two >= 64, got {}",
                fft_size
            )));
        }
        let mut planner = RealFftPlanner::<f32>::new();
        let plan = planner.plan_fft_forward(fft_size);
        Ok(Self {
            fft_size,
            num_bins: fft_size / 2 + 1,
            window: hamming(fft_size),
            plan,
        })
    }

    pub fn num_bins(&self) -> usize {
        self.num_bins
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    pub fn new_scratch(&self) -> ChannelScratch {
        ChannelScratch {
            windowed: vec![0.0; self.fft_size],
            fft_scratch: self.plan.make_scratch_vec(),
        }
    }

    /// Windows `samples` (length `fft_size`) and writes the one-sided
    /// spectrum (length `num_bins`) into `output`. `&self` is shared
    /// read-only across channels processed in parallel; `scratch` is
    /// per-channel, owned by the caller.
    pub fn transform_channel(
        &self,
        samples: &[f32],
        scratch: &mut ChannelScratch,
        output: &mut [Complex<f32>],
    ) -> Result<(), BeamformError> {
        debug_assert_eq!(samples.len(), self.fft_size);
        debug_assert_eq!(output.len(), self.num_bins);

        for ((dst, &src), &w) in scratch.windowed.iter_mut().zip(samples).zip(&self.window) {
            *dst = src * w;
        }

        self.plan
            .process_with_scratch(&mut scratch.windowed, output, &mut scratch.fft_scratch)
            .map_err(|e| BeamformError::FftSetup(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bin_count_is_one_sided() {
        let engine = FftEngine::new(1024).unwrap();
        assert_eq!(engine.num_bins(), 513);
    }

    #[test]
    fn rejects_non_power_of_two() {
        assert!(FftEngine::new(1000).is_err());
    }

    #[test]
    fn dc_tone_lands_in_bin_zero_with_no_window_leakage_above_bin_one() {
        let engine = FftEngine::new(64).unwrap();
        let mut scratch = engine.new_scratch();
        let samples = vec![1.0f32; 64];
        let mut out = vec![Complex::new(0.0, 0.0); engine.num_bins()];
        engine.transform_channel(&samples, &mut scratch, &mut out).unwrap();
        assert!(out[0].norm() > out[2].norm());
    }
}
