//! Precomputes the per-(θ, φ, m, n, bin) complex phase factor that implements
//! far-field delay-and-sum in the frequency domain. Built once at `setup`
//! from the immutable array/sweep configuration; never mutated afterward.

use rayon::prelude::*;
use rustfft::num_complex::Complex;
use std::f64::consts::PI;

use crate::config::BeamformerConfig;
use crate::error::BeamformError;
use crate::tensor::Tensor;

/// `(num_theta, num_phi, M, N, K)` tensor of unit-magnitude complex weights.
pub struct SteeringTable {
    weights: Tensor<Complex<f32>, 5>,
    num_theta: usize,
    num_phi: usize,
    m_channels: usize,
    n_channels: usize,
    num_bins: usize,
}

impl SteeringTable {
    /// `tau(theta, phi, m, n) = (d / c) * (m*sin(theta)*cos(phi) + n*sin(theta)*sin(phi))`,
    /// `W = exp(+j * 2*pi * k * fs * tau / B)`.
    pub fn build(config: &BeamformerConfig) -> Result<Self, BeamformError> {
        config.validate()?;

        let num_theta = config.num_theta();
        let num_phi = config.num_phi();
        let m_channels = config.m_channels;
        let n_channels = config.n_channels;
        let num_bins = config.num_bins();
        let fft_size = config.fft_size as f64;
        let fs = config.sample_rate as f64;
        let d_over_c = config.mic_spacing / config.speed_of_sound;

        let mut weights = Tensor::<Complex<f32>, 5>::new([num_theta, num_phi, m_channels, n_channels, num_bins])?;

        let theta_sweep = config.theta_sweep;
        let phi_sweep = config.phi_sweep;

        // (theta, phi) pairs are independent; parallelize the setup-time
        // sweep the same way the hot path parallelizes step 2.
        let rows: Vec<(usize, usize, Vec<Complex<f32>>)> = (0..num_theta * num_phi)
            .into_par_iter()
            .map(|flat| {
                let ti = flat / num_phi;
                let pi = flat % num_phi;
                let theta = (theta_sweep.min_deg + ti as f64 * theta_sweep.step_deg).to_radians();
                let phi = (phi_sweep.min_deg + pi as f64 * phi_sweep.step_deg).to_radians();
                let mut cell = Vec::with_capacity(m_channels * n_channels * num_bins);
                for m in 0..m_channels {
                    for n in 0..n_channels {
                        let tau = d_over_c
                            * (m as f64 * theta.sin() * phi.cos() + n as f64 * theta.sin() * phi.sin());
                        for k in 0..num_bins {
                            let phase = 2.0 * PI * k as f64 * fs * tau / fft_size;
                            cell.push(Complex::new(phase.cos() as f32, phase.sin() as f32));
                        }
                    }
                }
                (ti, pi, cell)
            })
            .collect();

        for (ti, pi, cell) in rows {
            for m in 0..m_channels {
                for n in 0..n_channels {
                    let src_off = (m * n_channels + n) * num_bins;
                    let dst = weights.trailing_slice_mut(&[ti, pi, m, n]);
                    dst.copy_from_slice(&cell[src_off..src_off + num_bins]);
                }
            }
        }

        Ok(Self {
            weights,
            num_theta,
            num_phi,
            m_channels,
            n_channels,
            num_bins,
        })
    }

    pub fn num_theta(&self) -> usize {
        self.num_theta
    }

    pub fn num_phi(&self) -> usize {
        self.num_phi
    }

    /// Contiguous, unit-stride slice of bins for one (theta, phi, m, n) cell.
    pub fn bins_at(&self, theta: usize, phi: usize, m: usize, n: usize) -> &[Complex<f32>] {
        self.weights.trailing_slice(&[theta, phi, m, n])
    }

    pub fn m_channels(&self) -> usize {
        self.m_channels
    }

    pub fn n_channels(&self) -> usize {
        self.n_channels
    }

    pub fn num_bins(&self) -> usize {
        self.num_bins
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn every_entry_has_unit_magnitude() {
        let config = BeamformerConfig::reference();
        let table = SteeringTable::build(&config).unwrap();
        for ti in 0..table.num_theta() {
            for pi in 0..table.num_phi() {
                for m in 0..table.m_channels() {
                    for n in 0..table.n_channels() {
                        for w in table.bins_at(ti, pi, m, n) {
                            assert_relative_eq!(w.norm(), 1.0, epsilon = 1e-5);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn broadside_reference_mic_is_unity_for_every_bin() {
        let config = BeamformerConfig::reference();
        let table = SteeringTable::build(&config).unwrap();
        // theta = 0 deg is the middle index of a symmetric [-45, 45] step-3 sweep.
        let theta_zero = config
            .theta_sweep
            .num_steps()
            .checked_sub(1)
            .map(|last| last / 2)
            .unwrap();
        let phi_zero = theta_zero;
        for w in table.bins_at(theta_zero, phi_zero, 0, 0) {
            assert_relative_eq!(w.re, 1.0, epsilon = 1e-5);
            assert_relative_eq!(w.im, 0.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn rejects_non_positive_mic_spacing() {
        let mut config = BeamformerConfig::reference();
        config.mic_spacing = -1.0;
        assert!(matches!(
            SteeringTable::build(&config),
            Err(BeamformError::InvalidGeometry(_))
        ));
    }
}
