//! Band-limited spectral collapse and power-to-dB conversion (module F).
//! Supports a single output transform, power-in-dB relative to full scale;
//! the `post_process_type` selector is reserved so future modes (dBA, dBZ,
//! 1/3-octave) can be added without widening the external contract.

use rayon::prelude::*;
use rustfft::num_complex::Complex;

use crate::error::BeamformError;
use crate::tensor::Tensor;

/// Reserved selector for the output transform. Only `Dbfs` is implemented;
/// the type is `#[non_exhaustive]` so future variants can be added without
/// breaking callers that already match on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum PostProcessType {
    Dbfs,
}

/// Clamps `[f_lo, f_hi]` Hz to `[0, num_bins - 1]` bin indices. Both edges are
/// rounded to the nearest bin with the same rule, so `f_lo == f_hi` always
/// collapses to a single bin regardless of bin alignment.
pub fn band_to_bins(f_lo: f64, f_hi: f64, sample_rate: u32, fft_size: usize, num_bins: usize) -> Result<(usize, usize), BeamformError> {
    let nyquist = sample_rate as f64 / 2.0;
    if f_lo < 0.0 || f_hi < f_lo || f_hi > nyquist {
        return Err(BeamformError::InvalidBand { f_lo, f_hi, nyquist });
    }
    let bin_hz = sample_rate as f64 / fft_size as f64;
    let k_lo = ((f_lo / bin_hz).round() as usize).min(num_bins - 1);
    let k_hi = ((f_hi / bin_hz).round() as usize).min(num_bins - 1);
    Ok((k_lo, k_hi))
}

/// `P(theta, phi) = sum_{k=k_lo..=k_hi} |Y(theta, phi, k)|^2`. Parallel across (theta, phi).
pub fn collapse_band(
    beamformed: &Tensor<Complex<f32>, 3>,
    k_lo: usize,
    k_hi: usize,
    collapsed: &mut Tensor<f32, 2>,
) {
    let [num_theta, num_phi] = collapsed.shape();
    let rows: Vec<Vec<f32>> = (0..num_theta)
        .into_par_iter()
        .map(|ti| {
            (0..num_phi)
                .map(|pi| {
                    beamformed.trailing_slice(&[ti, pi])[k_lo..=k_hi]
                        .iter()
                        .map(|y| y.norm_sqr())
                        .sum()
                })
                .collect()
        })
        .collect();
    for (ti, row) in rows.into_iter().enumerate() {
        for (pi, p) in row.into_iter().enumerate() {
            *collapsed.at_mut([ti, pi]) = p;
        }
    }
}

/// `map_out(theta, phi) = 10 * log10(max(P, eps) / p_ref)`.
pub fn power_to_db(collapsed: &Tensor<f32, 2>, eps: f32, p_ref: f32, map_out: &mut Tensor<f32, 2>) {
    for (dst, &p) in map_out.as_mut_slice().iter_mut().zip(collapsed.as_slice()) {
        *dst = 10.0 * (p.max(eps) / p_ref).log10();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_band_edges_select_a_single_bin() {
        let mut beamformed = Tensor::<Complex<f32>, 3>::new([1, 1, 4]).unwrap();
        *beamformed.at_mut([0, 0, 2]) = Complex::new(3.0, 4.0);
        let mut collapsed = Tensor::<f32, 2>::new([1, 1]).unwrap();
        collapse_band(&beamformed, 2, 2, &mut collapsed);
        assert_eq!(*collapsed.at([0, 0]), 25.0);
    }

    #[test]
    fn invalid_band_is_rejected() {
        let err = band_to_bins(5000.0, 4000.0, 48_000, 1024, 513).unwrap_err();
        assert!(matches!(err, BeamformError::InvalidBand { .. }));
    }

    #[test]
    fn equal_edges_at_a_non_bin_aligned_frequency_select_a_single_bin() {
        // bin_hz = 48000 / 1024 = 46.875; 500.0 is not a multiple of it.
        let (k_lo, k_hi) = band_to_bins(500.0, 500.0, 48_000, 1024, 513).unwrap();
        assert_eq!(k_lo, k_hi);
    }

    #[test]
    fn power_floor_prevents_log_of_zero() {
        let collapsed = Tensor::<f32, 2>::new([1, 1]).unwrap(); // all zero
        let mut map_out = Tensor::<f32, 2>::new([1, 1]).unwrap();
        power_to_db(&collapsed, 1e-12, 1.0, &mut map_out);
        assert!(map_out.as_slice()[0].is_finite());
    }

    #[test]
    fn doubling_amplitude_raises_db_by_6_02() {
        let mut c1 = Tensor::<f32, 2>::new([1, 1]).unwrap();
        *c1.at_mut([0, 0]) = 1.0; // power of amplitude 1
        let mut c2 = Tensor::<f32, 2>::new([1, 1]).unwrap();
        *c2.at_mut([0, 0]) = 4.0; // power of amplitude 2

        let mut m1 = Tensor::<f32, 2>::new([1, 1]).unwrap();
        let mut m2 = Tensor::<f32, 2>::new([1, 1]).unwrap();
        power_to_db(&c1, 1e-12, 1.0, &mut m1);
        power_to_db(&c2, 1e-12, 1.0, &mut m2);

        assert!((m2.as_slice()[0] - m1.as_slice()[0] - 6.02).abs() < 0.01);
    }
}
