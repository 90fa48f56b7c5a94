//! Fixed Hamming taper applied to each channel before the FFT.

use std::f64::consts::PI;

/// `w_i = 0.54 - 0.46 * cos(2*pi*i / (n - 1))`, `i in 0..n`.
pub fn hamming(n: usize) -> Vec<f32> {
    if n == 1 {
        return vec![1.0];
    }
    (0..n)
        .map(|i| (0.54 - 0.46 * (2.0 * PI * i as f64 / (n - 1) as f64).cos()) as f32)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_match_hamming_formula() {
        let w = hamming(1024);
        assert!((w[0] - 0.08).abs() < 1e-3);
        assert!((w[w.len() - 1] - 0.08).abs() < 1e-3);
    }

    #[test]
    fn peak_is_near_center() {
        let w = hamming(1024);
        let center = w[512];
        assert!(center > 0.99 && center <= 1.0);
    }

    #[test]
    fn length_matches_request() {
        assert_eq!(hamming(64).len(), 64);
    }
}
