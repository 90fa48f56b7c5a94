//! Construction-time configuration: the immutable inputs listed in spec §6,
//! validated once regardless of whether they were built in code or loaded
//! from a YAML file (mirroring the teacher's `PresetManager` load/save path).

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::BeamformError;

/// One angular sweep (θ or φ), expressed in degrees.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct AngleSweep {
    pub min_deg: f64,
    pub max_deg: f64,
    pub step_deg: f64,
}

impl AngleSweep {
    /// `num = floor((max - min) / step) + 1`.
    pub fn num_steps(&self) -> usize {
        (((self.max_deg - self.min_deg) / self.step_deg).floor() as i64 + 1) as usize
    }

    fn validate(&self, which: &str) -> Result<(), BeamformError> {
        if self.step_deg <= 0.0 {
            return Err(BeamformError::InvalidSweep(format!(
                "{which}-sweep step must be positive, got {}",
                self.step_deg
            )));
        }
        if self.max_deg < self.min_deg {
            return Err(BeamformError::InvalidSweep(format!(
                "{which}-sweep max ({}) is less than min ({})",
                self.max_deg, self.min_deg
            )));
        }
        Ok(())
    }
}

/// Every construction-time input of the core, plus the reference speed of sound.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BeamformerConfig {
    /// FFT size in samples; must be a power of two and at least 64.
    pub fft_size: usize,
    /// Audio sample rate in Hz.
    pub sample_rate: u32,
    /// Microphone count along the array's M axis.
    pub m_channels: usize,
    /// Microphone count along the array's N axis.
    pub n_channels: usize,
    /// Spacing between adjacent microphones, in meters.
    pub mic_spacing: f64,
    /// Speed of sound, in meters per second.
    pub speed_of_sound: f64,
    pub theta_sweep: AngleSweep,
    pub phi_sweep: AngleSweep,
}

impl BeamformerConfig {
    /// Number of one-sided real-FFT bins, `fft_size / 2 + 1`.
    pub fn num_bins(&self) -> usize {
        self.fft_size / 2 + 1
    }

    pub fn num_theta(&self) -> usize {
        self.theta_sweep.num_steps()
    }

    pub fn num_phi(&self) -> usize {
        self.phi_sweep.num_steps()
    }

    pub fn nyquist_hz(&self) -> f64 {
        self.sample_rate as f64 / 2.0
    }

    /// Every construction-time check in spec §7, independent of where the
    /// config came from.
    pub fn validate(&self) -> Result<(), BeamformError> {
        if self.fft_size < 64 || !self.fft_size.is_power_of_two() {
            return Err(BeamformError::InvalidShape(format!(
                "fft_size must be a power of two >= 64, got {}",
                self.fft_size
            )));
        }
        if self.sample_rate == 0 {
            return Err(BeamformError::InvalidShape(
                "sample_rate must be positive".into(),
            ));
        }
        if self.m_channels == 0 || self.n_channels == 0 {
            return Err(BeamformError::InvalidShape(
                "m_channels and n_channels must be positive".into(),
            ));
        }
        if self.mic_spacing <= 0.0 {
            return Err(BeamformError::InvalidGeometry(format!(
                "mic_spacing must be positive, got {}",
                self.mic_spacing
            )));
        }
        if self.speed_of_sound <= 0.0 {
            return Err(BeamformError::InvalidGeometry(format!(
                "speed_of_sound must be positive, got {}",
                self.speed_of_sound
            )));
        }
        self.theta_sweep.validate("theta")?;
        self.phi_sweep.validate("phi")?;
        Ok(())
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, BeamformError> {
        let config: BeamformerConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, BeamformError> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// The reference configuration used throughout spec §8's test scenarios.
    pub fn reference() -> Self {
        Self {
            fft_size: 1024,
            sample_rate: 48_000,
            m_channels: 4,
            n_channels: 4,
            mic_spacing: 0.04,
            speed_of_sound: 343.0,
            theta_sweep: AngleSweep { min_deg: -45.0, max_deg: 45.0, step_deg: 3.0 },
            phi_sweep: AngleSweep { min_deg: -45.0, max_deg: 45.0, step_deg: 3.0 },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_config_validates() {
        BeamformerConfig::reference().validate().unwrap();
    }

    #[test]
    fn rejects_non_power_of_two_fft_size() {
        let mut cfg = BeamformerConfig::reference();
        cfg.fft_size = 1000;
        assert!(matches!(cfg.validate(), Err(BeamformError::InvalidShape(_))));
    }

    #[test]
    fn rejects_inverted_sweep() {
        let mut cfg = BeamformerConfig::reference();
        cfg.theta_sweep = AngleSweep { min_deg: 10.0, max_deg: -10.0, step_deg: 1.0 };
        assert!(matches!(cfg.validate(), Err(BeamformError::InvalidSweep(_))));
    }

    #[test]
    fn rejects_nonpositive_mic_spacing() {
        let mut cfg = BeamformerConfig::reference();
        cfg.mic_spacing = 0.0;
        assert!(matches!(cfg.validate(), Err(BeamformError::InvalidGeometry(_))));
    }

    #[test]
    fn num_steps_matches_spec_formula() {
        let sweep = AngleSweep { min_deg: -45.0, max_deg: 45.0, step_deg: 3.0 };
        assert_eq!(sweep.num_steps(), 31);
    }

    #[test]
    fn roundtrips_through_yaml() {
        let cfg = BeamformerConfig::reference();
        let yaml = serde_yaml::to_string(&cfg).unwrap();
        let parsed = BeamformerConfig::from_yaml_str(&yaml).unwrap();
        assert_eq!(cfg, parsed);
    }
}
