//! Error taxonomy for the beamforming core.
//!
//! Configuration errors are fatal to an instance and surface at construction
//! or `setup`; `NotReady` and `InvalidBand` are per-call and leave the output
//! map untouched.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BeamformError {
    #[error("invalid tensor shape: {0}")]
    InvalidShape(String),

    #[error("invalid array geometry: {0}")]
    InvalidGeometry(String),

    #[error("invalid angle sweep: {0}")]
    InvalidSweep(String),

    #[error("processBlock called before a successful setup()")]
    NotReady,

    #[error("invalid frequency band [{f_lo}, {f_hi}] Hz (nyquist {nyquist} Hz)")]
    InvalidBand { f_lo: f64, f_hi: f64, nyquist: f64 },

    #[error("failed to build FFT plan: {0}")]
    FftSetup(String),

    #[error("failed to read configuration file: {0}")]
    ConfigIo(#[from] std::io::Error),

    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_yaml::Error),
}

pub type BeamformResult<T> = Result<T, BeamformError>;
