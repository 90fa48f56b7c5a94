//! Beamforming and spectral post-processing core of an acoustic camera: a
//! real-time phased-array microphone signal processor that turns a
//! synchronously captured (M, N, B) block of PCM audio into a band-limited,
//! decibel-scaled directional power map over a (θ, φ) sweep.
//!
//! The entry point is [`Beamformer`]: construct it from a
//! [`BeamformerConfig`], call [`Beamformer::setup`] once, then
//! [`Beamformer::process_block`] once per audio block.

pub mod beamformer;
pub mod config;
pub mod double_buffer;
pub mod error;
pub mod fft_engine;
pub mod logging;
pub mod spectral;
pub mod steering;
pub mod tensor;
pub mod wav_source;
mod window;

pub use beamformer::Beamformer;
pub use config::{AngleSweep, BeamformerConfig};
pub use error::{BeamformError, BeamformResult};
pub use spectral::PostProcessType;
pub use tensor::Tensor;
