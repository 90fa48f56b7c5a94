//! The beamforming hot path (module E) together with the pipeline driver
//! (module G): a two-state object — `Unconfigured` / `Ready` — that owns
//! every tensor in the data model and exposes exactly `setup`, `process_block`,
//! and (via `Drop`) teardown.

use log::{debug, info};
use rayon::prelude::*;
use rustfft::num_complex::Complex;

use crate::config::BeamformerConfig;
use crate::double_buffer::AudioDoubleBuffer;
use crate::error::BeamformError;
use crate::fft_engine::{ChannelScratch, FftEngine};
use crate::spectral::{self, PostProcessType};
use crate::steering::SteeringTable;
use crate::tensor::Tensor;

/// Floor applied before taking `log10` in the dB conversion, preventing
/// `log(0)`. Never surfaced as an error (spec's `NumericFloor`).
const POWER_FLOOR: f32 = 1e-12;

enum State {
    Unconfigured,
    Ready {
        fft_engine: FftEngine,
        steering: SteeringTable,
        double_buffer: AudioDoubleBuffer,
        channel_spectra: Tensor<Complex<f32>, 3>,
        beamformed: Tensor<Complex<f32>, 3>,
        collapsed: Tensor<f32, 2>,
        scratch_pool: Vec<ChannelScratch>,
        p_ref: f32,
    },
}

pub struct Beamformer {
    config: BeamformerConfig,
    state: State,
    post_process_type: PostProcessType,
}

impl Beamformer {
    /// Validates `config` and returns an `Unconfigured` instance. Heavy setup
    /// (FFT planning, steering table) happens in `setup`, not here.
    pub fn new(config: BeamformerConfig) -> Result<Self, BeamformError> {
        config.validate()?;
        Ok(Self {
            config,
            state: State::Unconfigured,
            post_process_type: PostProcessType::Dbfs,
        })
    }

    pub fn config(&self) -> &BeamformerConfig {
        &self.config
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, State::Ready { .. })
    }

    /// Builds the FFT plan and steering table and transitions
    /// `Unconfigured -> Ready`. Idempotent once `Ready`.
    pub fn setup(&mut self) -> Result<(), BeamformError> {
        if self.is_ready() {
            return Ok(());
        }

        info!(
            "setting up beamformer: {}x{} array, fft_size={}, {} theta x {} phi sweep",
            self.config.m_channels,
            self.config.n_channels,
            self.config.fft_size,
            self.config.num_theta(),
            self.config.num_phi()
        );

        let fft_engine = FftEngine::new(self.config.fft_size)?;
        let steering = SteeringTable::build(&self.config)?;
        let double_buffer = AudioDoubleBuffer::new(self.config.m_channels, self.config.n_channels, self.config.fft_size)?;
        let channel_spectra = Tensor::new([self.config.m_channels, self.config.n_channels, self.config.num_bins()])?;
        let beamformed = Tensor::new([self.config.num_theta(), self.config.num_phi(), self.config.num_bins()])?;
        let collapsed = Tensor::new([self.config.num_theta(), self.config.num_phi()])?;

        let num_channels = self.config.m_channels * self.config.n_channels;
        let scratch_pool = (0..num_channels).map(|_| fft_engine.new_scratch()).collect();
        let p_ref = reference_power(&fft_engine, num_channels)?;

        debug!("reference full-scale power p_ref = {p_ref}");

        self.state = State::Ready {
            fft_engine,
            steering,
            double_buffer,
            channel_spectra,
            beamformed,
            collapsed,
            scratch_pool,
            p_ref,
        };
        Ok(())
    }

    /// Windows + FFTs each channel, steers and sums across the sweep,
    /// band-collapses, and converts to dB, writing the result into `map_out`.
    /// Argument validation happens before any output mutation.
    pub fn process_block(
        &mut self,
        audio_in: &Tensor<f32, 3>,
        f_lo: f64,
        f_hi: f64,
        map_out: &mut Tensor<f32, 2>,
    ) -> Result<(), BeamformError> {
        let State::Ready {
            fft_engine,
            steering,
            double_buffer,
            channel_spectra,
            beamformed,
            collapsed,
            scratch_pool,
            p_ref,
        } = &mut self.state
        else {
            return Err(BeamformError::NotReady);
        };

        let (k_lo, k_hi) = spectral::band_to_bins(
            f_lo,
            f_hi,
            self.config.sample_rate,
            self.config.fft_size,
            self.config.num_bins(),
        )?;

        // Step 0: roll the new block into the double buffer. No allocation.
        double_buffer.record(audio_in);

        // Step 1: per-channel window + FFT, embarrassingly parallel across (m, n).
        transform_channels(fft_engine, double_buffer, channel_spectra, scratch_pool)?;

        // Step 2: steered sum across the (theta, phi) sweep, k innermost.
        steer_and_sum(channel_spectra, steering, beamformed);

        // Step 3: band collapse.
        spectral::collapse_band(beamformed, k_lo, k_hi, collapsed);

        // Step 4: power-to-dB conversion.
        debug_assert_eq!(self.post_process_type, PostProcessType::Dbfs);
        spectral::power_to_db(collapsed, POWER_FLOOR, *p_ref, map_out);

        Ok(())
    }
}

impl Drop for Beamformer {
    fn drop(&mut self) {
        debug!("dropping beamformer, releasing FFT plan");
    }
}

fn transform_channels(
    fft_engine: &FftEngine,
    double_buffer: &AudioDoubleBuffer,
    channel_spectra: &mut Tensor<Complex<f32>, 3>,
    scratch_pool: &mut [ChannelScratch],
) -> Result<(), BeamformError> {
    let fft_size = fft_engine.fft_size();
    let num_bins = fft_engine.num_bins();
    let audio_flat = double_buffer.current_flat();
    let spectra_flat = channel_spectra.as_mut_slice();

    audio_flat
        .par_chunks(fft_size)
        .zip(spectra_flat.par_chunks_mut(num_bins))
        .zip(scratch_pool.par_iter_mut())
        .try_for_each(|((samples, output), scratch)| {
            fft_engine.transform_channel(samples, scratch, output)
        })
}

fn steer_and_sum(
    channel_spectra: &Tensor<Complex<f32>, 3>,
    steering: &SteeringTable,
    beamformed: &mut Tensor<Complex<f32>, 3>,
) {
    let num_phi = steering.num_phi();
    let m_channels = steering.m_channels();
    let n_channels = steering.n_channels();
    let num_bins = steering.num_bins();

    beamformed
        .as_mut_slice()
        .par_chunks_mut(num_bins)
        .enumerate()
        .for_each(|(flat, out)| {
            let theta = flat / num_phi;
            let phi = flat % num_phi;

            for bin in out.iter_mut() {
                *bin = Complex::new(0.0, 0.0);
            }

            for m in 0..m_channels {
                for n in 0..n_channels {
                    let chan = channel_spectra.trailing_slice(&[m, n]);
                    let steer = steering.bins_at(theta, phi, m, n);
                    for k in 0..num_bins {
                        out[k] += chan[k] * steer[k];
                    }
                }
            }
        });
}

/// Power of a unit-amplitude sinusoid after the same Hamming window and FFT
/// normalization used on the hot path, scaled by the array gain a perfectly
/// coherent broadside source would receive (`num_channels` in-phase
/// contributions summing linearly in amplitude before the squared-magnitude
/// step). See DESIGN.md for why this generalization of the reference was
/// chosen over a bare single-channel power.
fn reference_power(fft_engine: &FftEngine, num_channels: usize) -> Result<f32, BeamformError> {
    let fft_size = fft_engine.fft_size();
    let probe_bin = fft_size / 8;
    let tone: Vec<f32> = (0..fft_size)
        .map(|i| (2.0 * std::f64::consts::PI * probe_bin as f64 * i as f64 / fft_size as f64).cos() as f32)
        .collect();

    let mut scratch = fft_engine.new_scratch();
    let mut spectrum = vec![Complex::new(0.0, 0.0); fft_engine.num_bins()];
    fft_engine.transform_channel(&tone, &mut scratch, &mut spectrum)?;

    let peak = spectrum.iter().map(|c| c.norm()).fold(0.0f32, f32::max);
    Ok((num_channels as f32 * peak).powi(2))
}
