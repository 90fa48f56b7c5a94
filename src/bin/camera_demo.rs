//! Demo binary: drives the beamforming core off a WAV file instead of a live
//! capture device, for local testing of the pipeline end to end. Not part of
//! the core's own contract (see spec §6).

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn, LevelFilter};

use acoustic_beamform::{wav_source::WavAudioSource, Beamformer, BeamformerConfig};

#[derive(Parser, Debug)]
#[command(about = "Acoustic camera beamforming demo: runs the core off a WAV file")]
struct Args {
    /// Multichannel, 32-bit float WAV file to beamform.
    #[arg(long)]
    wav: String,

    /// Optional YAML configuration file. Falls back to the reference
    /// configuration from spec §8 when omitted.
    #[arg(long)]
    config: Option<String>,

    /// Lower edge of the band to collapse, in Hz.
    #[arg(long, default_value_t = 500.0)]
    f_lo: f64,

    /// Upper edge of the band to collapse, in Hz.
    #[arg(long, default_value_t = 4000.0)]
    f_hi: f64,

    /// Print every Nth processed block's peak cell instead of just the last.
    #[arg(long, default_value_t = 1)]
    print_every: usize,
}

fn main() -> Result<()> {
    acoustic_beamform::logging::init(LevelFilter::Info);

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => BeamformerConfig::load(path).with_context(|| format!("loading config from {path}"))?,
        None => BeamformerConfig::reference(),
    };

    let mut beamformer = Beamformer::new(config.clone())?;
    beamformer.setup()?;

    let mut source = WavAudioSource::open(&args.wav, &config)?;
    let mut map_out = acoustic_beamform::Tensor::<f32, 2>::new([config.num_theta(), config.num_phi()])?;

    let mut block_index = 0;
    while let Some(block) = source.next_block()? {
        if let Err(e) = beamformer.process_block(&block, args.f_lo, args.f_hi, &mut map_out) {
            warn!("block {block_index}: {e}");
            block_index += 1;
            continue;
        }

        if block_index % args.print_every == 0 {
            let (peak_idx, peak_db) = map_out
                .as_slice()
                .iter()
                .enumerate()
                .fold((0usize, f32::MIN), |best, (i, &v)| if v > best.1 { (i, v) } else { best });
            let theta_idx = peak_idx / config.num_phi();
            let phi_idx = peak_idx % config.num_phi();
            let theta_deg = config.theta_sweep.min_deg + theta_idx as f64 * config.theta_sweep.step_deg;
            let phi_deg = config.phi_sweep.min_deg + phi_idx as f64 * config.phi_sweep.step_deg;
            info!("block {block_index}: peak {peak_db:.1} dB at theta={theta_deg:.1} phi={phi_deg:.1}");
        }
        block_index += 1;
    }

    info!("processed {block_index} blocks");
    Ok(())
}
