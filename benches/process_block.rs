//! Tracks the real-time budget for `process_block` at the canonical
//! configuration (fs=48000, B=1024, M=N=4): one call must comfortably fit
//! inside the ~21 ms a single audio frame affords. No hard pass/fail
//! threshold is asserted here since that is machine-dependent; this bench is
//! for tracking regressions over time.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use acoustic_beamform::{Beamformer, BeamformerConfig, Tensor};

fn process_block_benchmark(c: &mut Criterion) {
    let config = BeamformerConfig::reference();
    let mut beamformer = Beamformer::new(config.clone()).unwrap();
    beamformer.setup().unwrap();

    let audio = Tensor::<f32, 3>::new([config.m_channels, config.n_channels, config.fft_size]).unwrap();
    let mut map_out = Tensor::<f32, 2>::new([config.num_theta(), config.num_phi()]).unwrap();

    c.bench_function("process_block_reference_config", |b| {
        b.iter(|| {
            beamformer
                .process_block(black_box(&audio), 500.0, 4000.0, &mut map_out)
                .unwrap();
        })
    });
}

criterion_group!(benches, process_block_benchmark);
criterion_main!(benches);
