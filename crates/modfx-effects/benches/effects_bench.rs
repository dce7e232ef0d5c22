//! Criterion benchmarks for modfx effects
//!
//! Run with: cargo bench -p modfx-effects
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use modfx_core::{AudioBufferInfo, AudioEffect, EffectExt, ModulationSource, WaveModulator};
use modfx_effects::{Compressor, Gain, Panner};

const SAMPLE_RATE: f64 = 48000.0;
const BLOCK_SIZES: &[usize] = &[64, 128, 256, 512, 1024];

fn generate_test_signal(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            (2.0 * std::f32::consts::PI * 440.0 * t).sin() * 0.5
        })
        .collect()
}

/// Benchmark a stereo effect, with the modulator prepared once per block.
fn bench_effect<E: AudioEffect<f32>>(
    c: &mut Criterion,
    name: &str,
    mut create: impl FnMut(&WaveModulator<f32>) -> E,
) {
    let mut group = c.benchmark_group(name);

    for &block_size in BLOCK_SIZES {
        let input = generate_test_signal(block_size);

        group.bench_with_input(
            BenchmarkId::from_parameter(block_size),
            &block_size,
            |b, &n| {
                let mut lfo = WaveModulator::new();
                lfo.setup(n, SAMPLE_RATE);
                lfo.set_frequency(2.0);
                let mut effect = create(&lfo);
                effect.setup(SAMPLE_RATE, n, 2);

                let mut left = input.clone();
                let mut right = input.clone();
                b.iter(|| {
                    left.copy_from_slice(&input);
                    right.copy_from_slice(&input);
                    lfo.prepare_modulation_buffer(n);
                    let mut buffer = AudioBufferInfo::new();
                    buffer.append_channel(n, &mut left, 0);
                    buffer.append_channel(n, &mut right, 1);
                    effect.process_audio(black_box(&mut buffer));
                });
                black_box(left[0]);
            },
        );
    }

    group.finish();
}

fn bench_gain(c: &mut Criterion) {
    bench_effect(c, "Gain", |lfo| {
        let mut gain = Gain::new();
        gain.set_gain_modulation_source(Some(lfo.shared()));
        gain
    });
}

fn bench_panner(c: &mut Criterion) {
    bench_effect(c, "Panner", |lfo| {
        let mut panner = Panner::new();
        panner.set_panner_modulation_source(Some(lfo.shared()));
        panner
    });
}

fn bench_compressor(c: &mut Criterion) {
    bench_effect(c, "Compressor", |lfo| {
        let mut comp = Compressor::new();
        comp.set_threshold_modulation_source(Some(lfo.shared()));
        comp
    });
}

fn bench_full_chain(c: &mut Criterion) {
    bench_effect(c, "Chain", |lfo| {
        let mut gain = Gain::new();
        gain.set_gain_modulation_source(Some(lfo.shared()));
        let mut panner = Panner::new();
        panner.set_panner_modulation_source(Some(lfo.shared()));
        gain.chain(panner).chain(Compressor::new())
    });
}

criterion_group!(
    benches,
    bench_gain,
    bench_panner,
    bench_compressor,
    bench_full_chain
);
criterion_main!(benches);
