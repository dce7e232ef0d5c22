//! Criterion benchmarks for modfx-core parameter primitives
//!
//! Run with: cargo bench -p modfx-core
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use modfx_core::{
    BasicOscillator, DetectionMode, EnvelopeFollower, ModulationParameter, ModulationSource,
    Oscillator, SmoothedValue, WaveModulator, Waveshape,
};

const SAMPLE_RATE: f64 = 48000.0;
const BLOCK_SIZES: &[usize] = &[64, 128, 256, 512, 1024];

fn bench_smoothed_value(c: &mut Criterion) {
    let mut group = c.benchmark_group("SmoothedValue");

    for &block_size in BLOCK_SIZES {
        group.bench_with_input(
            BenchmarkId::new("ramp", block_size),
            &block_size,
            |b, &n| {
                let mut value = SmoothedValue::with_config(0.0_f32, SAMPLE_RATE, 0.05);
                let mut target = 1.0;
                b.iter(|| {
                    value.set_target_value(target);
                    target = -target;
                    for _ in 0..n {
                        black_box(value.next_value());
                    }
                });
            },
        );
    }

    group.finish();
}

fn bench_modulation_parameter(c: &mut Criterion) {
    let mut group = c.benchmark_group("ModulationParameter");

    for &block_size in BLOCK_SIZES {
        group.bench_with_input(
            BenchmarkId::new("static", block_size),
            &block_size,
            |b, &n| {
                let mut param = ModulationParameter::<f32>::new();
                param.setup(SAMPLE_RATE, 2, 0.5, 0.05);
                param.set_parameter_value(0.75, 0.0);
                b.iter(|| {
                    for channel in 0..2 {
                        for i in 0..n {
                            black_box(param.next_modulated_value(channel, i));
                        }
                    }
                });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("modulated", block_size),
            &block_size,
            |b, &n| {
                let mut lfo = WaveModulator::<f32>::new();
                lfo.setup(n, SAMPLE_RATE);
                lfo.set_modulation_shape(Waveshape::Triangle);
                lfo.set_frequency(3.0);

                let mut param = ModulationParameter::<f32>::new();
                param.setup(SAMPLE_RATE, 2, 0.5, 0.05);
                param.set_modulation_source(Some(lfo.shared()));
                param.set_parameter_value(0.5, 0.7);
                b.iter(|| {
                    lfo.prepare_modulation_buffer(n);
                    for channel in 0..2 {
                        for i in 0..n {
                            black_box(param.next_modulated_value(channel, i));
                        }
                    }
                });
            },
        );
    }

    group.finish();
}

fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("BasicOscillator");

    for waveshape in Waveshape::ALL {
        group.bench_function(format!("{waveshape:?}"), |b| {
            let mut osc = BasicOscillator::<f32>::new(SAMPLE_RATE, 440.0);
            osc.set_waveshape(waveshape);
            b.iter(|| {
                for _ in 0..512 {
                    black_box(osc.next_sample());
                }
            });
        });
    }

    group.finish();
}

fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("EnvelopeFollower");

    for mode in [DetectionMode::Peak, DetectionMode::Rms] {
        group.bench_function(format!("{mode:?}"), |b| {
            let mut env = EnvelopeFollower::<f32>::new();
            env.setup(SAMPLE_RATE, 1, mode);
            b.iter(|| {
                for i in 0..512 {
                    black_box(env.process(black_box(if i % 64 < 32 { 0.8 } else { 0.1 }), 0));
                }
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_smoothed_value,
    bench_modulation_parameter,
    bench_oscillator,
    bench_envelope,
);
criterion_main!(benches);
