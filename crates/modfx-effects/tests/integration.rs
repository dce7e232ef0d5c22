//! Integration tests for modfx effects.
//!
//! Drives the effects the way a host does: one `AudioBufferInfo` rebuilt per
//! block, one wave modulator prepared per block and shared between effects,
//! targets pushed every block, and gain → panner → compressor in series.

use modfx_core::{
    AudioBufferInfo, AudioEffect, DetectionMode, EffectExt, ModulationSource, WaveModulator,
    Waveshape, amplitude_to_decibels, decibels_to_amplitude,
};
use modfx_effects::{Compressor, Gain, Panner, Processor};

const SAMPLE_RATE: f64 = 48000.0;
const BLOCK: usize = 512;

/// Host-side state: owns the channel memory and rebuilds the view each block.
struct Host {
    channels: Vec<Vec<f32>>,
}

impl Host {
    fn new(num_channels: usize) -> Self {
        Self {
            channels: vec![vec![0.0; BLOCK]; num_channels],
        }
    }

    fn fill(&mut self, value: f32) {
        for channel in &mut self.channels {
            channel.fill(value);
        }
    }

    fn process(&mut self, effect: &mut impl AudioEffect<f32>) {
        let mut buffer = AudioBufferInfo::new();
        for (index, data) in self.channels.iter_mut().enumerate() {
            buffer.append_channel(BLOCK, data, index);
        }
        effect.process_audio(&mut buffer);
    }

    fn last(&self, channel: usize) -> f32 {
        self.channels[channel][BLOCK - 1]
    }
}

// ============================================================================
// 1. Reference behaviour
// ============================================================================

#[test]
fn compressor_full_scale_scenario() {
    let mut comp = Compressor::<f32>::new();
    comp.setup(SAMPLE_RATE, BLOCK, 2);
    comp.set_threshold(-20.0, 0.0);
    comp.set_ratio(4.0, 0.0);
    comp.set_attack(0.001, 0.0);
    comp.set_release(0.05, 0.0);
    comp.set_knee(0.0, 0.0);

    let mut host = Host::new(2);
    for _ in 0..200 {
        host.fill(1.0);
        host.process(&mut comp);
    }

    let expected = decibels_to_amplitude(-15.0_f32);
    for channel in 0..2 {
        assert!(
            (host.last(channel) - expected).abs() < 1e-4,
            "channel {channel}: {} vs {expected}",
            host.last(channel)
        );
    }
    assert!((comp.gain_reduction_db() + 15.0).abs() < 1e-3);
}

#[test]
fn gain_extremes_converge_exactly() {
    let mut gain = Gain::<f32>::new();
    gain.setup(SAMPLE_RATE, BLOCK, 2);
    let mut host = Host::new(2);

    gain.set_decibels(-100.0, 0.0);
    for _ in 0..10 {
        host.fill(1.0);
        host.process(&mut gain);
    }
    assert_eq!((host.last(0), host.last(1)), (0.0, 0.0));

    gain.set_decibels(0.0, 0.0);
    for _ in 0..10 {
        host.fill(1.0);
        host.process(&mut gain);
    }
    assert_eq!((host.last(0), host.last(1)), (1.0, 1.0));
}

#[test]
fn panner_positions() {
    let mut panner = Panner::<f32>::new();
    panner.setup(SAMPLE_RATE, BLOCK, 2);
    let mut host = Host::new(2);

    for (pan, left, right) in [(-1.0, 1.0, 0.0), (1.0, 0.0, 1.0)] {
        panner.set_panning(pan, 0.0);
        for _ in 0..10 {
            host.fill(1.0);
            host.process(&mut panner);
        }
        assert_eq!((host.last(0), host.last(1)), (left, right), "pan {pan}");
    }

    panner.set_panning(0.0, 0.0);
    for _ in 0..10 {
        host.fill(1.0);
        host.process(&mut panner);
    }
    let centre = 0.5_f32.sqrt();
    assert!((host.last(0) - centre).abs() < 1e-6);
    assert!((host.last(1) - centre).abs() < 1e-6);
}

// ============================================================================
// 2. Host block loop
// ============================================================================

#[test]
fn host_loop_with_shared_modulator() {
    let mut lfo = WaveModulator::<f32>::new();
    lfo.setup(BLOCK, SAMPLE_RATE);

    let mut gain = Gain::new();
    let mut panner = Panner::new();
    let mut comp = Compressor::new();
    gain.setup(SAMPLE_RATE, BLOCK, 2);
    panner.setup(SAMPLE_RATE, BLOCK, 2);
    comp.setup(SAMPLE_RATE, BLOCK, 2);
    gain.set_gain_modulation_source(Some(lfo.shared()));
    panner.set_panner_modulation_source(Some(lfo.shared()));
    comp.set_threshold(-12.0, 0.0);
    comp.set_ratio(3.0, 0.0);
    comp.set_knee(0.5, 0.0);

    let mut chain = (&mut gain).chain(&mut panner).chain(&mut comp);
    let mut host = Host::new(2);
    let mut energy = [0.0_f64; 2];
    for block in 0..100 {
        lfo.set_modulation_shape(Waveshape::Triangle);
        lfo.set_frequency(4.0);
        lfo.prepare_modulation_buffer(BLOCK);

        chain.first_mut().first_mut().set_decibels(-3.0, 0.5);
        chain.first_mut().second_mut().set_panning(0.0, 0.8);

        for (i, sample) in host.channels[0].iter_mut().enumerate() {
            *sample = ((block * BLOCK + i) as f32 * 0.05).sin() * 0.9;
        }
        let left = host.channels[0].clone();
        host.channels[1].copy_from_slice(&left);

        host.process(&mut chain);
        for channel in 0..2 {
            for &s in &host.channels[channel] {
                assert!(s.is_finite());
                assert!(s.abs() <= 0.9 + 1e-6);
                energy[channel] += f64::from(s * s);
            }
        }
    }
    // The pan sweep moves energy between the sides but never silences either
    assert!(energy[0] > 0.0 && energy[1] > 0.0);
    assert!(comp.gain_reduction_db() <= 0.0);
}

#[test]
fn processors_in_a_runtime_chain() {
    let mut chain: Vec<Processor<f32>> = vec![
        Gain::new().into(),
        Panner::new().into(),
        Compressor::new().into(),
    ];
    for effect in &mut chain {
        effect.setup(SAMPLE_RATE, BLOCK, 2);
    }
    if let Processor::Gain(gain) = &mut chain[0] {
        gain.set_decibels(-6.0, 0.0);
    }
    if let Processor::Panner(panner) = &mut chain[1] {
        panner.set_panning(-1.0, 0.0);
    }

    let mut host = Host::new(2);
    for _ in 0..10 {
        host.fill(0.5);
        for effect in &mut chain {
            host.process(effect);
        }
    }
    let expected = 0.5 * decibels_to_amplitude(-6.0_f32);
    assert!((host.last(0) - expected).abs() < 1e-6, "got {}", host.last(0));
    assert_eq!(host.last(1), 0.0);
}

#[test]
fn setup_resets_ramps() {
    let mut gain = Gain::<f32>::new();
    gain.setup(SAMPLE_RATE, BLOCK, 2);
    gain.set_decibels(-100.0, 0.0);
    let mut host = Host::new(2);
    for _ in 0..10 {
        host.fill(1.0);
        host.process(&mut gain);
    }
    assert_eq!(host.last(0), 0.0);

    // Reconfiguration starts again from unity with fresh targets
    gain.setup(96000.0, BLOCK, 2);
    host.fill(1.0);
    host.process(&mut gain);
    assert_eq!(host.last(0), 1.0);
}

// ============================================================================
// 3. Extreme sample rates
// ============================================================================

#[test]
fn extreme_sample_rates_stay_finite() {
    for sample_rate in [8000.0, 192000.0] {
        let mut lfo = WaveModulator::<f32>::new();
        lfo.setup(BLOCK, sample_rate);
        lfo.set_modulation_shape(Waveshape::Square);
        lfo.set_frequency(30.0);

        let mut comp = Compressor::new();
        comp.setup(sample_rate, BLOCK, 2);
        comp.set_envelope_type(DetectionMode::Peak);
        comp.set_attack_modulation_source(Some(lfo.shared()));
        comp.set_release_modulation_source(Some(lfo.shared()));
        comp.set_ratio_modulation_source(Some(lfo.shared()));
        comp.set_attack(0.00001, 1.0);
        comp.set_release(0.5, -1.0);
        comp.set_threshold(-60.0, 0.0);
        comp.set_ratio(20.0, -1.0);
        comp.set_knee(1.0, 0.0);

        let mut host = Host::new(2);
        for block in 0..50 {
            lfo.prepare_modulation_buffer(BLOCK);
            host.fill(if block % 2 == 0 { 1.0 } else { 0.0 });
            host.process(&mut comp);
            for channel in 0..2 {
                assert!(host.channels[channel].iter().all(|s| s.is_finite()));
            }
        }
        assert!(amplitude_to_decibels(host.last(0).abs().max(1e-10)).is_finite());
    }
}
