//! modfx Core - per-sample parameter smoothing and modulation
//!
//! This crate provides the framework every modfx effect is built on: parameters
//! that ramp click-free under automation, take bipolar modulation without ever
//! leaving their bounds, and do it with zero allocation in the audio path.
//!
//! # Core Abstractions
//!
//! ## Effect System
//!
//! - [`AudioEffect`] - Object-safe trait for in-place block processors
//! - [`EffectExt`] - Extension trait for effect chaining
//! - [`Chain`] - Zero-cost series combinator
//! - [`AudioBufferInfo`] - Borrowed per-block view over the host's channels
//!
//! ## Parameters
//!
//! - [`SmoothedValue`] - Linear ramp towards a target (constant rate)
//! - [`ModulationParameter`] - Per-channel smoothed value + depth + modulation source, clamped to a [`Range`]
//! - [`ParameterHandle`] - Thread-safe writer for a parameter's targets
//!
//! ## Modulation & Dynamics
//!
//! - [`BasicOscillator`] - Naive phase-accumulating oscillator (4 waveshapes)
//! - [`WaveModulator`] - Oscillator-driven [`ModulationSource`] rendering `[0, 1]` per block
//! - [`ModulationBuffer`] - Lock-free buffer shared between a source and its consumers
//! - [`EnvelopeFollower`] - Peak or RMS level detection
//!
//! ## Utilities
//!
//! - Level conversions: [`decibels_to_amplitude`], [`amplitude_to_decibels`]
//! - Wave generators: [`generate_sine`], [`generate_triangle`], [`generate_square`], [`generate_saw`]
//! - Waveshapers: [`arraya`], [`sigmoid`], [`sigmoid2`], [`tanh_estimate`]
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible (it needs `alloc`). Disable the default
//! `std` feature in your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! modfx-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Example
//!
//! ```rust
//! use modfx_core::{ModulationParameter, ModulationSource, WaveModulator, Waveshape};
//!
//! let mut lfo = WaveModulator::<f32>::new();
//! lfo.setup(256, 48000.0);
//! lfo.set_modulation_shape(Waveshape::Triangle);
//!
//! let mut cutoff = ModulationParameter::<f32>::new();
//! cutoff.setup(48000.0, 2, 0.5, 0.05);
//! cutoff.set_parameter_range(0.0, 1.0);
//! cutoff.set_modulation_source(Some(lfo.shared()));
//! cutoff.set_parameter_value(0.5, 0.8);
//!
//! // Once per block: render the modulation, then read it per sample
//! lfo.prepare_modulation_buffer(256);
//! for i in 0..256 {
//!     let value = cutoff.next_modulated_value(0, i);
//!     assert!((0.0..=1.0).contains(&value));
//! }
//! ```
//!
//! # Design Principles
//!
//! - **Real-time safe**: allocation happens in `setup`, never per sample
//! - **Generic precision**: every type works over `f32` and `f64` via [`Sample`]
//! - **Lock-free control**: targets and modulation buffers are plain atomics
//! - **Contract checks**: preconditions are `debug_assert!`s with a clamped release fallback

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod buffer;
pub mod effect;
pub mod envelope;
pub mod math;
pub mod modulation;
pub mod oscillator;
pub mod param;
pub mod range;
pub mod smoothed;

// Re-export main types at crate root
pub use buffer::{AudioBufferInfo, MAX_CHANNELS};
pub use effect::{AudioEffect, Chain, EffectExt};
pub use envelope::{DetectionMode, EnvelopeFollower, MIN_ENVELOPE_TIME};
pub use math::{
    Sample, amplitude_to_decibels, arraya, decibels_to_amplitude, generate_saw, generate_sine,
    generate_square, generate_triangle, limit, sigmoid, sigmoid2, tanh_estimate,
};
pub use modulation::{ModulationBuffer, ModulationSource, SharedModulation, WaveModulator};
pub use oscillator::{BasicOscillator, Oscillator, Waveshape};
pub use param::{ModulationParameter, ParameterHandle};
pub use range::Range;
pub use smoothed::SmoothedValue;
