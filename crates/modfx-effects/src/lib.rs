//! modfx Effects - modulation-aware audio effects
//!
//! This crate provides the effects built on modfx-core. Every control is a
//! smoothed, range-bounded, modulatable parameter:
//!
//! - [`Gain`] - Level in dB, interpolated in amplitude, with a -100 dB silence floor
//! - [`Panner`] - Equal-power stereo panner
//! - [`Compressor`] - Feed-forward compressor with a soft knee and peak/RMS detection
//! - [`Processor`] - Closed enum over the three for runtime chains
//!
//! Each effect also hands out a `*Controls` handle ([`GainControls`],
//! [`PannerControls`], [`CompressorControls`]) that can be moved to a UI or
//! automation thread.
//!
//! ## Example
//!
//! ```rust
//! use modfx_core::{AudioBufferInfo, AudioEffect, EffectExt, ModulationSource, WaveModulator};
//! use modfx_effects::{Compressor, Gain, Panner};
//!
//! let mut lfo = WaveModulator::<f32>::new();
//! lfo.setup(128, 48000.0);
//! lfo.set_frequency(0.5);
//!
//! let mut panner = Panner::new();
//! panner.set_panner_modulation_source(Some(lfo.shared()));
//!
//! let mut chain = Gain::new().chain(panner).chain(Compressor::new());
//! chain.setup(48000.0, 128, 2);
//! chain.first_mut().second_mut().set_panning(0.0, 0.5);
//!
//! let mut left = [0.25_f32; 128];
//! let mut right = [0.25_f32; 128];
//! let mut buffer = AudioBufferInfo::new();
//! buffer.append_channel(128, &mut left, 0);
//! buffer.append_channel(128, &mut right, 1);
//!
//! lfo.prepare_modulation_buffer(128);
//! chain.process_audio(&mut buffer);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

pub mod compressor;
pub mod gain;
pub mod panner;
pub mod processor;

/// Ramp time, in seconds, shared by every effect parameter.
pub const SMOOTHING_TIME: f64 = 0.05;

// Re-export main types at crate root
pub use compressor::{Compressor, CompressorControls, MAX_ENVELOPE_TIME, gain_reduction_db};
pub use gain::{Gain, GainControls, SILENCE_FLOOR_DB, decibels_to_gain};
pub use panner::{Panner, PannerControls, pan_gains};
pub use processor::Processor;
