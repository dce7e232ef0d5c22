//! CLI command implementations.

pub mod modulator;
pub mod render;
