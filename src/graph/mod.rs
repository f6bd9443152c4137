//! Filter graph compilation
//!
//! Turns `EffectParameters` into the engine's audio filter graph:
//! - `stage`: tagged filter stages and their wire serialization
//! - `reverb`: reverb percentage to echo parameters
//! - `compiler`: parameter-to-graph compilation

mod compiler;
mod reverb;
mod stage;

pub use compiler::{compile, pitch_multiplier, pitch_shift_rate, STANDARD_SAMPLE_RATE};
pub use reverb::reverb_curve;
pub use stage::{Echo, FilterGraph, FilterStage};
