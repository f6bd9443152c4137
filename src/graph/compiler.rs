//! Filter graph compiler
//!
//! Stage order is fixed: pitch, then tempo, then reverb. Effects at their
//! neutral value contribute nothing; a graph with no effects is a single
//! passthrough stage.

use super::reverb::reverb_curve;
use super::stage::{FilterGraph, FilterStage};
use crate::params::EffectParameters;

/// Sample rate the engine's output is normalised to
pub const STANDARD_SAMPLE_RATE: u32 = 44_100;

/// Frequency ratio for a shift of `semitones`
pub fn pitch_multiplier(semitones: i32) -> f64 {
    2f64.powf(f64::from(semitones) / 12.0)
}

/// Sample rate that shifts pitch by `semitones` when played back at the standard rate
pub fn pitch_shift_rate(semitones: i32) -> u32 {
    (f64::from(STANDARD_SAMPLE_RATE) * pitch_multiplier(semitones)).round() as u32
}

/// Compile effect parameters into an ordered filter graph
///
/// Pitch is shifted by relabelling the sample rate and resampling back to
/// the standard rate, which also changes duration; the tempo stage is
/// independent of that.
///
/// # Example
/// ```
/// use slowverb::graph::compile;
/// use slowverb::params::EffectParameters;
///
/// let graph = compile(&EffectParameters::new(0.8, 0, 0).unwrap());
/// assert_eq!(graph.serialize(), "atempo=0.8");
/// ```
pub fn compile(params: &EffectParameters) -> FilterGraph {
    let mut stages = Vec::with_capacity(4);

    if params.has_pitch_shift() {
        stages.push(FilterStage::SetRate {
            rate_hz: pitch_shift_rate(params.pitch_semitones()),
        });
        stages.push(FilterStage::Resample {
            rate_hz: STANDARD_SAMPLE_RATE,
        });
    }

    // The accepted tempo range is the tempo filter's native range, so one
    // stage always suffices.
    if params.has_tempo_change() {
        stages.push(FilterStage::Tempo {
            factor: params.tempo(),
        });
    }

    if params.has_reverb() {
        stages.push(FilterStage::Echo(reverb_curve(params.reverb_percent())));
    }

    if stages.is_empty() {
        stages.push(FilterStage::Passthrough);
    }

    FilterGraph::new(stages)
}
