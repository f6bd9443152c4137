//! Effect parameters
//!
//! The three user-facing controls of a job: tempo multiplier, pitch shift in
//! semitones and reverb amount. Values are validated once at construction and
//! are immutable afterwards.

mod presets;

pub use presets::{find_preset, matching_preset, Preset, PRESETS};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;

use crate::error::{Result, SlowverbError};

/// Accepted tempo multipliers (native range of the engine's tempo primitive)
pub const TEMPO_RANGE: RangeInclusive<f64> = 0.5..=2.0;

/// Accepted pitch shift in semitones
pub const PITCH_RANGE: RangeInclusive<i32> = -12..=12;

/// Accepted reverb amount in percent
pub const REVERB_RANGE: RangeInclusive<u8> = 0..=100;

/// Validated tempo/pitch/reverb settings for one job
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawEffectParameters")]
pub struct EffectParameters {
    tempo: f64,
    pitch_semitones: i32,
    reverb_percent: u8,
}

#[derive(Deserialize)]
struct RawEffectParameters {
    tempo: f64,
    pitch_semitones: i32,
    reverb_percent: u8,
}

impl TryFrom<RawEffectParameters> for EffectParameters {
    type Error = SlowverbError;

    fn try_from(raw: RawEffectParameters) -> Result<Self> {
        EffectParameters::new(raw.tempo, raw.pitch_semitones, raw.reverb_percent)
    }
}

impl EffectParameters {
    /// Create parameters, rejecting anything outside the accepted ranges
    ///
    /// # Example
    /// ```
    /// use slowverb::params::EffectParameters;
    /// let params = EffectParameters::new(0.8, -2, 50).unwrap();
    /// assert_eq!(params.pitch_semitones(), -2);
    /// assert!(EffectParameters::new(2.5, 0, 0).is_err());
    /// ```
    pub fn new(tempo: f64, pitch_semitones: i32, reverb_percent: u8) -> Result<Self> {
        if !tempo.is_finite() || !TEMPO_RANGE.contains(&tempo) {
            return Err(SlowverbError::InvalidParameter {
                param: "tempo".to_string(),
                value: tempo.to_string(),
                expected: "value between 0.5 and 2.0".to_string(),
            });
        }

        if !PITCH_RANGE.contains(&pitch_semitones) {
            return Err(SlowverbError::InvalidParameter {
                param: "pitch".to_string(),
                value: pitch_semitones.to_string(),
                expected: "semitones between -12 and 12".to_string(),
            });
        }

        if !REVERB_RANGE.contains(&reverb_percent) {
            return Err(SlowverbError::InvalidParameter {
                param: "reverb".to_string(),
                value: reverb_percent.to_string(),
                expected: "percent between 0 and 100".to_string(),
            });
        }

        Ok(Self {
            tempo,
            pitch_semitones,
            reverb_percent,
        })
    }

    /// Tempo multiplier (1.0 = unchanged)
    pub fn tempo(&self) -> f64 {
        self.tempo
    }

    /// Pitch shift in semitones (0 = unchanged)
    pub fn pitch_semitones(&self) -> i32 {
        self.pitch_semitones
    }

    /// Reverb amount in percent (0 = dry)
    pub fn reverb_percent(&self) -> u8 {
        self.reverb_percent
    }

    pub fn has_tempo_change(&self) -> bool {
        self.tempo != 1.0
    }

    pub fn has_pitch_shift(&self) -> bool {
        self.pitch_semitones != 0
    }

    pub fn has_reverb(&self) -> bool {
        self.reverb_percent > 0
    }

    /// True when no effect would be applied
    pub fn is_identity(&self) -> bool {
        !self.has_tempo_change() && !self.has_pitch_shift() && !self.has_reverb()
    }
}

impl Default for EffectParameters {
    fn default() -> Self {
        Self {
            tempo: 1.0,
            pitch_semitones: 0,
            reverb_percent: 0,
        }
    }
}

impl fmt::Display for EffectParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pitch = if self.pitch_semitones > 0 {
            format!("+{}", self.pitch_semitones)
        } else {
            self.pitch_semitones.to_string()
        };
        write!(
            f,
            "tempo {:.2}x, pitch {} st, reverb {}%",
            self.tempo, pitch, self.reverb_percent
        )
    }
}
