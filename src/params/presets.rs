//! Built-in presets
//!
//! Named parameter combinations for the common "slowed + reverb" and
//! "nightcore" styles, plus a reset entry.

use serde::Serialize;

use super::EffectParameters;
use crate::error::{Result, SlowverbError};

/// A named set of effect parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Preset {
    pub id: &'static str,
    pub name: &'static str,
    pub tempo: f64,
    pub pitch_semitones: i32,
    pub reverb_percent: u8,
}

impl Preset {
    /// The preset's values as validated parameters
    pub fn params(&self) -> EffectParameters {
        EffectParameters {
            tempo: self.tempo,
            pitch_semitones: self.pitch_semitones,
            reverb_percent: self.reverb_percent,
        }
    }
}

pub const PRESETS: &[Preset] = &[
    Preset {
        id: "slowed-light",
        name: "Slowed (Light)",
        tempo: 0.85,
        pitch_semitones: -2,
        reverb_percent: 30,
    },
    Preset {
        id: "slowed-heavy",
        name: "Slowed (Heavy Reverb)",
        tempo: 0.75,
        pitch_semitones: -3,
        reverb_percent: 70,
    },
    Preset {
        id: "slowed-classic",
        name: "Classic Slowed + Reverb",
        tempo: 0.8,
        pitch_semitones: 0,
        reverb_percent: 50,
    },
    Preset {
        id: "nightcore-light",
        name: "Sped Up (Light)",
        tempo: 1.2,
        pitch_semitones: 2,
        reverb_percent: 15,
    },
    Preset {
        id: "nightcore-heavy",
        name: "Nightcore",
        tempo: 1.35,
        pitch_semitones: 4,
        reverb_percent: 25,
    },
    Preset {
        id: "reset",
        name: "Reset to Default",
        tempo: 1.0,
        pitch_semitones: 0,
        reverb_percent: 0,
    },
];

/// Look up a preset by id
pub fn find_preset(id: &str) -> Result<&'static Preset> {
    PRESETS
        .iter()
        .find(|p| p.id.eq_ignore_ascii_case(id))
        .ok_or_else(|| SlowverbError::UnknownPreset { id: id.to_string() })
}

/// The preset whose values equal `params` exactly, if any
pub fn matching_preset(params: &EffectParameters) -> Option<&'static Preset> {
    PRESETS.iter().find(|p| p.params() == *params)
}
