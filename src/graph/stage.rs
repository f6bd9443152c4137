//! Filter stages and their wire form
//!
//! Every stage knows how to render itself in the engine's filter syntax;
//! a graph is its stages joined with `,`:
//!
//! ```text
//! stage := "asetrate=" INT
//!        | "aresample=" INT
//!        | "atempo=" FLOAT
//!        | "aecho=" FLOAT ":" FLOAT ":" INT "|" INT "|" INT ":" DEC "|" DEC "|" DEC
//!        | "anull"
//! graph := stage ("," stage)*
//! ```

use serde::Serialize;
use std::fmt;

/// Echo stage parameters (see `graph::reverb`)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Echo {
    pub in_gain: f64,
    pub out_gain: f64,
    pub delays_ms: [u32; 3],
    /// Rendered with exactly two decimals
    pub decays: [f64; 3],
}

/// One atomic transformation in a filter graph
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FilterStage {
    /// Reinterpret the stream at a new sample rate (`asetrate`)
    SetRate { rate_hz: u32 },
    /// Resample to a target rate (`aresample`)
    Resample { rate_hz: u32 },
    /// Time-stretch without changing pitch (`atempo`)
    Tempo { factor: f64 },
    /// Multi-tap echo used as reverb (`aecho`)
    Echo(Echo),
    /// No-op (`anull`)
    Passthrough,
}

impl FilterStage {
    /// Engine filter name for this stage
    pub fn filter_name(&self) -> &'static str {
        match self {
            FilterStage::SetRate { .. } => "asetrate",
            FilterStage::Resample { .. } => "aresample",
            FilterStage::Tempo { .. } => "atempo",
            FilterStage::Echo(_) => "aecho",
            FilterStage::Passthrough => "anull",
        }
    }
}

impl fmt::Display for FilterStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.filter_name();
        match self {
            FilterStage::SetRate { rate_hz } | FilterStage::Resample { rate_hz } => {
                write!(f, "{}={}", name, rate_hz)
            }
            FilterStage::Tempo { factor } => write!(f, "{}={}", name, factor),
            FilterStage::Echo(echo) => write!(
                f,
                "{}={}:{}:{}|{}|{}:{:.2}|{:.2}|{:.2}",
                name,
                echo.in_gain,
                echo.out_gain,
                echo.delays_ms[0],
                echo.delays_ms[1],
                echo.delays_ms[2],
                echo.decays[0],
                echo.decays[1],
                echo.decays[2],
            ),
            FilterStage::Passthrough => f.write_str(name),
        }
    }
}

/// Ordered sequence of filter stages
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FilterGraph {
    stages: Vec<FilterStage>,
}

impl FilterGraph {
    pub(crate) fn new(stages: Vec<FilterStage>) -> Self {
        Self { stages }
    }

    pub fn stages(&self) -> &[FilterStage] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Render the graph in engine syntax
    pub fn serialize(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for FilterGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, stage) in self.stages.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", stage)?;
        }
        Ok(())
    }
}
