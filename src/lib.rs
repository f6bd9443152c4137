//! Slowverb - tempo, pitch and reverb for audio files
//!
//! Slowverb turns three user-facing controls into an ffmpeg audio filter
//! graph and drives a single transcode job through an engine:
//!
//! ```text
//! EffectParameters -> graph::compile -> FilterGraph -> ProcessingOrchestrator -> OutputArtifact
//! ```
//!
//! # Architecture
//!
//! - `params`: validated effect parameters and presets
//! - `graph`: filter stages, the reverb curve and the graph compiler
//! - `naming`: output file names and supported inputs
//! - `engine`: the engine boundary, an ffmpeg engine and a mock
//! - `orchestrator`: the job state machine and progress reporting
//!
//! The crate never touches audio samples; all signal processing happens
//! inside the engine.

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod graph;
pub mod naming;
pub mod orchestrator;
pub mod params;

pub use error::{EngineError, ProcessingError, Result, SlowverbError};
pub use orchestrator::{OutputArtifact, ProcessingOrchestrator};
pub use params::EffectParameters;
