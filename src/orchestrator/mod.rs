//! Job orchestration
//!
//! - `job`: the stage machine, progress mapping and progress sinks
//! - `processor`: `ProcessingOrchestrator`, which runs a job on an engine

mod job;
mod processor;

pub use job::{engine_percent, JobStage, ProgressReporter, ProgressSink, PROCESSING_STATUS};
pub use processor::{OutputArtifact, ProcessingOrchestrator};
