//! Job state machine
//!
//! A job moves through a fixed sequence of stages, each with a fixed entry
//! progress value:
//!
//! ```text
//! Idle -> ReadingInput (5) -> PreparingFilters (15) -> Executing (20..95)
//!      -> Finalizing (95) -> Complete (100)
//! ```
//!
//! `Error` is reachable from every non-terminal stage.

use std::fmt;

use crate::naming;
use crate::params::EffectParameters;

/// Status reported for engine progress while executing
pub const PROCESSING_STATUS: &str = "Processing audio...";

/// Lower and upper bound of the executing stage's progress window
const EXECUTE_BASE_PERCENT: f64 = 15.0;
const EXECUTE_SPAN_PERCENT: f64 = 80.0;
const EXECUTE_MAX_PERCENT: u8 = 95;

/// Stage of a processing job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobStage {
    #[default]
    Idle,
    ReadingInput,
    PreparingFilters,
    Executing,
    Finalizing,
    Complete,
    Error,
}

impl JobStage {
    /// Progress reported on entering this stage
    pub fn entry_progress(&self) -> Option<(u8, &'static str)> {
        match self {
            JobStage::ReadingInput => Some((5, "Reading audio file...")),
            JobStage::PreparingFilters => Some((15, "Preparing audio filters...")),
            JobStage::Executing => Some((20, "Applying effects...")),
            JobStage::Finalizing => Some((95, "Finalizing...")),
            JobStage::Complete => Some((100, "Complete!")),
            JobStage::Idle | JobStage::Error => None,
        }
    }

    /// The stage that follows on success
    pub fn next(&self) -> Option<JobStage> {
        match self {
            JobStage::Idle => Some(JobStage::ReadingInput),
            JobStage::ReadingInput => Some(JobStage::PreparingFilters),
            JobStage::PreparingFilters => Some(JobStage::Executing),
            JobStage::Executing => Some(JobStage::Finalizing),
            JobStage::Finalizing => Some(JobStage::Complete),
            JobStage::Complete | JobStage::Error => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStage::Complete | JobStage::Error)
    }

    /// Whether `self -> to` is a legal transition
    pub fn can_transition_to(&self, to: JobStage) -> bool {
        match to {
            JobStage::Error => !self.is_terminal(),
            _ => self.next() == Some(to),
        }
    }
}

impl fmt::Display for JobStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JobStage::Idle => "Idle",
            JobStage::ReadingInput => "ReadingInput",
            JobStage::PreparingFilters => "PreparingFilters",
            JobStage::Executing => "Executing",
            JobStage::Finalizing => "Finalizing",
            JobStage::Complete => "Complete",
            JobStage::Error => "Error",
        };
        f.write_str(name)
    }
}

/// Map an engine progress fraction onto the executing window (15..=95)
pub fn engine_percent(fraction: f64) -> u8 {
    let fraction = if fraction.is_finite() {
        fraction.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let percent = (EXECUTE_BASE_PERCENT + (fraction * EXECUTE_SPAN_PERCENT).round()) as u8;
    percent.min(EXECUTE_MAX_PERCENT)
}

/// Receives `(percent, status)` updates for a job
pub trait ProgressSink {
    fn report(&mut self, percent: u8, status: &str);
}

impl<F> ProgressSink for F
where
    F: FnMut(u8, &str),
{
    fn report(&mut self, percent: u8, status: &str) {
        self(percent, status)
    }
}

/// Forwards progress to a sink, never letting the percentage go backwards
pub struct ProgressReporter<S> {
    sink: S,
    last_percent: u8,
}

impl<S: ProgressSink> ProgressReporter<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            last_percent: 0,
        }
    }

    pub fn report(&mut self, percent: u8, status: &str) {
        let percent = percent.clamp(self.last_percent, 100);
        self.last_percent = percent;
        self.sink.report(percent, status);
    }

    pub fn last_percent(&self) -> u8 {
        self.last_percent
    }
}

/// One run of the pipeline: names, parameters, stage and progress
pub(crate) struct ProcessingJob<S> {
    pub(crate) id: uuid::Uuid,
    pub(crate) original_file_name: String,
    pub(crate) params: EffectParameters,
    pub(crate) input_name: String,
    pub(crate) output_name: &'static str,
    stage: JobStage,
    reporter: ProgressReporter<S>,
}

impl<S: ProgressSink> ProcessingJob<S> {
    pub(crate) fn new(original_file_name: &str, params: EffectParameters, sink: S) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            original_file_name: original_file_name.to_string(),
            params,
            input_name: naming::staged_input_name(original_file_name),
            output_name: naming::staged_output_name(),
            stage: JobStage::Idle,
            reporter: ProgressReporter::new(sink),
        }
    }

    /// Move to `to` and report its entry progress
    pub(crate) fn advance(&mut self, to: JobStage) {
        debug_assert!(
            self.stage.can_transition_to(to),
            "illegal job transition {} -> {}",
            self.stage,
            to
        );
        tracing::debug!(job = %self.id, from = %self.stage, to = %to, "job stage");
        self.stage = to;
        if let Some((percent, status)) = to.entry_progress() {
            self.reporter.report(percent, status);
        }
    }

    /// Forward an engine progress fraction (only while executing)
    pub(crate) fn engine_progress(&mut self, fraction: f64) {
        if self.stage == JobStage::Executing {
            self.reporter.report(engine_percent(fraction), PROCESSING_STATUS);
        }
    }

    /// Enter the error state from wherever the job stopped
    pub(crate) fn fail(&mut self) -> JobStage {
        let failed_in = self.stage;
        if !failed_in.is_terminal() {
            tracing::debug!(job = %self.id, from = %failed_in, "job failed");
            self.stage = JobStage::Error;
        }
        failed_in
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_stage_sequence() {
        let mut stage = JobStage::Idle;
        let mut visited = vec![stage];
        while let Some(next) = stage.next() {
            assert!(stage.can_transition_to(next));
            stage = next;
            visited.push(stage);
        }
        assert_eq!(
            visited,
            vec![
                JobStage::Idle,
                JobStage::ReadingInput,
                JobStage::PreparingFilters,
                JobStage::Executing,
                JobStage::Finalizing,
                JobStage::Complete,
            ]
        );
    }

    #[test]
    fn test_error_reachable_from_non_terminal() {
        assert!(JobStage::Idle.can_transition_to(JobStage::Error));
        assert!(JobStage::Executing.can_transition_to(JobStage::Error));
        assert!(!JobStage::Complete.can_transition_to(JobStage::Error));
        assert!(!JobStage::Error.can_transition_to(JobStage::Error));
        assert!(!JobStage::ReadingInput.can_transition_to(JobStage::Executing));
    }

    #[test]
    fn test_engine_percent_mapping() {
        assert_eq!(engine_percent(0.0), 15);
        assert_eq!(engine_percent(0.5), 55);
        assert_eq!(engine_percent(0.99), 94);
        assert_eq!(engine_percent(1.0), 95);
        assert_eq!(engine_percent(3.0), 95);
        assert_eq!(engine_percent(-1.0), 15);
        assert_eq!(engine_percent(f64::NAN), 15);
    }

    #[test]
    fn test_reporter_is_monotonic() {
        let mut seen = Vec::new();
        {
            let mut reporter = ProgressReporter::new(|p: u8, s: &str| seen.push((p, s.to_string())));
            reporter.report(20, "Applying effects...");
            reporter.report(15, PROCESSING_STATUS);
            reporter.report(55, PROCESSING_STATUS);
            reporter.report(40, PROCESSING_STATUS);
            assert_eq!(reporter.last_percent(), 55);
        }
        let percents: Vec<u8> = seen.iter().map(|(p, _)| *p).collect();
        assert_eq!(percents, vec![20, 20, 55, 55]);
    }

    #[test]
    fn test_job_ignores_progress_outside_executing() {
        let mut seen = Vec::new();
        {
            let params = EffectParameters::default();
            let mut job = ProcessingJob::new("a.wav", params, |p: u8, _: &str| seen.push(p));
            job.engine_progress(0.5);
            job.advance(JobStage::ReadingInput);
            job.advance(JobStage::PreparingFilters);
            job.advance(JobStage::Executing);
            job.engine_progress(0.5);
            assert_eq!(job.fail(), JobStage::Executing);
            assert_eq!(job.stage, JobStage::Error);
            job.engine_progress(1.0);
        }
        assert_eq!(seen, vec![5, 15, 20, 55]);
    }

    #[test]
    fn test_job_names() {
        let job = ProcessingJob::new("Track.FLAC", EffectParameters::default(), |_: u8, _: &str| {});
        assert_eq!(job.input_name, "input_audio.flac");
        assert_eq!(job.output_name, "output_audio.mp3");
        assert_eq!(job.original_file_name, "Track.FLAC");
    }
}
