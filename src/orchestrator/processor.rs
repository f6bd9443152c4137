//! Processing orchestrator
//!
//! Drives one job against a borrowed engine: stage the input, compile and
//! execute the filter graph, read the output back, clean up. Any failure
//! becomes a single `ProcessingError`; the cause is only logged.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::sync::broadcast::Receiver;
use tracing::Instrument;

use super::job::{JobStage, ProcessingJob, ProgressSink};
use crate::config::Config;
use crate::engine::{transcode_args, Engine, EngineProgress};
use crate::error::{EngineError, JobFailure, ProcessingError};
use crate::graph;
use crate::naming;
use crate::params::EffectParameters;

/// A finished job's output. Owned by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputArtifact {
    pub data: Vec<u8>,
    pub mime_type: &'static str,
    pub file_name: String,
}

impl OutputArtifact {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Write the artifact into `dir` under its file name
    pub async fn write_to_dir(&self, dir: &Path) -> std::io::Result<PathBuf> {
        let path = dir.join(&self.file_name);
        tokio::fs::write(&path, &self.data).await?;
        Ok(path)
    }
}

/// Runs processing jobs on an engine it borrows
///
/// Only one job may run on a given engine at a time.
pub struct ProcessingOrchestrator<'e, E> {
    engine: &'e E,
    execute_timeout: Option<Duration>,
}

impl<'e, E: Engine> ProcessingOrchestrator<'e, E> {
    pub fn new(engine: &'e E) -> Self {
        Self {
            engine,
            execute_timeout: None,
        }
    }

    pub fn from_config(engine: &'e E, config: &Config) -> Self {
        Self::new(engine).with_execute_timeout(config.execute_timeout)
    }

    /// Bound the executing stage; `None` waits for the engine indefinitely
    pub fn with_execute_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.execute_timeout = timeout;
        self
    }

    /// Process `input` with `params`, reporting progress to `on_progress`
    ///
    /// On success the last progress update is `(100, "Complete!")`.
    /// Staged engine resources are removed on every path.
    pub async fn run<S: ProgressSink>(
        &self,
        input: Vec<u8>,
        original_file_name: &str,
        params: &EffectParameters,
        on_progress: S,
    ) -> Result<OutputArtifact, ProcessingError> {
        let mut job = ProcessingJob::new(original_file_name, *params, on_progress);
        let span = tracing::info_span!("job", id = %job.id, file = original_file_name);

        async move {
            tracing::info!(params = %job.params, bytes = input.len(), "processing started");

            let outcome = self.run_stages(&mut job, input).await;
            self.cleanup(&job).await;

            match outcome {
                Ok(data) => {
                    let artifact = OutputArtifact {
                        data,
                        mime_type: naming::OUTPUT_MIME_TYPE,
                        file_name: naming::file_name(&job.original_file_name, &job.params),
                    };
                    job.advance(JobStage::Complete);
                    tracing::info!(
                        output = %artifact.file_name,
                        bytes = artifact.len(),
                        "processing complete"
                    );
                    Ok(artifact)
                }
                Err(failure) => {
                    let stage = job.fail();
                    tracing::error!(stage = %stage, error = %failure, "processing failed");
                    Err(ProcessingError)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn run_stages<S: ProgressSink>(
        &self,
        job: &mut ProcessingJob<S>,
        input: Vec<u8>,
    ) -> Result<Vec<u8>, JobFailure> {
        job.advance(JobStage::ReadingInput);
        self.engine
            .stage_input(&job.input_name, input)
            .await
            .map_err(JobFailure::InputStage)?;

        job.advance(JobStage::PreparingFilters);
        let filter_graph = graph::compile(&job.params).serialize();
        tracing::debug!(graph = %filter_graph, "filter graph compiled");
        let args = transcode_args(&job.input_name, &filter_graph, job.output_name);

        self.execute(job, &args).await.map_err(JobFailure::Execution)?;

        job.advance(JobStage::Finalizing);
        self.engine
            .read_output(job.output_name)
            .await
            .map_err(JobFailure::OutputRead)
    }

    /// Executing stage. The progress subscription lives exactly as long as
    /// this call.
    async fn execute<S: ProgressSink>(
        &self,
        job: &mut ProcessingJob<S>,
        args: &[String],
    ) -> Result<(), EngineError> {
        let mut progress = self.engine.subscribe_progress();
        job.advance(JobStage::Executing);

        let run = self.execute_with_progress(job, &mut progress, args);
        match self.execute_timeout {
            Some(limit) => tokio::time::timeout(limit, run)
                .await
                .map_err(|_| EngineError::TimedOut {
                    timeout_ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
                })?,
            None => run.await,
        }
    }

    async fn execute_with_progress<S: ProgressSink>(
        &self,
        job: &mut ProcessingJob<S>,
        progress: &mut Receiver<EngineProgress>,
        args: &[String],
    ) -> Result<(), EngineError> {
        let execution = self.engine.execute(args);
        tokio::pin!(execution);

        let mut listening = true;
        let result = loop {
            tokio::select! {
                result = &mut execution => break result,
                event = progress.recv(), if listening => match event {
                    Ok(event) => job.engine_progress(event.fraction),
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::debug!(skipped, "progress events dropped");
                    }
                    Err(RecvError::Closed) => listening = false,
                },
            }
        };

        // Events published just before the engine returned
        loop {
            match progress.try_recv() {
                Ok(event) => job.engine_progress(event.fraction),
                Err(TryRecvError::Lagged(_)) => continue,
                Err(_) => break,
            }
        }

        result
    }

    /// Remove both staged resources. Failures are logged and swallowed so
    /// they never replace the job's own outcome.
    async fn cleanup<S: ProgressSink>(&self, job: &ProcessingJob<S>) {
        for name in [job.input_name.as_str(), job.output_name] {
            if let Err(e) = self.engine.delete_resource(name).await {
                let failure = JobFailure::Cleanup(e);
                tracing::warn!(resource = name, error = %failure, "cleanup failed");
            }
        }
    }
}
