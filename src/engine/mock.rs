//! Mock engine for testing
//!
//! Keeps resources in memory, "transcodes" by copying the input resource to
//! the output name, and replays a scripted list of progress fractions during
//! execution. Any single call type can be made to fail.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::broadcast;

use super::{Engine, EngineProgress, ProgressBroadcaster};
use crate::config::DEFAULT_CHANNEL_CAPACITY;
use crate::error::EngineError;

/// Which engine call should fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailAt {
    StageInput,
    Execute,
    ReadOutput,
    DeleteResource,
}

/// A recorded engine call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCall {
    StageInput { name: String, len: usize },
    Execute { args: Vec<String> },
    ReadOutput { name: String },
    DeleteResource { name: String },
}

/// In-memory engine
pub struct MockEngine {
    resources: Mutex<HashMap<String, Vec<u8>>>,
    calls: Mutex<Vec<EngineCall>>,
    progress: ProgressBroadcaster,
    progress_script: Vec<f64>,
    fail_at: Option<FailAt>,
    execute_delay: Option<Duration>,
    skip_output: bool,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockEngine {
    pub fn new() -> Self {
        Self {
            resources: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            progress: ProgressBroadcaster::new(DEFAULT_CHANNEL_CAPACITY),
            progress_script: vec![0.0, 0.25, 0.5, 0.75, 1.0],
            fail_at: None,
            execute_delay: None,
            skip_output: false,
        }
    }

    /// Progress fractions emitted during `execute`
    pub fn with_progress(mut self, fractions: Vec<f64>) -> Self {
        self.progress_script = fractions;
        self
    }

    /// Make every call of the given kind fail
    pub fn failing_at(mut self, fail_at: FailAt) -> Self {
        self.fail_at = Some(fail_at);
        self
    }

    /// Sleep this long inside `execute` after emitting progress
    pub fn with_execute_delay(mut self, delay: Duration) -> Self {
        self.execute_delay = Some(delay);
        self
    }

    /// Let `execute` succeed without producing the output resource
    pub fn without_output(mut self) -> Self {
        self.skip_output = true;
        self
    }

    /// All calls made so far, in order
    pub fn calls(&self) -> Vec<EngineCall> {
        lock(&self.calls).clone()
    }

    /// Names passed to `delete_resource`, in order
    pub fn deleted(&self) -> Vec<String> {
        lock(&self.calls)
            .iter()
            .filter_map(|call| match call {
                EngineCall::DeleteResource { name } => Some(name.clone()),
                _ => None,
            })
            .collect()
    }

    /// Argument lists passed to `execute`
    pub fn executed(&self) -> Vec<Vec<String>> {
        lock(&self.calls)
            .iter()
            .filter_map(|call| match call {
                EngineCall::Execute { args } => Some(args.clone()),
                _ => None,
            })
            .collect()
    }

    /// Names of resources currently held
    pub fn resource_names(&self) -> Vec<String> {
        let mut names: Vec<String> = lock(&self.resources).keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of attached progress listeners
    pub fn subscriber_count(&self) -> usize {
        self.progress.subscriber_count()
    }

    fn record(&self, call: EngineCall) {
        lock(&self.calls).push(call);
    }

    fn injected(&self, at: FailAt) -> Result<(), EngineError> {
        if self.fail_at == Some(at) {
            return Err(EngineError::Failed {
                reason: format!("injected failure at {:?}", at),
            });
        }
        Ok(())
    }
}

impl Default for MockEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Pull input and output names out of `-i <in> ... <out>`
fn io_names(args: &[String]) -> Option<(&str, &str)> {
    let input = args
        .iter()
        .position(|a| a == "-i")
        .and_then(|i| args.get(i + 1))?;
    let output = args.last()?;
    Some((input.as_str(), output.as_str()))
}

impl Engine for MockEngine {
    async fn stage_input(&self, name: &str, data: Vec<u8>) -> Result<(), EngineError> {
        self.record(EngineCall::StageInput {
            name: name.to_string(),
            len: data.len(),
        });
        self.injected(FailAt::StageInput)?;
        lock(&self.resources).insert(name.to_string(), data);
        Ok(())
    }

    async fn execute(&self, args: &[String]) -> Result<(), EngineError> {
        self.record(EngineCall::Execute {
            args: args.to_vec(),
        });

        let (input, output) = io_names(args).ok_or_else(|| EngineError::Failed {
            reason: format!("malformed arguments: {:?}", args),
        })?;

        let data = lock(&self.resources)
            .get(input)
            .cloned()
            .ok_or_else(|| EngineError::ResourceNotFound {
                name: input.to_string(),
            })?;

        for fraction in &self.progress_script {
            self.progress.emit(*fraction);
            tokio::task::yield_now().await;
        }

        if let Some(delay) = self.execute_delay {
            tokio::time::sleep(delay).await;
        }

        self.injected(FailAt::Execute)?;

        if !self.skip_output {
            lock(&self.resources).insert(output.to_string(), data);
        }
        Ok(())
    }

    async fn read_output(&self, name: &str) -> Result<Vec<u8>, EngineError> {
        self.record(EngineCall::ReadOutput {
            name: name.to_string(),
        });
        self.injected(FailAt::ReadOutput)?;
        lock(&self.resources)
            .get(name)
            .cloned()
            .ok_or_else(|| EngineError::ResourceNotFound {
                name: name.to_string(),
            })
    }

    async fn delete_resource(&self, name: &str) -> Result<(), EngineError> {
        self.record(EngineCall::DeleteResource {
            name: name.to_string(),
        });
        self.injected(FailAt::DeleteResource)?;
        lock(&self.resources).remove(name);
        Ok(())
    }

    fn subscribe_progress(&self) -> broadcast::Receiver<EngineProgress> {
        self.progress.subscribe()
    }
}
