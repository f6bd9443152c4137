//! Engine boundary
//!
//! The engine stages named resources, runs a transcode over them and reports
//! progress while it runs. This crate only drives it:
//! - `Engine`: the calls a job makes, in order
//! - `ProgressBroadcaster`: the progress stream engines publish on
//! - `FfmpegEngine`: runs a local ffmpeg binary over files in a work directory
//! - `MockEngine`: in-memory engine with scripted progress and failure injection

mod ffmpeg;
mod mock;

pub use ffmpeg::FfmpegEngine;
pub use mock::{EngineCall, FailAt, MockEngine};

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::error::EngineError;

/// One progress event emitted while the engine executes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineProgress {
    /// Completed share of the work, in `[0, 1]`
    pub fraction: f64,
}

/// A transcoding engine
///
/// Calls are issued strictly one after another. An engine instance serves
/// one job at a time; callers must not start a second job on it while one
/// is running.
#[allow(async_fn_in_trait)]
pub trait Engine {
    /// Store `data` under `name`
    async fn stage_input(&self, name: &str, data: Vec<u8>) -> Result<(), EngineError>;

    /// Run the engine with a full argument list (see `transcode_args`)
    async fn execute(&self, args: &[String]) -> Result<(), EngineError>;

    /// Read back the resource `name`
    async fn read_output(&self, name: &str) -> Result<Vec<u8>, EngineError>;

    /// Remove the resource `name`; removing a missing resource succeeds
    async fn delete_resource(&self, name: &str) -> Result<(), EngineError>;

    /// Attach a progress listener. Dropping the receiver detaches it.
    fn subscribe_progress(&self) -> broadcast::Receiver<EngineProgress>;
}

/// Argument list for transcoding `input` through `filter_graph` into `output`
pub fn transcode_args(input: &str, filter_graph: &str, output: &str) -> Vec<String> {
    vec![
        "-i".to_string(),
        input.to_string(),
        "-filter:a".to_string(),
        filter_graph.to_string(),
        "-y".to_string(),
        output.to_string(),
    ]
}

/// Fan-out of progress events to the listeners currently attached
#[derive(Debug, Clone)]
pub struct ProgressBroadcaster {
    tx: broadcast::Sender<EngineProgress>,
}

impl ProgressBroadcaster {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EngineProgress> {
        self.tx.subscribe()
    }

    /// Publish a fraction, clamped to `[0, 1]`. Non-finite values are dropped.
    pub fn emit(&self, fraction: f64) {
        if !fraction.is_finite() {
            return;
        }
        // No listeners is not an error
        let _ = self.tx.send(EngineProgress {
            fraction: fraction.clamp(0.0, 1.0),
        });
    }

    /// Number of attached listeners
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcode_args_shape() {
        let args = transcode_args("input_audio.wav", "anull", "output_audio.mp3");
        assert_eq!(
            args,
            vec!["-i", "input_audio.wav", "-filter:a", "anull", "-y", "output_audio.mp3"]
        );
    }

    #[test]
    fn test_broadcaster_clamps_and_detaches() {
        let progress = ProgressBroadcaster::new(8);
        assert_eq!(progress.subscriber_count(), 0);

        let mut rx = progress.subscribe();
        assert_eq!(progress.subscriber_count(), 1);

        progress.emit(1.7);
        progress.emit(f64::NAN);
        progress.emit(-0.2);
        assert_eq!(rx.try_recv().unwrap().fraction, 1.0);
        assert_eq!(rx.try_recv().unwrap().fraction, 0.0);
        assert!(rx.try_recv().is_err());

        drop(rx);
        assert_eq!(progress.subscriber_count(), 0);
    }
}
