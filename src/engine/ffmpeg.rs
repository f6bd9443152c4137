//! ffmpeg-backed engine
//!
//! Resources are plain files inside a work directory. `execute` runs the
//! ffmpeg binary in that directory with machine-readable progress on stdout
//! (`-progress pipe:1`) and derives a completion fraction from the input
//! duration printed on stderr.

use std::collections::VecDeque;
use std::path::{Component, Path, PathBuf};
use std::process::Stdio;
use std::sync::Mutex;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::broadcast;

use super::{Engine, EngineProgress, ProgressBroadcaster};
use crate::config::EngineConfig;
use crate::error::EngineError;

/// stderr lines kept for the failure diagnostic
const STDERR_TAIL_LINES: usize = 12;

/// Arguments placed before the caller's arguments on every run
const BASE_ARGS: &[&str] = &[
    "-hide_banner",
    "-nostdin",
    "-nostats",
    "-progress",
    "pipe:1",
];

/// A line of ffmpeg's `-progress` output we care about
#[derive(Debug, Clone, Copy, PartialEq)]
enum ProgressLine {
    /// Output timestamp in seconds
    OutTime(f64),
    /// `progress=end`
    End,
}

/// Parse `Duration: HH:MM:SS.xx` from an ffmpeg stderr line
fn parse_duration_line(line: &str) -> Option<f64> {
    let rest = line.trim_start().strip_prefix("Duration:")?;
    let stamp = rest.trim_start().split(',').next()?.trim();
    parse_timestamp(stamp)
}

/// Parse `HH:MM:SS(.frac)` into seconds
fn parse_timestamp(stamp: &str) -> Option<f64> {
    let mut parts = stamp.split(':');
    let hours: f64 = parts.next()?.parse().ok()?;
    let minutes: f64 = parts.next()?.parse().ok()?;
    let seconds: f64 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(hours * 3600.0 + minutes * 60.0 + seconds)
}

fn parse_progress_line(line: &str) -> Option<ProgressLine> {
    let (key, value) = line.trim().split_once('=')?;
    match key {
        // out_time_ms is microseconds as well
        "out_time_us" | "out_time_ms" => {
            let micros: f64 = value.parse().ok()?;
            Some(ProgressLine::OutTime(micros / 1_000_000.0))
        }
        "progress" if value == "end" => Some(ProgressLine::End),
        _ => None,
    }
}

/// Engine that shells out to ffmpeg
pub struct FfmpegEngine {
    ffmpeg_path: PathBuf,
    work_dir: PathBuf,
    owns_work_dir: bool,
    progress: ProgressBroadcaster,
}

impl FfmpegEngine {
    /// Create the engine and its work directory
    pub async fn new(config: &EngineConfig) -> Result<Self, EngineError> {
        let (work_dir, owns_work_dir) = match &config.work_dir {
            Some(dir) => (dir.clone(), false),
            None => (
                std::env::temp_dir().join(format!("slowverb-{}", uuid::Uuid::new_v4())),
                true,
            ),
        };

        tokio::fs::create_dir_all(&work_dir).await?;
        tracing::debug!(work_dir = %work_dir.display(), "ffmpeg engine ready");

        Ok(Self {
            ffmpeg_path: config.ffmpeg_path.clone(),
            work_dir,
            owns_work_dir,
            progress: ProgressBroadcaster::new(config.channel_capacity),
        })
    }

    /// Check that the ffmpeg binary can be started
    pub async fn is_available(&self) -> bool {
        Command::new(&self.ffmpeg_path)
            .arg("-version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|status| status.success())
            .unwrap_or(false)
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Number of attached progress listeners
    pub fn subscriber_count(&self) -> usize {
        self.progress.subscriber_count()
    }

    /// Map a resource name to a file in the work directory.
    /// Only bare file names are accepted.
    fn resource_path(&self, name: &str) -> Result<PathBuf, EngineError> {
        let mut components = Path::new(name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Ok(self.work_dir.join(name)),
            _ => Err(EngineError::Failed {
                reason: format!("invalid resource name '{}'", name),
            }),
        }
    }

    async fn read_progress<R>(&self, stdout: R, duration: &Mutex<Option<f64>>)
    where
        R: AsyncRead + Unpin,
    {
        let mut lines = BufReader::new(stdout).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            match parse_progress_line(&line) {
                Some(ProgressLine::OutTime(seconds)) => {
                    let total = duration.lock().ok().and_then(|d| *d);
                    if let Some(total) = total.filter(|t| *t > 0.0) {
                        self.progress.emit(seconds / total);
                    }
                }
                Some(ProgressLine::End) => self.progress.emit(1.0),
                None => {}
            }
        }
    }
}

async fn read_diagnostics<R>(stderr: R, duration: &Mutex<Option<f64>>) -> VecDeque<String>
where
    R: AsyncRead + Unpin,
{
    let mut tail = VecDeque::with_capacity(STDERR_TAIL_LINES);
    let mut lines = BufReader::new(stderr).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        if let Some(seconds) = parse_duration_line(&line) {
            if let Ok(mut slot) = duration.lock() {
                slot.get_or_insert(seconds);
            }
        }
        if tail.len() == STDERR_TAIL_LINES {
            tail.pop_front();
        }
        tail.push_back(line);
    }
    tail
}

impl Engine for FfmpegEngine {
    async fn stage_input(&self, name: &str, data: Vec<u8>) -> Result<(), EngineError> {
        let path = self.resource_path(name)?;
        tokio::fs::write(&path, data).await?;
        Ok(())
    }

    async fn execute(&self, args: &[String]) -> Result<(), EngineError> {
        let program = self.ffmpeg_path.display().to_string();
        tracing::debug!(program = %program, ?args, "starting ffmpeg");

        let mut child = Command::new(&self.ffmpeg_path)
            .current_dir(&self.work_dir)
            .args(BASE_ARGS)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| EngineError::Spawn {
                program: program.clone(),
                source,
            })?;

        let stdout = child.stdout.take().ok_or_else(|| EngineError::Failed {
            reason: "ffmpeg stdout not available".to_string(),
        })?;
        let stderr = child.stderr.take().ok_or_else(|| EngineError::Failed {
            reason: "ffmpeg stderr not available".to_string(),
        })?;

        let duration = Mutex::new(None);
        let ((), tail) = tokio::join!(
            self.read_progress(stdout, &duration),
            read_diagnostics(stderr, &duration)
        );

        let status = child.wait().await?;
        if !status.success() {
            return Err(EngineError::ExitStatus {
                code: status.code(),
                detail: tail.into_iter().collect::<Vec<_>>().join("\n"),
            });
        }

        Ok(())
    }

    async fn read_output(&self, name: &str) -> Result<Vec<u8>, EngineError> {
        let path = self.resource_path(name)?;
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(EngineError::ResourceNotFound {
                    name: name.to_string(),
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn delete_resource(&self, name: &str) -> Result<(), EngineError> {
        let path = self.resource_path(name)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn subscribe_progress(&self) -> broadcast::Receiver<EngineProgress> {
        self.progress.subscribe()
    }
}

impl Drop for FfmpegEngine {
    fn drop(&mut self) {
        if self.owns_work_dir {
            if let Err(e) = std::fs::remove_dir_all(&self.work_dir) {
                tracing::warn!(
                    work_dir = %self.work_dir.display(),
                    error = %e,
                    "failed to remove engine work directory"
                );
            }
        }
    }
}
