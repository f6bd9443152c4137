//! Runtime configuration
//!
//! Defaults can be overridden through the environment:
//! - `SLOWVERB_FFMPEG_PATH`: ffmpeg binary (default: `ffmpeg` on PATH)
//! - `SLOWVERB_WORK_DIR`: directory for staged engine files
//!   (default: a fresh directory under the OS temp dir)
//! - `SLOWVERB_EXECUTE_TIMEOUT_MS`: upper bound for one engine execution
//!   (default: none)

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Result, SlowverbError};

pub const ENV_FFMPEG_PATH: &str = "SLOWVERB_FFMPEG_PATH";
pub const ENV_WORK_DIR: &str = "SLOWVERB_WORK_DIR";
pub const ENV_EXECUTE_TIMEOUT_MS: &str = "SLOWVERB_EXECUTE_TIMEOUT_MS";

/// Buffered progress events per subscriber before old ones are dropped
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// ffmpeg executable
    pub ffmpeg_path: PathBuf,
    /// Directory for staged resources; `None` creates a private temp directory
    pub work_dir: Option<PathBuf>,
    /// Progress channel capacity
    pub channel_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: PathBuf::from("ffmpeg"),
            work_dir: None,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub engine: EngineConfig,
    /// Upper bound for the executing stage of a job
    pub execute_timeout: Option<Duration>,
}

impl Config {
    /// Load configuration from `SLOWVERB_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(path) = lookup(ENV_FFMPEG_PATH).filter(|s| !s.trim().is_empty()) {
            config.engine.ffmpeg_path = PathBuf::from(path);
        }

        if let Some(dir) = lookup(ENV_WORK_DIR).filter(|s| !s.trim().is_empty()) {
            config.engine.work_dir = Some(PathBuf::from(dir));
        }

        if let Some(raw) = lookup(ENV_EXECUTE_TIMEOUT_MS).filter(|s| !s.trim().is_empty()) {
            let ms: u64 = raw.trim().parse().map_err(|_| SlowverbError::Config {
                reason: format!("{} must be a whole number of milliseconds, got '{}'", ENV_EXECUTE_TIMEOUT_MS, raw),
            })?;
            config.execute_timeout = (ms > 0).then(|| Duration::from_millis(ms));
        }

        Ok(config)
    }

    pub fn with_ffmpeg_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.engine.ffmpeg_path = path.into();
        self
    }

    pub fn with_execute_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.execute_timeout = timeout;
        self
    }
}
