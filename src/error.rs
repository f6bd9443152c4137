//! Error handling for Slowverb
//!
//! Three layers of errors:
//! - `EngineError`: what an engine call reports (staging, execution, reads)
//! - `ProcessingError`: the single generic failure a caller sees from a job
//! - `SlowverbError`: everything else the library and CLI can fail with

use thiserror::Error;

/// Result type alias for Slowverb operations
pub type Result<T> = std::result::Result<T, SlowverbError>;

/// Message shown to the user for any failed job.
pub const PROCESSING_FAILED_MESSAGE: &str =
    "Failed to process audio. Please try a different file.";

/// Errors reported by an engine implementation
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Engine resource not found: {name}")]
    ResourceNotFound { name: String },

    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Engine exited with status {code:?}: {detail}")]
    ExitStatus { code: Option<i32>, detail: String },

    #[error("Engine call timed out after {timeout_ms}ms")]
    TimedOut { timeout_ms: u64 },

    #[error("Engine failure: {reason}")]
    Failed { reason: String },

    #[error("Engine I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// The one error a processing job surfaces to its caller.
///
/// The underlying cause is logged when the job fails and is not retained here.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[error("{}", PROCESSING_FAILED_MESSAGE)]
pub struct ProcessingError;

impl ProcessingError {
    pub fn message(&self) -> &'static str {
        PROCESSING_FAILED_MESSAGE
    }
}

/// Where a job failed. Logged internally; callers only ever see `ProcessingError`.
#[derive(Error, Debug)]
pub(crate) enum JobFailure {
    #[error("failed to stage input: {0}")]
    InputStage(#[source] EngineError),

    #[error("engine execution failed: {0}")]
    Execution(#[source] EngineError),

    #[error("failed to read output: {0}")]
    OutputRead(#[source] EngineError),

    #[error("failed to clean up engine resource: {0}")]
    Cleanup(#[source] EngineError),
}

/// Main error type for Slowverb operations
#[derive(Error, Debug)]
pub enum SlowverbError {
    // Parameter Errors
    #[error("Invalid parameter '{param}': {value} (expected {expected})")]
    InvalidParameter {
        param: String,
        value: String,
        expected: String,
    },

    #[error("Unknown preset: {id}")]
    UnknownPreset { id: String },

    // Input Errors
    #[error("Unsupported audio format: {format}")]
    UnsupportedFormat { format: String },

    // Processing Errors
    #[error(transparent)]
    Processing(#[from] ProcessingError),

    // Configuration Errors
    #[error("Configuration error: {reason}")]
    Config { reason: String },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SlowverbError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            SlowverbError::InvalidParameter { .. } => "INVALID_PARAMETER",
            SlowverbError::UnknownPreset { .. } => "UNKNOWN_PRESET",
            SlowverbError::UnsupportedFormat { .. } => "UNSUPPORTED_FORMAT",
            SlowverbError::Processing(_) => "PROCESSING_ERROR",
            SlowverbError::Config { .. } => "CONFIG_ERROR",
            SlowverbError::Io(_) => "IO_ERROR",
            SlowverbError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Check if this error is recoverable by changing the request
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SlowverbError::InvalidParameter { .. }
                | SlowverbError::UnknownPreset { .. }
                | SlowverbError::UnsupportedFormat { .. }
                | SlowverbError::Processing(_)
        )
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            SlowverbError::InvalidParameter { .. } => vec![
                "Tempo must be between 0.5 and 2.0",
                "Pitch must be between -12 and +12 semitones",
                "Reverb must be between 0 and 100 percent",
            ],
            SlowverbError::UnknownPreset { .. } => {
                vec!["Run 'slowverb presets' to list the available presets"]
            }
            SlowverbError::UnsupportedFormat { .. } => vec![
                "Supported formats: MP3, WAV, OGG, FLAC, AAC, M4A",
                "Convert the file to WAV or MP3 first",
            ],
            SlowverbError::Processing(_) => vec![
                "Check that the file plays in another application",
                "Try a different file",
                "Run with --verbose to see the engine diagnostic",
            ],
            SlowverbError::Config { .. } => vec![
                "Check the SLOWVERB_* environment variables",
                "Make sure ffmpeg is installed and on PATH, or pass --ffmpeg",
            ],
            _ => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_processing_error_message_is_generic() {
        let err = ProcessingError;
        assert_eq!(
            err.to_string(),
            "Failed to process audio. Please try a different file."
        );
        assert_eq!(err.message(), PROCESSING_FAILED_MESSAGE);
    }

    #[test]
    fn test_processing_error_converts() {
        let err: SlowverbError = ProcessingError.into();
        assert_eq!(err.error_code(), "PROCESSING_ERROR");
        assert_eq!(err.to_string(), PROCESSING_FAILED_MESSAGE);
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_recovery_suggestions() {
        let err = SlowverbError::UnsupportedFormat {
            format: "txt".to_string(),
        };
        assert!(!err.recovery_suggestions().is_empty());
        assert_eq!(err.error_code(), "UNSUPPORTED_FORMAT");
    }

    #[test]
    fn test_engine_error_display() {
        let err = EngineError::ResourceNotFound {
            name: "output_audio.mp3".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Engine resource not found: output_audio.mp3"
        );
    }
}
