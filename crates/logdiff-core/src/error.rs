//! Error types for log extraction and comparison.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Why a decoder run produced no table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeErrorKind {
    /// Log path missing or not readable.
    Unreadable { reason: String },
    /// Decoder program could not be started.
    Spawn { program: String, reason: String },
    /// Decoder ran but exited with failure.
    Failed { code: Option<i32>, stderr: String },
    /// Decoder exceeded its time budget and was killed.
    TimedOut { timeout: Duration },
    /// Decode aborted through the cancellation token.
    Cancelled,
    /// Scratch file or pipe I/O failed.
    Io { reason: String },
    /// Decoder output was not a readable CSV table.
    Csv { reason: String },
}

impl fmt::Display for DecodeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unreadable { reason } => write!(f, "log unreadable: {reason}"),
            Self::Spawn { program, reason } => {
                write!(f, "failed to start decoder '{program}': {reason}")
            }
            Self::Failed { code, stderr } => {
                match code {
                    Some(code) => write!(f, "decoder exited with status {code}")?,
                    None => write!(f, "decoder terminated by signal")?,
                }
                let stderr = stderr.trim();
                if !stderr.is_empty() {
                    write!(f, ": {stderr}")?;
                }
                Ok(())
            }
            Self::TimedOut { timeout } => write!(f, "decoder timed out after {timeout:?}"),
            Self::Cancelled => write!(f, "decode cancelled"),
            Self::Io { reason } => write!(f, "decoder I/O error: {reason}"),
            Self::Csv { reason } => write!(f, "decoder output is not valid CSV: {reason}"),
        }
    }
}

/// Decoder invocation failed or the log could not be read.
///
/// Fatal to the enclosing comparison. Not retried: a log that failed to
/// decode once will fail again.
#[derive(Debug, Clone, thiserror::Error)]
#[error("failed to decode {}: {kind}", .path.display())]
pub struct DecodeError {
    pub path: PathBuf,
    pub kind: DecodeErrorKind,
}

impl DecodeError {
    pub fn new(path: impl Into<PathBuf>, kind: DecodeErrorKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self.kind, DecodeErrorKind::Cancelled)
    }
}

/// A single decoded row that does not fit the expected schema.
///
/// Recovered locally by the extractor: the row is dropped and counted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed record at line {line}: {reason}")]
pub struct MalformedRecord {
    pub line: usize,
    pub reason: String,
}

/// Configuration could not be loaded.
#[derive(Debug, Clone, thiserror::Error)]
#[error("config error: {0}")]
pub struct ConfigError(pub String);

/// Which log an error or warning refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogSide {
    First,
    Second,
    /// The only log of a single-log view.
    Single,
}

impl fmt::Display for LogSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::First => f.write_str("log 1"),
            Self::Second => f.write_str("log 2"),
            Self::Single => f.write_str("log"),
        }
    }
}

/// Comparison aborted; no report is produced.
#[derive(Debug, thiserror::Error)]
pub enum CompareError {
    #[error("{log}: {source}")]
    Decode {
        log: LogSide,
        #[source]
        source: DecodeError,
    },

    #[error("comparison cancelled")]
    Cancelled,
}

impl CompareError {
    /// Exit code for CLI.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Decode { source, .. } if source.is_cancelled() => 130,
            Self::Decode { .. } => 2,
            Self::Cancelled => 130,
        }
    }
}
