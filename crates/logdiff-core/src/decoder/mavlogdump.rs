//! Decoder backed by pymavlink's `mavlogdump.py`.
//!
//! Each decode runs the tool as a child process with standard output
//! redirected to a private temporary file. Running the decoder out of
//! process keeps a crash or hang in the tool from taking the caller down:
//! the child is polled and killed on timeout or cancellation.

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

use super::{parse_csv_table, DecodedTable, LogDecoder};
use crate::config::DecoderConfig;
use crate::error::{DecodeError, DecodeErrorKind};

pub const DEFAULT_PROGRAM: &str = "mavlogdump.py";

const STDERR_CAP: usize = 4096;
const POLL_INTERVAL: Duration = Duration::from_millis(25);

#[derive(Debug, Clone)]
pub struct MavlogdumpDecoder {
    program: PathBuf,
    extra_args: Vec<String>,
    timeout: Option<Duration>,
}

impl Default for MavlogdumpDecoder {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM)
    }
}

impl MavlogdumpDecoder {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            extra_args: Vec::new(),
            timeout: None,
        }
    }

    pub fn from_config(config: &DecoderConfig) -> Self {
        Self {
            program: config.program.clone(),
            extra_args: config.extra_args.clone(),
            timeout: config.timeout_secs.map(Duration::from_secs),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_extra_args(mut self, args: impl IntoIterator<Item = String>) -> Self {
        self.extra_args.extend(args);
        self
    }

    fn command(&self, path: &Path, tags: &[&str]) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("--format")
            .arg("csv")
            .arg("--types")
            .arg(tags.join(","))
            .args(&self.extra_args)
            .arg(path);
        cmd
    }
}

impl LogDecoder for MavlogdumpDecoder {
    fn decode(
        &self,
        path: &Path,
        tags: &[&str],
        cancel: &CancellationToken,
    ) -> Result<DecodedTable, DecodeError> {
        let fail = |kind| DecodeError::new(path, kind);
        let io = |e: std::io::Error| {
            fail(DecodeErrorKind::Io {
                reason: e.to_string(),
            })
        };

        ensure_readable(path).map_err(|e| {
            fail(DecodeErrorKind::Unreadable {
                reason: e.to_string(),
            })
        })?;

        if cancel.is_cancelled() {
            return Err(fail(DecodeErrorKind::Cancelled));
        }

        // Unique per call, removed on drop.
        let stdout_file = scratch_file(".csv").map_err(io)?;
        let mut stderr_file = scratch_file(".err").map_err(io)?;

        let mut cmd = self.command(path, tags);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::from(stdout_file.reopen().map_err(io)?))
            .stderr(Stdio::from(stderr_file.reopen().map_err(io)?));

        tracing::debug!(
            program = %self.program.display(),
            log = %path.display(),
            types = %tags.join(","),
            scratch = %stdout_file.path().display(),
            "spawning decoder"
        );

        let started = Instant::now();
        let mut child = cmd.spawn().map_err(|e| {
            fail(DecodeErrorKind::Spawn {
                program: self.program.display().to_string(),
                reason: e.to_string(),
            })
        })?;

        let status = match wait_for_exit(&mut child, self.timeout, cancel) {
            Ok(WaitOutcome::Exited(status)) => status,
            Ok(WaitOutcome::TimedOut(timeout)) => {
                terminate(&mut child);
                return Err(fail(DecodeErrorKind::TimedOut { timeout }));
            }
            Ok(WaitOutcome::Cancelled) => {
                terminate(&mut child);
                return Err(fail(DecodeErrorKind::Cancelled));
            }
            Err(e) => {
                terminate(&mut child);
                return Err(io(e));
            }
        };

        if !status.success() {
            return Err(fail(DecodeErrorKind::Failed {
                code: status.code(),
                stderr: read_capped(stderr_file.as_file_mut()),
            }));
        }

        tracing::debug!(
            log = %path.display(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "decoder finished"
        );

        let mut output = stdout_file.reopen().map_err(io)?;
        output.seek(SeekFrom::Start(0)).map_err(io)?;
        parse_csv_table(path, BufReader::new(output))
    }
}

fn ensure_readable(path: &Path) -> std::io::Result<()> {
    let file = File::open(path)?;
    if file.metadata()?.is_dir() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "path is a directory",
        ));
    }
    Ok(())
}

fn scratch_file(suffix: &str) -> std::io::Result<tempfile::NamedTempFile> {
    tempfile::Builder::new()
        .prefix("logdiff-")
        .suffix(suffix)
        .tempfile()
}

fn read_capped(file: &mut File) -> String {
    let mut buf = Vec::new();
    if file.seek(SeekFrom::Start(0)).is_ok() {
        let _ = file.take(STDERR_CAP as u64).read_to_end(&mut buf);
    }
    String::from_utf8_lossy(&buf).into_owned()
}

enum WaitOutcome {
    Exited(ExitStatus),
    TimedOut(Duration),
    Cancelled,
}

fn wait_for_exit(
    child: &mut Child,
    timeout: Option<Duration>,
    cancel: &CancellationToken,
) -> std::io::Result<WaitOutcome> {
    let start = Instant::now();
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(WaitOutcome::Exited(status));
        }
        if cancel.is_cancelled() {
            return Ok(WaitOutcome::Cancelled);
        }
        if let Some(limit) = timeout.filter(|t| start.elapsed() >= *t) {
            return Ok(WaitOutcome::TimedOut(limit));
        }
        std::thread::sleep(POLL_INTERVAL);
    }
}

fn terminate(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}
