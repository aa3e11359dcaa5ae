//! Shared plumbing: config resolution, decoder construction, the blocking
//! worker with Ctrl-C cancellation, and report output.

use anyhow::Context;
use logdiff_core::config::{load_config, DEFAULT_CONFIG_FILE};
use logdiff_core::{
    AlignOptions, CancellationToken, Comparator, CompareError, LogdiffConfig, MavlogdumpDecoder,
};
use std::path::{Path, PathBuf};

use crate::cli::args::DecoderArgs;
use crate::exit_codes::CANCELLED;

/// Explicit `--config`, else `./logdiff.yaml` if present, else defaults.
/// Flags and `LOGDIFF_DECODER` override whatever the file says.
pub(crate) fn resolve_config(args: &DecoderArgs) -> anyhow::Result<LogdiffConfig> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => {
            let default = Path::new(DEFAULT_CONFIG_FILE);
            if default.is_file() {
                load_config(default)?
            } else {
                LogdiffConfig::default()
            }
        }
    };
    if let Some(program) = &args.decoder {
        config.decoder.program = program.clone();
    }
    if let Some(secs) = args.timeout {
        config.decoder.timeout_secs = Some(secs);
    }
    tracing::debug!(
        decoder = %config.decoder.program.display(),
        timeout_secs = ?config.decoder.timeout_secs,
        "resolved configuration"
    );
    Ok(config)
}

pub(crate) fn build_comparator(
    config: &LogdiffConfig,
    tolerance_us: Option<u64>,
) -> Comparator<MavlogdumpDecoder> {
    let decoder = MavlogdumpDecoder::from_config(&config.decoder);
    let mut comparator = Comparator::from_config(decoder, config);
    if let Some(tolerance_us) = tolerance_us {
        comparator = comparator.with_align_options(AlignOptions {
            tolerance_us: Some(tolerance_us),
        });
    }
    comparator
}

/// Run `job` on a blocking worker. Ctrl-C cancels the token handed to the
/// job and then waits for it to wind down.
pub(crate) async fn run_cancellable<T, F>(job: F) -> anyhow::Result<T>
where
    F: FnOnce(CancellationToken) -> T + Send + 'static,
    T: Send + 'static,
{
    let cancel = CancellationToken::new();
    let mut worker = tokio::task::spawn_blocking({
        let cancel = cancel.clone();
        move || job(cancel)
    });

    tokio::select! {
        joined = &mut worker => joined.context("comparison worker failed"),
        Ok(()) = tokio::signal::ctrl_c() => {
            tracing::warn!("interrupted, stopping decoder");
            cancel.cancel();
            worker.await.context("comparison worker failed")
        }
    }
}

/// Report a failed comparison on stderr and pick the exit code.
pub(crate) fn comparison_failed(e: &CompareError) -> i32 {
    let code = e.exit_code();
    if code == CANCELLED {
        eprintln!("interrupted");
    } else {
        eprintln!("error: {e}");
    }
    code
}

/// Write to `output` if given, otherwise stdout.
pub(crate) fn emit(rendered: &str, output: Option<&PathBuf>) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("failed to write report to {}", path.display()))?;
            tracing::info!(path = %path.display(), "report written");
        }
        None => {
            print!("{rendered}");
            if !rendered.ends_with('\n') {
                println!();
            }
        }
    }
    Ok(())
}
