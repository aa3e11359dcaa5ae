use anyhow::Context;
use logdiff_core::{CompareRequest, ParameterDiffSummary};

use super::render;
use super::runner::{
    build_comparator, comparison_failed, emit, resolve_config, run_cancellable,
};
use crate::cli::args::{CompareArgs, OutputFormat};
use crate::exit_codes::{DIFFERENCES_FOUND, SUCCESS};

pub async fn run(args: CompareArgs) -> anyhow::Result<i32> {
    let config = resolve_config(&args.decoder)?;
    let comparator = build_comparator(&config, args.tolerance_us);
    let request = CompareRequest::new(&args.log1, &args.log2);

    let outcome = run_cancellable({
        let request = request.clone();
        move |cancel| comparator.compare(&request, &cancel)
    })
    .await?;

    let report = match outcome {
        Ok(report) => report,
        Err(e) => return Ok(comparison_failed(&e)),
    };

    let summary = ParameterDiffSummary::of(&report.param_diff);
    tracing::info!(
        added = summary.added,
        removed = summary.removed,
        changed = summary.changed,
        warnings = report.warnings.len(),
        "comparison finished"
    );

    let rendered = match args.format {
        OutputFormat::Text => render::compare_text(&report, &request.log1, &request.log2),
        OutputFormat::Json => render::compare_json(&report, &request.log1, &request.log2)
            .context("failed to serialize report")?,
    };
    emit(&rendered, args.output.as_ref())?;

    if args.fail_on_diff && report.has_parameter_changes() {
        return Ok(DIFFERENCES_FOUND);
    }
    Ok(SUCCESS)
}
