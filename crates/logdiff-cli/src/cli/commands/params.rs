use logdiff_core::{diff_parameters, format_parameter_diff, CompareRequest};

use super::render::warnings_text;
use super::runner::{
    build_comparator, comparison_failed, emit, resolve_config, run_cancellable,
};
use crate::cli::args::ParamsArgs;
use crate::exit_codes::{DIFFERENCES_FOUND, SUCCESS};

pub async fn run(args: ParamsArgs) -> anyhow::Result<i32> {
    let config = resolve_config(&args.decoder)?;
    let comparator = build_comparator(&config, None);
    let request = CompareRequest::new(&args.log1, &args.log2);

    let outcome =
        run_cancellable(move |cancel| comparator.parameter_maps(&request, &cancel)).await?;
    let (first, second, warnings) = match outcome {
        Ok(maps) => maps,
        Err(e) => return Ok(comparison_failed(&e)),
    };

    let diff = diff_parameters(&first, &second);
    let mut rendered = format_parameter_diff(&diff);
    if !rendered.ends_with('\n') {
        rendered.push('\n');
    }
    rendered.push_str(&warnings_text(&warnings));
    emit(&rendered, None)?;

    if args.fail_on_diff && !diff.is_empty() {
        return Ok(DIFFERENCES_FOUND);
    }
    Ok(SUCCESS)
}
