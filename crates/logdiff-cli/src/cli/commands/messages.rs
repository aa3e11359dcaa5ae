use logdiff_core::format_messages;

use super::render::warnings_text;
use super::runner::{
    build_comparator, comparison_failed, emit, resolve_config, run_cancellable,
};
use crate::cli::args::MessagesArgs;
use crate::exit_codes::SUCCESS;

pub async fn run(args: MessagesArgs) -> anyhow::Result<i32> {
    let config = resolve_config(&args.decoder)?;
    let comparator = build_comparator(&config, None);
    let log = args.log;

    let outcome = run_cancellable(move |cancel| comparator.log_messages(&log, &cancel)).await?;
    let (events, warnings) = match outcome {
        Ok(found) => found,
        Err(e) => return Ok(comparison_failed(&e)),
    };

    let mut rendered = format_messages(&events);
    rendered.push('\n');
    rendered.push_str(&warnings_text(&warnings));
    emit(&rendered, None)?;
    Ok(SUCCESS)
}
