use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "logdiff",
    version,
    about = "Compare two flight logs: control tracking, parameter changes and messages"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Full comparison of two logs
    Compare(CompareArgs),
    /// Parameter differences only
    Params(ParamsArgs),
    /// Messages recorded in one log
    Messages(MessagesArgs),
    Version,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Where the decoder comes from and how long it may run.
#[derive(clap::Args, Clone, Debug)]
pub struct DecoderArgs {
    /// Config file (default: ./logdiff.yaml when present)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Decoder program, overrides the config file
    #[arg(long, env = "LOGDIFF_DECODER")]
    pub decoder: Option<PathBuf>,

    /// Per-decode timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,
}

#[derive(clap::Args, Clone, Debug)]
pub struct CompareArgs {
    /// Baseline log
    pub log1: PathBuf,
    /// Log compared against the baseline
    pub log2: PathBuf,

    #[command(flatten)]
    pub decoder: DecoderArgs,

    /// Ignore control-tuning samples further than this from an attitude sample
    #[arg(long, value_name = "N")]
    pub tolerance_us: Option<u64>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Write the report here instead of stdout
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Exit 1 when the parameter sets differ
    #[arg(long)]
    pub fail_on_diff: bool,
}

#[derive(clap::Args, Clone, Debug)]
pub struct ParamsArgs {
    pub log1: PathBuf,
    pub log2: PathBuf,

    #[command(flatten)]
    pub decoder: DecoderArgs,

    /// Exit 1 when the parameter sets differ
    #[arg(long)]
    pub fail_on_diff: bool,
}

#[derive(clap::Args, Clone, Debug)]
pub struct MessagesArgs {
    pub log: PathBuf,

    #[command(flatten)]
    pub decoder: DecoderArgs,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn compare_parses_all_flags() {
        let cli = Cli::try_parse_from([
            "logdiff",
            "compare",
            "a.bin",
            "b.bin",
            "--format",
            "json",
            "--decoder",
            "/opt/mavlogdump.py",
            "--timeout",
            "30",
            "--tolerance-us",
            "20000",
            "--fail-on-diff",
        ])
        .unwrap();
        let Command::Compare(args) = cli.cmd else {
            panic!("expected compare");
        };
        assert_eq!(args.log1, PathBuf::from("a.bin"));
        assert_eq!(args.format, OutputFormat::Json);
        assert_eq!(args.decoder.decoder, Some(PathBuf::from("/opt/mavlogdump.py")));
        assert_eq!(args.decoder.timeout, Some(30));
        assert_eq!(args.tolerance_us, Some(20_000));
        assert!(args.fail_on_diff);
        assert!(args.output.is_none());
    }

    #[test]
    fn messages_takes_one_log() {
        assert!(Cli::try_parse_from(["logdiff", "messages"]).is_err());
        let cli = Cli::try_parse_from(["logdiff", "messages", "a.bin"]).unwrap();
        assert!(matches!(cli.cmd, Command::Messages(ref a) if a.log == PathBuf::from("a.bin")));
    }
}
