use super::args::*;

pub mod compare;
pub mod messages;
pub mod params;
pub(crate) mod render;
pub(crate) mod runner;

use crate::exit_codes::SUCCESS;

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.cmd {
        Command::Compare(args) => compare::run(args).await,
        Command::Params(args) => params::run(args).await,
        Command::Messages(args) => messages::run(args).await,
        Command::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(SUCCESS)
        }
    }
}
