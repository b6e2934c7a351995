pub mod batch;
pub mod prompts;
pub mod stats;

use super::args::{Cli, Command};

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.cmd {
        Command::Batch(args) => batch::run(args).await,
        Command::Stats(args) => stats::run(args),
        Command::Prompts(args) => prompts::run(args),
    }
}
