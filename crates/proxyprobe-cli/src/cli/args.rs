use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use proxyprobe_core::guard::DEFAULT_DAILY_BUDGET_CENTS;

#[derive(Parser)]
#[command(
    name = "proxyprobe",
    version,
    about = "Adversarial robustness probe for LLM proxy voting advisors"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Evaluate every proposal and variant under one model/prompt combination
    Batch(BatchArgs),
    /// Render agreement and flip-rate statistics from cached evaluations
    Stats(StatsArgs),
    /// List prompt templates, marking those with cached evaluation data
    Prompts(PromptsArgs),
}

#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// Directory holding proposals.json and variants.json
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,
    /// SQLite evaluation store
    #[arg(long, default_value = "cache/evaluations.db")]
    pub db: PathBuf,
}

#[derive(Args, Debug)]
pub struct BatchArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Model selector (claude-sonnet, gpt-4o, fake)
    #[arg(long, default_value = "claude-sonnet")]
    pub model: String,

    /// Prompt template name
    #[arg(long, default_value = "baseline")]
    pub prompt: String,

    /// Re-evaluate even when a cached result exists
    #[arg(long)]
    pub force: bool,

    /// Evaluate original proposals only, skip variants
    #[arg(long)]
    pub originals_only: bool,

    /// Per-item deadline in seconds, covering retries and backoff
    #[arg(long, default_value_t = 120)]
    pub timeout_secs: u64,

    /// Daily spend threshold in cents
    #[arg(long, default_value_t = DEFAULT_DAILY_BUDGET_CENTS)]
    pub budget_cents: f64,
}

#[derive(Args, Debug)]
pub struct StatsArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Model whose evaluations to analyze
    #[arg(long, default_value = "claude-sonnet")]
    pub model: String,

    /// Prompt whose evaluations to analyze
    #[arg(long, default_value = "baseline")]
    pub prompt: String,

    /// Compare every prompt with cached data instead of one report
    #[arg(long)]
    pub compare_prompts: bool,

    /// Write the markdown summary table to this path
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct PromptsArgs {
    #[command(flatten)]
    pub common: CommonArgs,
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
    fn batch_defaults() {
        let cli = Cli::try_parse_from(["proxyprobe", "batch"]).unwrap();
        match cli.cmd {
            Command::Batch(args) => {
                assert_eq!(args.model, "claude-sonnet");
                assert_eq!(args.prompt, "baseline");
                assert!(!args.force);
                assert_eq!(args.budget_cents, DEFAULT_DAILY_BUDGET_CENTS);
            }
            _ => panic!("expected batch"),
        }
    }
}
