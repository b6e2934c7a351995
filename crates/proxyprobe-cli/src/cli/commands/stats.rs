use anyhow::Context;

use proxyprobe_core::catalog::Catalog;
use proxyprobe_core::storage::Store;
use proxyprobe_metrics::{compare_prompts, detailed_report, summary_table};

use crate::cli::args::StatsArgs;
use crate::exit_codes::{EXIT_FAILURE, EXIT_SUCCESS};

pub fn run(args: StatsArgs) -> anyhow::Result<i32> {
    let catalog = Catalog::load(&args.common.data_dir)?;
    let store = Store::open(&args.common.db)?;
    store.init_schema()?;

    let evaluations = store.all()?;
    if evaluations.is_empty() {
        eprintln!("no evaluations found in {}", args.common.db.display());
        eprintln!("run `proxyprobe batch` first");
        return Ok(EXIT_FAILURE);
    }

    if args.compare_prompts {
        let prompts = store.prompts_with_data()?;
        println!(
            "{}",
            compare_prompts(
                &evaluations,
                &catalog.proposals,
                &catalog.variants,
                &prompts,
                &args.model,
            )
        );
        return Ok(EXIT_SUCCESS);
    }

    print!(
        "{}",
        detailed_report(
            &evaluations,
            &catalog.proposals,
            &catalog.variants,
            &args.model,
            &args.prompt,
        )
    );

    let table = summary_table(
        &evaluations,
        &catalog.proposals,
        &catalog.variants,
        &args.model,
        &args.prompt,
    );
    match &args.output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)
                        .with_context(|| format!("failed to create {}", parent.display()))?;
                }
            }
            let contents = format!(
                "# Adversarial Proposal Analysis Summary\n\n*Model: {}, Prompt: {}*\n\n{table}\n",
                args.model, args.prompt
            );
            std::fs::write(path, contents)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("\nSummary table written to {}", path.display());
        }
        None => println!("\n{table}"),
    }

    Ok(EXIT_SUCCESS)
}
