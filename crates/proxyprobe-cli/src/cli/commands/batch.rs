//! Batch evaluation of the whole catalog. Per-item failures are printed and
//! tallied rather than aborting the run; the exit code reports them at the end.

use std::sync::Arc;
use std::time::Duration;

use proxyprobe_core::catalog::Catalog;
use proxyprobe_core::evaluator::{EvalRequest, Evaluator, EvaluatorConfig};
use proxyprobe_core::guard::RateBudgetGuard;
use proxyprobe_core::model::SubjectKind;
use proxyprobe_core::providers::client_for_selector;
use proxyprobe_core::storage::{CostLedger, Store};

use crate::cli::args::BatchArgs;
use crate::exit_codes::{EXIT_FAILURE, EXIT_SUCCESS};

#[derive(Default)]
struct Tally {
    evaluated: u32,
    cached: u32,
    failed: u32,
}

pub async fn run(args: BatchArgs) -> anyhow::Result<i32> {
    let catalog = Catalog::load(&args.common.data_dir)?;
    if catalog.proposals.is_empty() {
        eprintln!(
            "no proposals found in {}",
            args.common.data_dir.join("proposals.json").display()
        );
        eprintln!("seed the catalog before running a batch evaluation");
        return Ok(EXIT_FAILURE);
    }

    let store = Store::open(&args.common.db)?;
    store.init_schema()?;
    let guard = Arc::new(RateBudgetGuard::new(
        CostLedger::new(&store),
        args.budget_cents,
    ));
    let client = client_for_selector(&args.model)?;
    let mut config = EvaluatorConfig::new(args.model.clone(), args.prompt.clone());
    config.call_timeout = Some(Duration::from_secs(args.timeout_secs));
    tracing::debug!(
        model = %args.model,
        prompt = %args.prompt,
        timeout_secs = args.timeout_secs,
        budget_cents = args.budget_cents,
        "batch configuration"
    );
    let evaluator = Evaluator::new(config, store.clone(), Arc::clone(&guard), client);

    let rule = "=".repeat(60);
    println!("{rule}");
    println!("BATCH EVALUATION");
    println!("Model: {}", args.model);
    println!("Prompt: {}", args.prompt);
    println!("Force re-evaluation: {}", args.force);
    println!("{rule}");

    println!(
        "\nFound {} proposals and {} variants",
        catalog.proposals.len(),
        catalog.variants.len()
    );
    let spend_before = guard.ledger().spent_today()?;
    println!("Starting spend today: ${:.2}", spend_before / 100.0);

    let mut tally = Tally::default();

    println!("\n--- EVALUATING ORIGINAL PROPOSALS ---");
    for proposal in &catalog.proposals {
        evaluate_item(
            &evaluator,
            &store,
            &args,
            &proposal.id,
            SubjectKind::Original,
            &proposal.text,
            &mut tally,
        )
        .await;
    }

    if args.originals_only {
        println!("\n(skipping variants)");
    } else {
        println!("\n--- EVALUATING ADVERSARIAL VARIANTS ---");
        for variant in &catalog.variants {
            evaluate_item(
                &evaluator,
                &store,
                &args,
                &variant.id,
                SubjectKind::Variant,
                &variant.text,
                &mut tally,
            )
            .await;
        }
    }

    let spend_after = guard.ledger().spent_today()?;
    println!("\n{rule}");
    println!("BATCH EVALUATION COMPLETE");
    println!("Evaluated: {}", tally.evaluated);
    println!("Cached: {}", tally.cached);
    println!("Failed: {}", tally.failed);
    println!("Ending spend today: ${:.2}", spend_after / 100.0);
    println!("{rule}");

    Ok(if tally.failed > 0 {
        EXIT_FAILURE
    } else {
        EXIT_SUCCESS
    })
}

async fn evaluate_item(
    evaluator: &Evaluator,
    store: &Store,
    args: &BatchArgs,
    subject_id: &str,
    kind: SubjectKind,
    text: &str,
    tally: &mut Tally,
) {
    // Subject-level cache probe first, so a catalog text tweak still shows up
    // as cached until --force is passed.
    if !args.force {
        match store.find_by_subject(subject_id, kind, &args.model, &args.prompt) {
            Ok(Some(existing)) => {
                println!("  [cached] {subject_id}: {}", existing.verdict.as_str());
                tally.cached += 1;
                return;
            }
            Ok(None) => {}
            Err(err) => {
                println!("  [error] {subject_id}: {err:#}");
                tally.failed += 1;
                return;
            }
        }
    }

    let req = EvalRequest {
        subject_id,
        subject_kind: kind,
        text,
        use_cache: !args.force,
        force: args.force,
        session_id: None,
    };
    match evaluator.evaluate(req).await {
        Ok(outcome) if outcome.cached => {
            println!("  [cached] {subject_id}: {}", outcome.evaluation.verdict.as_str());
            tally.cached += 1;
        }
        Ok(outcome) => {
            println!("  [done] {subject_id}: {}", outcome.evaluation.verdict.as_str());
            tally.evaluated += 1;
        }
        Err(err) => {
            println!("  [error] {subject_id}: {err}");
            tally.failed += 1;
        }
    }
}
