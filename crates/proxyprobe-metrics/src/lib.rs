//! Pure analysis over already-persisted evaluations plus the read-only
//! catalog. No I/O happens here; callers hand in the collections.

mod agreement;
mod flips;
mod rate;
mod report;

#[cfg(test)]
mod testutil;

pub use agreement::{agreement, post_attack_agreement, AgreementStats, CategoryAgreement};
pub use flips::{flip_details, flip_rate, AttackFlips, FlipCase, FlipStats};
pub use rate::RateValue;
pub use report::{compare_prompts, detailed_report, summary_table};

use proxyprobe_core::model::Evaluation;

/// Restricts evaluations to one model/prompt combination. Every metric is
/// computed within a single combination; mixing them would double-count
/// subjects evaluated under several prompts.
pub fn filter_evaluations<'a>(
    evaluations: &'a [Evaluation],
    model: &str,
    prompt_version: &str,
) -> Vec<&'a Evaluation> {
    evaluations
        .iter()
        .filter(|e| e.model == model && e.prompt_version == prompt_version)
        .collect()
}
