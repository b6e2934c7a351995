//! Rendering of the analysis into markdown and plain text. Everything here
//! returns a `String`; the caller decides whether it goes to stdout or a file.

use std::collections::HashMap;
use std::fmt::Write as _;

use proxyprobe_core::model::{AdversarialVariant, Advisor, Evaluation, Proposal};

use crate::agreement::{agreement, post_attack_agreement};
use crate::flips::{flip_details, flip_rate};

fn title_case_attack(attack: &str) -> String {
    attack
        .split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Two-column markdown metric table for one model/prompt combination.
pub fn summary_table(
    evaluations: &[Evaluation],
    proposals: &[Proposal],
    variants: &[AdversarialVariant],
    model: &str,
    prompt_version: &str,
) -> String {
    if proposals.is_empty() || evaluations.is_empty() {
        return "No data available. Run a batch evaluation first.".to_string();
    }

    let iss = agreement(evaluations, proposals, Advisor::Iss, model, prompt_version);
    let gl = agreement(
        evaluations,
        proposals,
        Advisor::GlassLewis,
        model,
        prompt_version,
    );
    let flips = flip_rate(evaluations, variants, model, prompt_version);
    let post_iss = post_attack_agreement(
        evaluations,
        variants,
        proposals,
        Advisor::Iss,
        model,
        prompt_version,
    );

    let mut lines = vec![
        "| Metric | Value |".to_string(),
        "|--------|-------|".to_string(),
        format!("| Proposals analyzed | {} |", proposals.len()),
        format!("| Proposals with known ISS position | {} |", iss.total),
        format!("| Proposals with known Glass Lewis position | {} |", gl.total),
        format!("| Baseline agreement with ISS | {} |", iss.rate()),
        format!("| Baseline agreement with Glass Lewis | {} |", gl.rate()),
        format!("| Total adversarial variants | {} |", flips.total),
        format!("| Overall flip rate | {} |", flips.rate()),
    ];
    for (attack, slot) in &flips.by_attack {
        lines.push(format!(
            "| Flip rate: {} | {} |",
            title_case_attack(attack.as_str()),
            slot.rate()
        ));
    }
    lines.push(format!(
        "| Post-attack agreement with ISS | {} |",
        post_iss.rate()
    ));

    lines.join("\n")
}

/// Plain-text report with per-category agreement, per-attack flip rates, and
/// up to three flip case studies.
pub fn detailed_report(
    evaluations: &[Evaluation],
    proposals: &[Proposal],
    variants: &[AdversarialVariant],
    model: &str,
    prompt_version: &str,
) -> String {
    let mut out = String::new();
    let rule = "=".repeat(60);
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "ADVERSARIAL PROPOSAL ANALYSIS REPORT");
    let _ = writeln!(out, "Model: {model}");
    let _ = writeln!(out, "Prompt: {prompt_version}");
    let _ = writeln!(out, "{rule}");

    if proposals.is_empty() {
        let _ = writeln!(out, "\nNo proposals found. Seed the proposal catalog first.");
        return out;
    }
    if crate::filter_evaluations(evaluations, model, prompt_version).is_empty() {
        let _ = writeln!(
            out,
            "\nNo evaluations found for model '{model}' and prompt '{prompt_version}'."
        );
        let mut available: Vec<&str> =
            evaluations.iter().map(|e| e.prompt_version.as_str()).collect();
        available.sort_unstable();
        available.dedup();
        if !available.is_empty() {
            let _ = writeln!(out, "Available prompts with data: {}", available.join(", "));
        }
        return out;
    }

    let _ = writeln!(out, "\nProposals analyzed: {}", proposals.len());
    let _ = writeln!(out, "Variants created: {}", variants.len());

    let iss = agreement(evaluations, proposals, Advisor::Iss, model, prompt_version);
    let gl = agreement(
        evaluations,
        proposals,
        Advisor::GlassLewis,
        model,
        prompt_version,
    );
    let _ = writeln!(out, "\n--- BASELINE AGREEMENT ---");
    let _ = writeln!(out, "\nISS: {}/{} ({})", iss.agreed, iss.total, iss.rate());
    if !iss.by_category.is_empty() {
        let _ = writeln!(out, "  By category:");
        for (category, slot) in &iss.by_category {
            let _ = writeln!(out, "    {}: {}", category.as_str(), slot.rate());
        }
    }
    let _ = writeln!(
        out,
        "\nGlass Lewis: {}/{} ({})",
        gl.agreed,
        gl.total,
        gl.rate()
    );

    let flips = flip_rate(evaluations, variants, model, prompt_version);
    let _ = writeln!(out, "\n--- ADVERSARIAL FLIP RATES ---");
    let _ = writeln!(
        out,
        "\nOverall: {}/{} ({})",
        flips.flipped,
        flips.total,
        flips.rate()
    );
    if !flips.by_attack.is_empty() {
        let _ = writeln!(out, "  By attack type:");
        for (attack, slot) in &flips.by_attack {
            let _ = writeln!(out, "    {}: {}", attack.as_str(), slot.rate());
        }
    }

    let post_iss = post_attack_agreement(
        evaluations,
        variants,
        proposals,
        Advisor::Iss,
        model,
        prompt_version,
    );
    let _ = writeln!(out, "\n--- POST-ATTACK AGREEMENT ---");
    let _ = writeln!(
        out,
        "\nISS agreement after attacks: {}/{} ({})",
        post_iss.agreed,
        post_iss.total,
        post_iss.rate()
    );

    let cases = flip_details(evaluations, variants, model, prompt_version);
    if !cases.is_empty() {
        let proposal_by_id: HashMap<&str, &Proposal> =
            proposals.iter().map(|p| (p.id.as_str(), p)).collect();
        let variant_by_id: HashMap<&str, &AdversarialVariant> =
            variants.iter().map(|v| (v.id.as_str(), v)).collect();

        let _ = writeln!(out, "\n--- FLIP CASE STUDIES ---");
        for (i, case) in cases.iter().take(3).enumerate() {
            let title = proposal_by_id
                .get(case.original_proposal_id.as_str())
                .map(|p| p.title.as_str())
                .unwrap_or(case.original_proposal_id.as_str());
            let company = proposal_by_id
                .get(case.original_proposal_id.as_str())
                .and_then(|p| p.company.as_deref())
                .unwrap_or("unknown company");
            let _ = writeln!(out, "\n{}. {} ({})", i + 1, title, company);
            let _ = writeln!(out, "   Attack: {}", case.attack_type.as_str());
            let _ = writeln!(
                out,
                "   {} -> {}",
                case.original_verdict.as_str(),
                case.variant_verdict.as_str()
            );
            if let Some(variant) = variant_by_id.get(case.variant_id.as_str()) {
                let description: String = variant.description.chars().take(100).collect();
                let _ = writeln!(out, "   Description: {description}...");
            }
        }
    }

    let _ = writeln!(out, "\n{rule}");
    out
}

/// One row per prompt that has cached evaluations for `model`, so prompt
/// variants can be compared side by side.
pub fn compare_prompts(
    evaluations: &[Evaluation],
    proposals: &[Proposal],
    variants: &[AdversarialVariant],
    prompt_versions: &[String],
    model: &str,
) -> String {
    if evaluations.is_empty() {
        return "No evaluations found.".to_string();
    }
    if prompt_versions.is_empty() {
        return "No prompts with cached evaluations found.".to_string();
    }

    let mut lines = vec![
        "# Prompt Comparison".to_string(),
        String::new(),
        format!("*Model: {model}*"),
        String::new(),
        "| Prompt | ISS Agreement | GL Agreement | Flip Rate | Post-Attack ISS |".to_string(),
        "|--------|---------------|--------------|-----------|-----------------|".to_string(),
    ];

    for prompt_version in prompt_versions {
        if crate::filter_evaluations(evaluations, model, prompt_version).is_empty() {
            continue;
        }
        let iss = agreement(evaluations, proposals, Advisor::Iss, model, prompt_version);
        let gl = agreement(
            evaluations,
            proposals,
            Advisor::GlassLewis,
            model,
            prompt_version,
        );
        let flips = flip_rate(evaluations, variants, model, prompt_version);
        let post_iss = post_attack_agreement(
            evaluations,
            variants,
            proposals,
            Advisor::Iss,
            model,
            prompt_version,
        );
        lines.push(format!(
            "| {} | {} | {} | {} | {} |",
            prompt_version,
            iss.rate(),
            gl.rate(),
            flips.rate(),
            post_iss.rate()
        ));
    }

    lines.join("\n")
}
