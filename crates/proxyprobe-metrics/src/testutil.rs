//! Shared fixtures for the metrics tests.

use chrono::Utc;
use proxyprobe_core::model::{
    AdversarialVariant, AttackType, Category, Evaluation, Proposal, SubjectKind, Verdict,
};

pub fn proposal(id: &str, category: Category, iss: Option<Verdict>) -> Proposal {
    Proposal {
        id: id.into(),
        title: format!("Proposal {id}"),
        text: "Resolved: shareholders request a report.".into(),
        category,
        company: Some("Acme Corp".into()),
        ticker: Some("ACME".into()),
        year: 2025,
        iss_recommendation: iss,
        glass_lewis_recommendation: None,
        vote_result_pct: None,
        source_url: format!("https://example.com/{id}"),
    }
}

pub fn variant(id: &str, original: &str) -> AdversarialVariant {
    variant_with_attack(id, original, AttackType::Framing)
}

pub fn variant_with_attack(id: &str, original: &str, attack_type: AttackType) -> AdversarialVariant {
    AdversarialVariant {
        id: id.into(),
        original_proposal_id: original.into(),
        attack_type,
        text: "Reworded proposal text.".into(),
        description: "manipulated framing".into(),
        changes_substance: false,
    }
}

pub fn evaluation(subject_id: &str, kind: SubjectKind, verdict: Verdict) -> Evaluation {
    Evaluation {
        id: format!("eval-{subject_id}-{}", kind.as_str()),
        subject_id: subject_id.into(),
        subject_kind: kind,
        model: "claude-sonnet".into(),
        prompt_version: "baseline".into(),
        fingerprint: format!("fp-{subject_id}-{}", kind.as_str()),
        summary: "summary".into(),
        verdict,
        rationale: "rationale".into(),
        raw_response: "raw".into(),
        created_at: Utc::now(),
        cost_cents: 0.4,
    }
}
