//! Domain model: proposals, adversarial variants, and persisted evaluations.
//!
//! Proposals and variants are owned by the external catalog and read-only here.
//! `Evaluation` is the record the store persists; it must stay loadable when
//! optional fields are appended later, so nothing in here denies unknown fields.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Climate,
    ExecutiveComp,
    BoardDiversity,
    Governance,
    PoliticalSpending,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Climate => "climate",
            Category::ExecutiveComp => "executive_comp",
            Category::BoardDiversity => "board_diversity",
            Category::Governance => "governance",
            Category::PoliticalSpending => "political_spending",
        }
    }
}

/// Normalized voting verdict. The only three values the pipeline ever records.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    For,
    Against,
    Abstain,
}

impl Verdict {
    /// Case-insensitive token match; anything else is not a verdict.
    pub fn parse(token: &str) -> Option<Self> {
        match token.trim().to_ascii_uppercase().as_str() {
            "FOR" => Some(Verdict::For),
            "AGAINST" => Some(Verdict::Against),
            "ABSTAIN" => Some(Verdict::Abstain),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::For => "FOR",
            Verdict::Against => "AGAINST",
            Verdict::Abstain => "ABSTAIN",
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum AttackType {
    Framing,
    BuriedLede,
    InstructionInjection,
}

impl AttackType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttackType::Framing => "framing",
            AttackType::BuriedLede => "buried_lede",
            AttackType::InstructionInjection => "instruction_injection",
        }
    }
}

/// Whether an evaluation targeted an original proposal or an adversarial rewrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubjectKind {
    Original,
    Variant,
}

impl SubjectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubjectKind::Original => "original",
            SubjectKind::Variant => "variant",
        }
    }
}

/// External ground-truth recommender used as a comparison baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Advisor {
    Iss,
    GlassLewis,
}

impl Advisor {
    pub fn as_str(&self) -> &'static str {
        match self {
            Advisor::Iss => "ISS",
            Advisor::GlassLewis => "Glass Lewis",
        }
    }
}

/// A shareholder proposal as filed. Immutable once loaded from the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Proposal {
    pub id: String,
    pub title: String,
    pub text: String,
    pub category: Category,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub ticker: Option<String>,
    pub year: i32,
    #[serde(default)]
    pub iss_recommendation: Option<Verdict>,
    #[serde(default)]
    pub glass_lewis_recommendation: Option<Verdict>,
    #[serde(default)]
    pub vote_result_pct: Option<f64>,
    pub source_url: String,
}

impl Proposal {
    pub fn advisor_recommendation(&self, advisor: Advisor) -> Option<Verdict> {
        match advisor {
            Advisor::Iss => self.iss_recommendation,
            Advisor::GlassLewis => self.glass_lewis_recommendation,
        }
    }
}

/// An adversarial rewrite of a proposal. `changes_substance` must be false:
/// the rewrite may reframe or bury the ask but never alter it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdversarialVariant {
    pub id: String,
    pub original_proposal_id: String,
    pub attack_type: AttackType,
    pub text: String,
    pub description: String,
    #[serde(default)]
    pub changes_substance: bool,
}

/// One persisted model judgment. Write-once per fingerprint; a forced
/// re-evaluation appends a new version and readers see the latest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evaluation {
    pub id: String,
    pub subject_id: String,
    pub subject_kind: SubjectKind,
    pub model: String,
    pub prompt_version: String,
    pub fingerprint: String,
    pub summary: String,
    pub verdict: Verdict,
    pub rationale: String,
    pub raw_response: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub cost_cents: f64,
}
