//! Tolerant extraction of a structured judgment from free-text model output.
//!
//! Providers are asked for three labeled sections (SUMMARY / RECOMMENDATION /
//! RATIONALE) but routinely vary casing, reorder sections, or wrap them in
//! commentary. The parser accepts all of that. What it never does is invent a
//! verdict: if no recognizable recommendation token exists, parsing fails with
//! a distinct error and nothing gets persisted.

use std::sync::OnceLock;

use regex::Regex;

use crate::model::Verdict;

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedJudgment {
    pub summary: String,
    pub verdict: Verdict,
    pub rationale: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("no recognizable recommendation token (FOR/AGAINST/ABSTAIN) in response")]
    NoVerdict,
}

fn summary_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?is)SUMMARY:\s*(.+?)(?:RECOMMENDATION:|RATIONALE:|$)")
            .expect("summary regex")
    })
}

fn recommendation_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)RECOMMENDATION:\s*\**\s*(FOR|AGAINST|ABSTAIN)\b")
            .expect("recommendation regex")
    })
}

fn rationale_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)RATIONALE:\s*(.+)$").expect("rationale regex"))
}

/// Parses raw provider output into a normalized judgment.
///
/// A missing summary or rationale degrades to an empty string; a missing
/// verdict token is a hard failure.
pub fn parse_judgment(raw: &str) -> Result<ParsedJudgment, ParseError> {
    let verdict = recommendation_re()
        .captures(raw)
        .and_then(|c| c.get(1))
        .and_then(|m| Verdict::parse(m.as_str()))
        .ok_or(ParseError::NoVerdict)?;

    let summary = summary_re()
        .captures(raw)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default();

    let rationale = rationale_re()
        .captures(raw)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default();

    Ok(ParsedJudgment {
        summary,
        verdict,
        rationale,
    })
}
