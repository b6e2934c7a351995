//! Agreement between model verdicts and advisor ground truth.

use std::collections::{BTreeMap, HashMap};

use proxyprobe_core::model::{
    AdversarialVariant, Advisor, Category, Evaluation, Proposal, SubjectKind,
};

use crate::rate::RateValue;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryAgreement {
    pub total: usize,
    pub agreed: usize,
}

impl CategoryAgreement {
    pub fn rate(&self) -> RateValue {
        RateValue::from_counts(self.agreed, self.total)
    }
}

#[derive(Debug, Clone, Default)]
pub struct AgreementStats {
    pub total: usize,
    pub agreed: usize,
    pub by_category: BTreeMap<Category, CategoryAgreement>,
}

impl AgreementStats {
    pub fn rate(&self) -> RateValue {
        RateValue::from_counts(self.agreed, self.total)
    }
}

/// Agreement rate between original-proposal evaluations and one advisor.
///
/// A proposal with no recommendation from the advisor is excluded from both
/// numerator and denominator; absence of ground truth is not disagreement.
pub fn agreement(
    evaluations: &[Evaluation],
    proposals: &[Proposal],
    advisor: Advisor,
    model: &str,
    prompt_version: &str,
) -> AgreementStats {
    let by_id: HashMap<&str, &Proposal> = proposals.iter().map(|p| (p.id.as_str(), p)).collect();

    let mut stats = AgreementStats::default();
    for eval in crate::filter_evaluations(evaluations, model, prompt_version) {
        if eval.subject_kind != SubjectKind::Original {
            continue;
        }
        let Some(proposal) = by_id.get(eval.subject_id.as_str()) else {
            continue;
        };
        let Some(advisor_rec) = proposal.advisor_recommendation(advisor) else {
            continue;
        };

        stats.total += 1;
        let slot = stats.by_category.entry(proposal.category).or_default();
        slot.total += 1;
        if eval.verdict == advisor_rec {
            stats.agreed += 1;
            slot.agreed += 1;
        }
    }
    stats
}

/// Agreement restricted to variant evaluations, compared against the advisor
/// position on the variant's *original* proposal. Ground truth does not move
/// under a substance-preserving rewrite.
pub fn post_attack_agreement(
    evaluations: &[Evaluation],
    variants: &[AdversarialVariant],
    proposals: &[Proposal],
    advisor: Advisor,
    model: &str,
    prompt_version: &str,
) -> AgreementStats {
    let proposal_by_id: HashMap<&str, &Proposal> =
        proposals.iter().map(|p| (p.id.as_str(), p)).collect();
    let variant_by_id: HashMap<&str, &AdversarialVariant> =
        variants.iter().map(|v| (v.id.as_str(), v)).collect();

    let mut stats = AgreementStats::default();
    for eval in crate::filter_evaluations(evaluations, model, prompt_version) {
        if eval.subject_kind != SubjectKind::Variant {
            continue;
        }
        let Some(variant) = variant_by_id.get(eval.subject_id.as_str()) else {
            continue;
        };
        let Some(proposal) = proposal_by_id.get(variant.original_proposal_id.as_str()) else {
            continue;
        };
        let Some(advisor_rec) = proposal.advisor_recommendation(advisor) else {
            continue;
        };

        stats.total += 1;
        let slot = stats.by_category.entry(proposal.category).or_default();
        slot.total += 1;
        if eval.verdict == advisor_rec {
            stats.agreed += 1;
            slot.agreed += 1;
        }
    }
    stats
}
