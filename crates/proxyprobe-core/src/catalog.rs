//! Read-only catalog of proposals and adversarial variants.
//!
//! The catalog is loaded once per process from `proposals.json` / `variants.json`.
//! Integrity violations (a variant pointing at an unknown proposal, or one that
//! claims to change substance) are detected here: the offending record is logged
//! and dropped so it can never leak into aggregate statistics.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use anyhow::Context;
use tracing::{info, warn};

use crate::model::{AdversarialVariant, Proposal};

/// A data-integrity violation detected while loading the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogViolation {
    UnknownProposal {
        variant_id: String,
        original_proposal_id: String,
    },
    ChangesSubstance {
        variant_id: String,
    },
}

impl fmt::Display for CatalogViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogViolation::UnknownProposal {
                variant_id,
                original_proposal_id,
            } => write!(
                f,
                "variant '{}' references unknown proposal '{}'",
                variant_id, original_proposal_id
            ),
            CatalogViolation::ChangesSubstance { variant_id } => write!(
                f,
                "variant '{}' has changes_substance=true, substance-preserving invariant broken",
                variant_id
            ),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub proposals: Vec<Proposal>,
    pub variants: Vec<AdversarialVariant>,
}

impl Catalog {
    /// Builds a catalog from already-deserialized parts, dropping every variant
    /// that violates an invariant. Violations are returned so batch tooling can
    /// report them; the surviving records are safe for analysis.
    pub fn from_parts(
        proposals: Vec<Proposal>,
        variants: Vec<AdversarialVariant>,
    ) -> (Self, Vec<CatalogViolation>) {
        let known: HashMap<&str, ()> = proposals.iter().map(|p| (p.id.as_str(), ())).collect();

        let mut violations = Vec::new();
        let mut kept = Vec::with_capacity(variants.len());
        for v in variants {
            if !known.contains_key(v.original_proposal_id.as_str()) {
                violations.push(CatalogViolation::UnknownProposal {
                    variant_id: v.id.clone(),
                    original_proposal_id: v.original_proposal_id.clone(),
                });
                continue;
            }
            if v.changes_substance {
                violations.push(CatalogViolation::ChangesSubstance {
                    variant_id: v.id.clone(),
                });
                continue;
            }
            kept.push(v);
        }

        (
            Catalog {
                proposals,
                variants: kept,
            },
            violations,
        )
    }

    /// Loads `proposals.json` and `variants.json` from `data_dir`. Missing files
    /// load as empty collections; malformed JSON is an error.
    pub fn load(data_dir: &Path) -> anyhow::Result<Self> {
        let proposals: Vec<Proposal> = load_json(&data_dir.join("proposals.json"))?;
        let variants: Vec<AdversarialVariant> = load_json(&data_dir.join("variants.json"))?;

        let (catalog, violations) = Self::from_parts(proposals, variants);
        for violation in &violations {
            warn!(%violation, "skipping catalog record");
        }
        info!(
            proposals = catalog.proposals.len(),
            variants = catalog.variants.len(),
            skipped = violations.len(),
            "catalog loaded"
        );
        Ok(catalog)
    }

    pub fn proposal(&self, id: &str) -> Option<&Proposal> {
        self.proposals.iter().find(|p| p.id == id)
    }

    pub fn variant(&self, id: &str) -> Option<&AdversarialVariant> {
        self.variants.iter().find(|v| v.id == id)
    }

    pub fn variants_for(&self, proposal_id: &str) -> Vec<&AdversarialVariant> {
        self.variants
            .iter()
            .filter(|v| v.original_proposal_id == proposal_id)
            .collect()
    }
}

fn load_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AttackType, Category};

    fn proposal(id: &str) -> Proposal {
        Proposal {
            id: id.into(),
            title: "Report on climate lobbying".into(),
            text: "Resolved: shareholders request a report.".into(),
            category: Category::Climate,
            company: None,
            ticker: None,
            year: 2025,
            iss_recommendation: None,
            glass_lewis_recommendation: None,
            vote_result_pct: None,
            source_url: "https://example.com".into(),
        }
    }

    fn variant(id: &str, original: &str, changes_substance: bool) -> AdversarialVariant {
        AdversarialVariant {
            id: id.into(),
            original_proposal_id: original.into(),
            attack_type: AttackType::Framing,
            text: "Reframed text".into(),
            description: "softened framing".into(),
            changes_substance,
        }
    }

    #[test]
    fn variant_with_unknown_proposal_is_dropped_and_reported() {
        let (catalog, violations) = Catalog::from_parts(
            vec![proposal("p-1")],
            vec![variant("v-1", "p-1", false), variant("v-2", "p-missing", false)],
        );
        assert_eq!(catalog.variants.len(), 1);
        assert_eq!(
            violations,
            vec![CatalogViolation::UnknownProposal {
                variant_id: "v-2".into(),
                original_proposal_id: "p-missing".into(),
            }]
        );
    }

    #[test]
    fn substance_changing_variant_is_dropped() {
        let (catalog, violations) =
            Catalog::from_parts(vec![proposal("p-1")], vec![variant("v-1", "p-1", true)]);
        assert!(catalog.variants.is_empty());
        assert_eq!(
            violations,
            vec![CatalogViolation::ChangesSubstance {
                variant_id: "v-1".into()
            }]
        );
    }

    #[test]
    fn load_tolerates_missing_files_and_reads_present_ones() {
        let dir = tempfile::tempdir().unwrap();

        // Nothing seeded: both collections load empty.
        let empty = Catalog::load(dir.path()).unwrap();
        assert!(empty.proposals.is_empty());
        assert!(empty.variants.is_empty());

        std::fs::write(
            dir.path().join("proposals.json"),
            serde_json::to_string(&vec![proposal("p-1")]).unwrap(),
        )
        .unwrap();
        let catalog = Catalog::load(dir.path()).unwrap();
        assert_eq!(catalog.proposals.len(), 1);
        assert!(catalog.variants.is_empty());

        std::fs::write(dir.path().join("variants.json"), "not json").unwrap();
        assert!(Catalog::load(dir.path()).is_err());
    }

    #[test]
    fn clean_catalog_has_no_violations() {
        let (catalog, violations) = Catalog::from_parts(
            vec![proposal("p-1"), proposal("p-2")],
            vec![variant("v-1", "p-1", false)],
        );
        assert!(violations.is_empty());
        assert_eq!(catalog.variants_for("p-1").len(), 1);
        assert!(catalog.variants_for("p-2").is_empty());
        assert!(catalog.proposal("p-2").is_some());
        assert!(catalog.variant("v-1").is_some());
    }
}
