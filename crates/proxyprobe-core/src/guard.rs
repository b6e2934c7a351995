//! Rate and budget gating for provider-reaching evaluations.
//!
//! Two independent gates, both consulted before a provider call: a per-session
//! call quota and a process-wide daily spend threshold. Cache hits never reach
//! this layer, so they cost nothing in either dimension. Denials are values
//! with presentable reasons, not errors.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::storage::CostLedger;

pub const MAX_SESSION_EVALUATIONS: u32 = 10;
pub const MAX_PROPOSAL_CHARS: usize = 5_000;
pub const DEFAULT_DAILY_BUDGET_CENTS: f64 = 500.0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allowed,
    Denied { reason: String },
}

impl GuardDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, GuardDecision::Allowed)
    }
}

pub struct RateBudgetGuard {
    ledger: CostLedger,
    budget_cents: f64,
    sessions: Mutex<HashMap<String, u32>>,
}

impl RateBudgetGuard {
    pub fn new(ledger: CostLedger, budget_cents: f64) -> Self {
        Self {
            ledger,
            budget_cents,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Input-side validation, applied before any cache lookup or provider call.
    pub fn validate_input(text: &str) -> GuardDecision {
        let len = text.chars().count();
        if len > MAX_PROPOSAL_CHARS {
            GuardDecision::Denied {
                reason: format!("input too long ({len} chars, max {MAX_PROPOSAL_CHARS})"),
            }
        } else {
            GuardDecision::Allowed
        }
    }

    /// Checks the daily budget. The gate checks spend so far, not spend
    /// including the upcoming call: a call that pushes past the threshold
    /// still completes, and the next one is denied.
    pub fn check_budget(&self) -> anyhow::Result<GuardDecision> {
        let spent = self.ledger.spent_today()?;
        if spent >= self.budget_cents {
            return Ok(GuardDecision::Denied {
                reason: format!(
                    "daily budget exceeded (${:.2} of ${:.2})",
                    spent / 100.0,
                    self.budget_cents / 100.0
                ),
            });
        }
        Ok(GuardDecision::Allowed)
    }

    /// Checks the per-session call quota. Batch runs carry no session and skip
    /// this gate; the daily budget still applies to them.
    pub fn check_session(&self, session_id: &str) -> GuardDecision {
        let sessions = self.sessions.lock().unwrap();
        let count = sessions.get(session_id).copied().unwrap_or(0);
        if count >= MAX_SESSION_EVALUATIONS {
            return GuardDecision::Denied {
                reason: format!("session limit reached ({MAX_SESSION_EVALUATIONS} evaluations)"),
            };
        }
        GuardDecision::Allowed
    }

    /// Both gates in order: budget first, then the session quota.
    pub fn check(&self, session_id: &str) -> anyhow::Result<GuardDecision> {
        match self.check_budget()? {
            denied @ GuardDecision::Denied { .. } => Ok(denied),
            GuardDecision::Allowed => Ok(self.check_session(session_id)),
        }
    }

    /// Records one provider-reaching call against the session quota.
    pub fn record_provider_call(&self, session_id: &str) {
        let mut sessions = self.sessions.lock().unwrap();
        *sessions.entry(session_id.to_string()).or_insert(0) += 1;
    }

    pub fn session_remaining(&self, session_id: &str) -> u32 {
        let sessions = self.sessions.lock().unwrap();
        MAX_SESSION_EVALUATIONS.saturating_sub(sessions.get(session_id).copied().unwrap_or(0))
    }

    /// Ledger update for a completed provider call, success or failure; cost
    /// was incurred either way.
    pub fn record_cost(&self, cents: f64) -> anyhow::Result<f64> {
        self.ledger.add_cost(cents)
    }

    pub fn ledger(&self) -> &CostLedger {
        &self.ledger
    }
}
