//! Evaluation orchestration: cache lookup, quota gating, provider call with
//! bounded retries, parsing, persistence, and cost accounting.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::errors::EvalError;
use crate::fingerprint;
use crate::guard::{GuardDecision, RateBudgetGuard, MAX_PROPOSAL_CHARS};
use crate::model::{Evaluation, SubjectKind};
use crate::parser;
use crate::prompt;
use crate::providers::llm::{LlmClient, ProviderResponse};
use crate::providers::pricing;
use crate::storage::Store;

#[derive(Debug, Clone)]
pub struct EvaluatorConfig {
    /// Model selector, e.g. "claude-sonnet". Part of the fingerprint and the
    /// pricing key.
    pub model: String,
    /// Prompt template name; the `prompt_version` tag on every record.
    pub prompt_version: String,
    pub max_attempts: u32,
    pub backoff_base: Duration,
    /// Deadline covering the provider call and any backoff waits. None means
    /// wait indefinitely.
    pub call_timeout: Option<Duration>,
}

impl EvaluatorConfig {
    pub fn new(model: impl Into<String>, prompt_version: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt_version: prompt_version.into(),
            max_attempts: 3,
            backoff_base: Duration::from_millis(500),
            call_timeout: Some(Duration::from_secs(120)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EvalRequest<'a> {
    pub subject_id: &'a str,
    pub subject_kind: SubjectKind,
    pub text: &'a str,
    pub use_cache: bool,
    pub force: bool,
    /// Present on the interactive path; enables quota and budget gating.
    pub session_id: Option<&'a str>,
}

impl<'a> EvalRequest<'a> {
    pub fn batch(subject_id: &'a str, subject_kind: SubjectKind, text: &'a str) -> Self {
        Self {
            subject_id,
            subject_kind,
            text,
            use_cache: true,
            force: false,
            session_id: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EvalOutcome {
    pub evaluation: Evaluation,
    /// True when the result came from the cache with no provider call.
    pub cached: bool,
}

pub struct Evaluator {
    config: EvaluatorConfig,
    store: Store,
    guard: Arc<RateBudgetGuard>,
    client: Arc<dyn LlmClient>,
    inflight: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl Evaluator {
    pub fn new(
        config: EvaluatorConfig,
        store: Store,
        guard: Arc<RateBudgetGuard>,
        client: Arc<dyn LlmClient>,
    ) -> Self {
        Self {
            config,
            store,
            guard,
            client,
            inflight: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    /// Evaluates one subject text. The cache is consulted before any quota or
    /// provider interaction; a hit returns unchanged and consumes nothing.
    pub async fn evaluate(&self, req: EvalRequest<'_>) -> Result<EvalOutcome, EvalError> {
        if let GuardDecision::Denied { .. } = RateBudgetGuard::validate_input(req.text) {
            return Err(EvalError::InputTooLong {
                len: req.text.chars().count(),
                max: MAX_PROPOSAL_CHARS,
            });
        }

        let template = prompt::template(&self.config.prompt_version)?;
        let fp = fingerprint::compute(
            req.text,
            &self.config.prompt_version,
            template,
            &self.config.model,
        );

        if req.use_cache && !req.force {
            if let Some(hit) = self.store.get(&fp.hex).map_err(EvalError::Storage)? {
                debug!(subject = req.subject_id, fingerprint = %fp.hex, "cache hit");
                return Ok(EvalOutcome {
                    evaluation: hit,
                    cached: true,
                });
            }
        }

        // At most one outstanding provider call per fingerprint. Best effort
        // under force, where a second writer is allowed to supersede.
        let lock = self.lock_for(&fp.hex);
        let _held = lock.lock().await;

        if req.use_cache && !req.force {
            if let Some(hit) = self.store.get(&fp.hex).map_err(EvalError::Storage)? {
                debug!(subject = req.subject_id, "cache filled while waiting on fingerprint lock");
                return Ok(EvalOutcome {
                    evaluation: hit,
                    cached: true,
                });
            }
        }

        if let GuardDecision::Denied { reason } =
            self.guard.check_budget().map_err(EvalError::Storage)?
        {
            info!(subject = req.subject_id, %reason, "evaluation denied");
            return Err(EvalError::Denied { reason });
        }
        if let Some(session) = req.session_id {
            if let GuardDecision::Denied { reason } = self.guard.check_session(session) {
                info!(session, %reason, "evaluation denied");
                return Err(EvalError::Denied { reason });
            }
        }

        let rendered = prompt::render(template, req.text);
        debug!(
            subject = req.subject_id,
            model = %self.config.model,
            prompt = %self.config.prompt_version,
            "calling provider"
        );

        let call = self.call_with_retry(&rendered);
        let result = match self.config.call_timeout {
            Some(deadline) => tokio::time::timeout(deadline, call)
                .await
                .map_err(|_| EvalError::TimedOut(deadline))?,
            None => call.await,
        };

        // The provider interaction finished (with an answer or a final error),
        // so cost was incurred and the session consumed a call. A timeout above
        // returns early: the call never completed and is not charged.
        let usage = result.as_ref().ok().and_then(|resp| resp.usage);
        let cost_cents =
            pricing::cost_cents(&self.config.model, usage.as_ref(), rendered.chars().count());
        self.guard
            .record_cost(cost_cents)
            .map_err(EvalError::Storage)?;
        if let Some(session) = req.session_id {
            self.guard.record_provider_call(session);
        }

        let response = result?;

        let parsed = parser::parse_judgment(&response.text).map_err(|source| {
            warn!(subject = req.subject_id, %source, "unparseable provider response");
            EvalError::Unparseable {
                model: self.config.model.clone(),
                raw_response: response.text.clone(),
                source,
            }
        })?;

        let evaluation = Evaluation {
            id: format!("eval-{}", &uuid::Uuid::new_v4().simple().to_string()[..8]),
            subject_id: req.subject_id.to_string(),
            subject_kind: req.subject_kind,
            model: self.config.model.clone(),
            prompt_version: self.config.prompt_version.clone(),
            fingerprint: fp.hex.clone(),
            summary: parsed.summary,
            verdict: parsed.verdict,
            rationale: parsed.rationale,
            raw_response: response.text,
            created_at: Utc::now(),
            cost_cents,
        };
        self.store.put(&evaluation).map_err(EvalError::Storage)?;

        info!(
            subject = req.subject_id,
            verdict = evaluation.verdict.as_str(),
            cost_cents,
            "evaluation persisted"
        );

        Ok(EvalOutcome {
            evaluation,
            cached: false,
        })
    }

    /// Evaluates ad-hoc text with no catalog entry, deriving a stable subject
    /// id from the text itself. Used by interactive callers.
    pub async fn evaluate_custom(
        &self,
        text: &str,
        session_id: Option<&str>,
    ) -> Result<EvalOutcome, EvalError> {
        let subject_id = fingerprint::custom_subject_id(text);
        self.evaluate(EvalRequest {
            subject_id: &subject_id,
            subject_kind: SubjectKind::Original,
            text,
            use_cache: true,
            force: false,
            session_id,
        })
        .await
    }

    async fn call_with_retry(&self, rendered: &str) -> Result<ProviderResponse, EvalError> {
        let mut attempt = 0u32;
        let mut delay = self.config.backoff_base;
        loop {
            attempt += 1;
            match self.client.complete(rendered).await {
                Ok(resp) => return Ok(resp),
                Err(err) if err.is_transient() && attempt < self.config.max_attempts => {
                    warn!(attempt, %err, "transient provider failure, backing off");
                    tokio::time::sleep(delay).await;
                    delay = delay.saturating_mul(2);
                }
                Err(err) if err.is_transient() => {
                    return Err(EvalError::ProviderUnavailable {
                        attempts: attempt,
                        source: err,
                    });
                }
                Err(err) => return Err(EvalError::ProviderFatal(err)),
            }
        }
    }

    fn lock_for(&self, fingerprint_hex: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut inflight = self.inflight.lock().unwrap();
        // An entry only the map still references belongs to a completed call;
        // dropping it here keeps the map bounded by in-flight concurrency.
        inflight.retain(|_, lock| Arc::strong_count(lock) > 1);
        inflight
            .entry(fingerprint_hex.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }
}
