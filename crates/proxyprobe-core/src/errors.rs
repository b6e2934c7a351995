//! Error taxonomy for the evaluation pipeline.
//!
//! Quota/budget denials are deliberately values (`GuardDecision::Denied`), not
//! errors; they only become `EvalError::Denied` at the evaluator boundary so
//! callers get one result type.

use std::time::Duration;

use crate::parser::ParseError;
use crate::providers::llm::ProviderError;

#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    /// Input-side validation, rejected before any cache or provider work.
    #[error("input too long ({len} chars, max {max})")]
    InputTooLong { len: usize, max: usize },

    #[error("unknown prompt template '{name}' (available: {available})")]
    UnknownPrompt { name: String, available: String },

    /// Quota or budget denial. The reason is presentable verbatim.
    #[error("evaluation denied: {reason}")]
    Denied { reason: String },

    /// The provider answered but no verdict could be extracted. The response
    /// is carried for the caller to retry-with-repair or file for review;
    /// nothing was persisted.
    #[error("unparseable response from model '{model}': {source}")]
    Unparseable {
        model: String,
        raw_response: String,
        #[source]
        source: ParseError,
    },

    /// Transient provider failures exhausted the retry budget. Never cached,
    /// so a later attempt starts fresh.
    #[error("provider unavailable after {attempts} attempts: {source}")]
    ProviderUnavailable {
        attempts: u32,
        #[source]
        source: ProviderError,
    },

    /// Non-transient provider rejection (auth, malformed request). Not retried.
    #[error("provider rejected request: {0}")]
    ProviderFatal(#[source] ProviderError),

    /// Caller-supplied deadline elapsed while waiting on the provider or on a
    /// retry backoff.
    #[error("evaluation timed out after {0:?}")]
    TimedOut(Duration),

    #[error("storage error: {0}")]
    Storage(#[source] anyhow::Error),
}
