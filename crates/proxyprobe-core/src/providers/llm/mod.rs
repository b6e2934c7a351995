//! Provider capability: given a rendered prompt, return free text plus any
//! usage metadata the provider reports. The evaluator is agnostic to which
//! concrete provider backs this trait.

pub mod anthropic;
pub mod fake;
pub mod openai;

pub use anthropic::AnthropicClient;
pub use fake::FakeClient;
pub use openai::OpenAiClient;

use async_trait::async_trait;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

#[derive(Debug, Clone)]
pub struct ProviderResponse {
    pub text: String,
    pub model: String,
    /// None when the provider reports no usage; cost is then estimated from
    /// the prompt length.
    pub usage: Option<Usage>,
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("provider request timed out")]
    Timeout,

    #[error("provider rate limited (status {status})")]
    RateLimited { status: u16 },

    #[error("provider server error (status {status}): {detail}")]
    Server { status: u16, detail: String },

    #[error("network error: {0}")]
    Network(String),

    /// Authentication failures, malformed requests, unknown models. Retrying
    /// cannot help.
    #[error("provider rejected request (status {status}): {detail}")]
    Rejected { status: u16, detail: String },

    #[error("malformed provider response: {0}")]
    Malformed(String),
}

impl ProviderError {
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ProviderError::Timeout
                | ProviderError::RateLimited { .. }
                | ProviderError::Server { .. }
                | ProviderError::Network(_)
        )
    }

    /// Classifies an HTTP status into the retry taxonomy.
    pub fn from_status(status: u16, detail: String) -> Self {
        match status {
            408 => ProviderError::Timeout,
            429 => ProviderError::RateLimited { status },
            s if s >= 500 => ProviderError::Server { status, detail },
            s => ProviderError::Rejected { status: s, detail },
        }
    }

    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout
        } else if let Some(status) = err.status() {
            Self::from_status(status.as_u16(), err.to_string())
        } else {
            ProviderError::Network(err.to_string())
        }
    }
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<ProviderResponse, ProviderError>;

    fn provider_name(&self) -> &'static str;
}
