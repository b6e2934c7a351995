//! Scriptable in-process client for tests and offline demo runs.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::{LlmClient, ProviderError, ProviderResponse, Usage};

const DEFAULT_RESPONSE: &str = "SUMMARY: The proposal asks the company to publish a report.\n\n\
RECOMMENDATION: FOR\n\n\
RATIONALE: Disclosure improves accountability at modest cost.";

pub struct FakeClient {
    model: String,
    scripted: Mutex<Vec<Result<String, ProviderError>>>,
    fixed_response: Option<String>,
    usage: Option<Usage>,
    delay: Option<Duration>,
    calls: AtomicU32,
}

impl FakeClient {
    pub fn new(model: String) -> Self {
        Self {
            model,
            scripted: Mutex::new(Vec::new()),
            fixed_response: None,
            usage: Some(Usage {
                input_tokens: 500,
                output_tokens: 120,
            }),
            delay: None,
            calls: AtomicU32::new(0),
        }
    }

    pub fn with_response(mut self, response: impl Into<String>) -> Self {
        self.fixed_response = Some(response.into());
        self
    }

    /// Queues outcomes consumed in order before falling back to the fixed or
    /// default response.
    pub fn with_script(self, outcomes: Vec<Result<String, ProviderError>>) -> Self {
        *self.scripted.lock().unwrap() = outcomes;
        self
    }

    pub fn without_usage(mut self) -> Self {
        self.usage = None;
        self
    }

    /// Stalls every `complete` call, for tests exercising concurrency and
    /// deadline behavior.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of completed `complete` calls; lets tests assert cache hits made
    /// no provider call.
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmClient for FakeClient {
    async fn complete(&self, _prompt: &str) -> Result<ProviderResponse, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let next = {
            let mut scripted = self.scripted.lock().unwrap();
            if scripted.is_empty() {
                None
            } else {
                Some(scripted.remove(0))
            }
        };

        let text = match next {
            Some(Ok(text)) => text,
            Some(Err(err)) => return Err(err),
            None => self
                .fixed_response
                .clone()
                .unwrap_or_else(|| DEFAULT_RESPONSE.to_string()),
        };

        Ok(ProviderResponse {
            text,
            model: self.model.clone(),
            usage: self.usage,
        })
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }
}
