use async_trait::async_trait;
use serde_json::json;

use super::{LlmClient, ProviderError, ProviderResponse, Usage};

const API_URL: &str = "https://api.openai.com/v1/chat/completions";
const MAX_TOKENS: u32 = 1024;

pub struct OpenAiClient {
    pub model: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiClient {
    pub fn new(model: String, api_key: String) -> Self {
        Self {
            model,
            api_key,
            client: reqwest::Client::new(),
        }
    }

    pub fn from_env(model: String) -> anyhow::Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| anyhow::anyhow!("OPENAI_API_KEY is not set"))?;
        Ok(Self::new(model, api_key))
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn complete(&self, prompt: &str) -> Result<ProviderResponse, ProviderError> {
        let body = json!({
            "model": self.model,
            "max_tokens": MAX_TOKENS,
            "messages": [{ "role": "user", "content": prompt }],
        });

        let resp = self
            .client
            .post(API_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(ProviderError::from_reqwest)?;

        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            return Err(ProviderError::from_status(status.as_u16(), detail));
        }

        let json: serde_json::Value = resp.json().await.map_err(ProviderError::from_reqwest)?;

        let text = json
            .pointer("/choices/0/message/content")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ProviderError::Malformed("response missing message content".into()))?
            .to_string();

        let usage = json.pointer("/usage").map(|u| Usage {
            input_tokens: u
                .pointer("/prompt_tokens")
                .and_then(|v| v.as_u64())
                .unwrap_or(0),
            output_tokens: u
                .pointer("/completion_tokens")
                .and_then(|v| v.as_u64())
                .unwrap_or(0),
        });

        Ok(ProviderResponse {
            text,
            model: self.model.clone(),
            usage,
        })
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }
}
