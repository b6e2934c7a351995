pub mod llm;
pub mod pricing;

use std::sync::Arc;

use llm::{AnthropicClient, FakeClient, LlmClient, OpenAiClient};

/// Maps a user-facing model selector to a concrete client.
///
/// Credentials come from the conventional environment variables; a missing key
/// is reported up front rather than on the first call.
pub fn client_for_selector(selector: &str) -> anyhow::Result<Arc<dyn LlmClient>> {
    match selector {
        "claude-sonnet" => Ok(Arc::new(AnthropicClient::from_env(
            "claude-sonnet-4-20250514".to_string(),
        )?)),
        "gpt-4o" => Ok(Arc::new(OpenAiClient::from_env("gpt-4o".to_string())?)),
        "fake" => Ok(Arc::new(FakeClient::new("fake".to_string()))),
        other => anyhow::bail!(
            "unknown model selector '{}' (available: claude-sonnet, gpt-4o, fake)",
            other
        ),
    }
}

pub fn available_selectors() -> &'static [&'static str] {
    &["claude-sonnet", "gpt-4o", "fake"]
}
