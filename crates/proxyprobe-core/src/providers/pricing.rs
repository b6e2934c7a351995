//! Cost accounting in minor currency units (cents).
//!
//! When a provider reports token usage, the cost is exact per the pricing
//! table. When it does not, the estimate is length-proportional: prompt chars
//! divided by four as input tokens plus a flat 300 output tokens. The formula
//! is deliberately simple and covered by tests so the budget gate stays
//! predictable.

use super::llm::Usage;

const FALLBACK_CHARS_PER_TOKEN: usize = 4;
const FALLBACK_OUTPUT_TOKENS: u64 = 300;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pricing {
    pub input_cents_per_kilotoken: f64,
    pub output_cents_per_kilotoken: f64,
}

pub fn pricing_for(selector: &str) -> Pricing {
    match selector {
        // Claude Sonnet: $3/M input, $15/M output.
        "claude-sonnet" => Pricing {
            input_cents_per_kilotoken: 0.3,
            output_cents_per_kilotoken: 1.5,
        },
        // GPT-4o: $2.5/M input, $10/M output.
        "gpt-4o" => Pricing {
            input_cents_per_kilotoken: 0.25,
            output_cents_per_kilotoken: 1.0,
        },
        // Unknown selectors get the more expensive table so estimates err high.
        _ => Pricing {
            input_cents_per_kilotoken: 0.3,
            output_cents_per_kilotoken: 1.5,
        },
    }
}

pub fn cost_cents(selector: &str, usage: Option<&Usage>, prompt_chars: usize) -> f64 {
    let pricing = pricing_for(selector);
    let (input_tokens, output_tokens) = match usage {
        Some(u) => (u.input_tokens, u.output_tokens),
        None => (
            (prompt_chars / FALLBACK_CHARS_PER_TOKEN) as u64,
            FALLBACK_OUTPUT_TOKENS,
        ),
    };
    (input_tokens as f64 * pricing.input_cents_per_kilotoken
        + output_tokens as f64 * pricing.output_cents_per_kilotoken)
        / 1000.0
}
