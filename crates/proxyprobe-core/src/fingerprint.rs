use sha2::{Digest, Sha256};

#[derive(Debug, Clone)]
pub struct Fingerprint {
    pub hex: String,
    pub components: Vec<String>,
}

pub fn sha256_hex(s: &str) -> String {
    let mut h = Sha256::new();
    h.update(s.as_bytes());
    hex::encode(h.finalize())
}

/// Computes the deterministic cache key for one evaluation.
///
/// The key covers the subject text, the prompt template (name and body, so
/// editing a template invalidates its cached judgments) and the model
/// identifier. Changing any one component changes the key.
pub fn compute(text: &str, prompt_version: &str, prompt_template: &str, model: &str) -> Fingerprint {
    let mut parts = Vec::new();

    parts.push(format!("model={model}"));
    parts.push(format!("prompt_version={prompt_version}"));
    parts.push(format!("prompt_template={prompt_template}"));
    parts.push(format!("text={text}"));

    let raw = parts.join("\n");
    let hex = sha256_hex(&raw);

    Fingerprint {
        hex,
        components: parts,
    }
}

/// Stable subject id for ad-hoc text that has no catalog entry.
pub fn custom_subject_id(text: &str) -> String {
    format!("custom-{}", &sha256_hex(text)[..12])
}
