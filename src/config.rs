//! Model endpoint configuration read from the environment.

use crate::error::{AgentError, Result};
use serde_json::{json, Map, Value};

pub const ENV_API_BASE: &str = "LITELLM_MODEL_API_BASE";
pub const ENV_API_KEY: &str = "LITELLM_MODEL_API_KEY";
pub const ENV_MODEL_NAME: &str = "LITELLM_MODEL_MODEL_NAME";
pub const ENV_SPECIAL_TOKENS: &str = "LITELLM_MODEL_SPECIAL_TOKENS";

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_MODEL: &str = "openai/gpt-4.1-mini";

/// Connection settings for the chat-completions endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelConfig {
    pub api_base: String,
    pub api_key: String,
    pub model_name: String,
    /// When false, requests ask the server to keep special tokens in the output
    pub special_tokens: bool,
}

impl ModelConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_base: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            model_name: DEFAULT_MODEL.to_string(),
            special_tokens: false,
        }
    }

    /// Load `.env` (if present) and read the `LITELLM_MODEL_*` variables.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    ///
    /// Empty values count as unset. `OPENAI_API_KEY` and `OPENAI_BASE_URL`
    /// are accepted as fallbacks.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let api_key = get(ENV_API_KEY).or_else(|| get("OPENAI_API_KEY")).ok_or_else(|| {
            AgentError::Config(format!(
                "{} (or OPENAI_API_KEY) must be set before creating an Agent",
                ENV_API_KEY
            ))
        })?;

        let api_base = get(ENV_API_BASE)
            .or_else(|| get("OPENAI_BASE_URL"))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let model_name = get(ENV_MODEL_NAME).unwrap_or_else(|| DEFAULT_MODEL.to_string());

        Ok(Self {
            api_base,
            api_key,
            model_name,
            special_tokens: get(ENV_SPECIAL_TOKENS).is_some(),
        })
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn with_model_name(mut self, model_name: impl Into<String>) -> Self {
        self.model_name = model_name.into();
        self
    }

    pub fn with_special_tokens(mut self, special_tokens: bool) -> Self {
        self.special_tokens = special_tokens;
        self
    }

    /// Extra top-level fields merged into every request body
    pub fn extra_body(&self) -> Map<String, Value> {
        let mut extra = Map::new();
        if !self.special_tokens {
            extra.insert("skip_special_tokens".to_string(), json!(false));
        }
        extra
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_reads_litellm_variables() {
        let config = ModelConfig::from_lookup(lookup(&[
            (ENV_API_BASE, "http://localhost:4000/v1"),
            (ENV_API_KEY, "sk-local"),
            (ENV_MODEL_NAME, "hosted_vllm/llama-3"),
        ]))
        .unwrap();

        assert_eq!(config.api_base, "http://localhost:4000/v1");
        assert_eq!(config.api_key, "sk-local");
        assert_eq!(config.model_name, "hosted_vllm/llama-3");
        assert!(!config.special_tokens);
        assert_eq!(config.extra_body()["skip_special_tokens"], false);
    }

    #[test]
    fn test_special_tokens_flag() {
        let config = ModelConfig::from_lookup(lookup(&[
            (ENV_API_KEY, "sk-local"),
            (ENV_SPECIAL_TOKENS, "1"),
        ]))
        .unwrap();

        assert!(config.special_tokens);
        assert!(config.extra_body().is_empty());

        let config = ModelConfig::from_lookup(lookup(&[
            (ENV_API_KEY, "sk-local"),
            (ENV_SPECIAL_TOKENS, ""),
        ]))
        .unwrap();
        assert!(!config.special_tokens);
    }

    #[test]
    fn test_defaults_and_fallbacks() {
        let config = ModelConfig::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-openai"),
            ("OPENAI_BASE_URL", "https://api.openai.com/v1"),
        ]))
        .unwrap();

        assert_eq!(config.api_key, "sk-openai");
        assert_eq!(config.api_base, "https://api.openai.com/v1");
        assert_eq!(config.model_name, DEFAULT_MODEL);
    }

    #[test]
    fn test_missing_api_key() {
        let err = ModelConfig::from_lookup(lookup(&[(ENV_MODEL_NAME, "m")])).unwrap_err();
        assert_eq!(err.error_code(), "CONFIG_ERROR");
    }
}
