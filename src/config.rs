//! Application Configuration
//!
//! Provider credentials come from the environment; generation settings carry
//! defaults and can be overridden by the caller.

use serde::{Deserialize, Serialize};

use oncall_desk_llm::ProviderType;

/// Environment variable holding the OpenAI API key.
pub const OPENAI_API_KEY_VAR: &str = "OPENAI_API_KEY";
/// Environment variable holding the Google Generative AI API key.
pub const GOOGLE_API_KEY_VAR: &str = "GOOGLE_GENERATIVE_AI_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub openai_api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_api_key: Option<String>,
    /// Endpoint override for OpenAI-compatible gateways
    #[serde(skip_serializing_if = "Option::is_none")]
    pub openai_base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_base_url: Option<String>,
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_max_steps() -> usize {
    10
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_temperature() -> f32 {
    0.7
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            google_api_key: None,
            openai_base_url: None,
            google_base_url: None,
            max_steps: default_max_steps(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

impl AppConfig {
    /// Build a config from process environment variables.
    pub fn from_env() -> Self {
        Self {
            openai_api_key: std::env::var(OPENAI_API_KEY_VAR).ok().filter(|k| !k.is_empty()),
            google_api_key: std::env::var(GOOGLE_API_KEY_VAR).ok().filter(|k| !k.is_empty()),
            ..Self::default()
        }
    }

    /// The credential configured for a provider, if any.
    pub fn api_key_for(&self, provider: ProviderType) -> Option<&str> {
        match provider {
            ProviderType::OpenAI => self.openai_api_key.as_deref(),
            ProviderType::Google => self.google_api_key.as_deref(),
        }
    }

    /// The endpoint override configured for a provider, if any.
    pub fn base_url_for(&self, provider: ProviderType) -> Option<&str> {
        match provider {
            ProviderType::OpenAI => self.openai_base_url.as_deref(),
            ProviderType::Google => self.google_base_url.as_deref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.max_steps, 10);
        assert_eq!(config.max_tokens, 4096);
        assert!(config.api_key_for(ProviderType::OpenAI).is_none());
    }

    #[test]
    fn test_api_key_lookup() {
        let config = AppConfig {
            openai_api_key: Some("sk-test".into()),
            ..AppConfig::default()
        };
        assert_eq!(config.api_key_for(ProviderType::OpenAI), Some("sk-test"));
        assert!(config.api_key_for(ProviderType::Google).is_none());
    }
}
