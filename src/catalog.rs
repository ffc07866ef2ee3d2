//! Model Catalog
//!
//! The fixed set of chat models the assistants can run on, keyed by the
//! provider that serves them.

use serde::{Deserialize, Serialize};

use oncall_desk_llm::ProviderType;

/// One selectable chat model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub id: &'static str,
    pub name: &'static str,
    pub provider: ProviderType,
    pub description: &'static str,
}

/// All models the UI can offer, in display order.
pub const AVAILABLE_MODELS: &[ModelConfig] = &[
    ModelConfig {
        id: "gpt-4o",
        name: "GPT-4o",
        provider: ProviderType::OpenAI,
        description: "Most capable OpenAI model",
    },
    ModelConfig {
        id: "gpt-4o-mini",
        name: "GPT-4o Mini",
        provider: ProviderType::OpenAI,
        description: "Fast and efficient",
    },
    ModelConfig {
        id: "gemini-3-flash-preview",
        name: "Gemini 3 Flash",
        provider: ProviderType::Google,
        description: "Fast multimodal model",
    },
    ModelConfig {
        id: "gemini-2.5-flash",
        name: "Gemini 2.5 Flash",
        provider: ProviderType::Google,
        description: "Fast multimodal model",
    },
];

/// The model used when the client does not pick one.
pub fn default_model() -> &'static ModelConfig {
    &AVAILABLE_MODELS[0]
}

pub fn model_by_id(id: &str) -> Option<&'static ModelConfig> {
    AVAILABLE_MODELS.iter().find(|m| m.id == id)
}

pub fn models_by_provider(provider: ProviderType) -> Vec<&'static ModelConfig> {
    AVAILABLE_MODELS
        .iter()
        .filter(|m| m.provider == provider)
        .collect()
}
