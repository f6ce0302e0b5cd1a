//! Completion client abstraction.
//!
//! The pipeline talks to exactly one [`CompletionService`], chosen once from the
//! configuration by [`select_service`]. Provider modules under
//! `llm_providers` handle transport; this module owns the request/reply shapes
//! and the reply invariants shared by all of them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::Config;
use crate::error::OrmError;
use crate::llm_providers::{openai::OpenAIService, zhipu::ZhipuService};
use crate::log_debug;
use crate::providers::{Provider, ProviderConfig};

/// Sampling temperature for ORM generation
pub const TEMPERATURE: f32 = 0.3;

/// Output token budget for ORM generation
pub const MAX_TOKENS: u32 = 4096;

/// A remote model that turns a prompt into reply text
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Human readable provider name
    fn provider_name(&self) -> &str;

    /// Whether the credentials and model id needed for a call are present
    fn is_available(&self) -> bool;

    /// Send the prompt and return the reply text
    async fn complete(&self, prompt: &str) -> Result<String, OrmError>;
}

/// Role of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

/// Chat-completion request body. Always a single user message, never streamed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub stream: bool,
}

impl CompletionRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: vec![ChatMessage {
                role: ChatRole::User,
                content: prompt.into(),
            }],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
            stream: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub message: Option<ChoiceMessage>,
}

impl Choice {
    /// Convenience constructor for a choice with text content
    pub fn with_content(content: impl Into<String>) -> Self {
        Self {
            message: Some(ChoiceMessage {
                content: Some(content.into()),
            }),
        }
    }

    pub fn content(&self) -> Option<&str> {
        self.message.as_ref().and_then(|m| m.content.as_deref())
    }
}

/// Provider reply normalised across providers
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletionReply {
    pub success: bool,
    pub msg: Option<String>,
    pub choices: Vec<Choice>,
}

impl CompletionReply {
    /// Enforce the reply invariants and return the first non-blank content
    pub fn into_text(self, provider: &str) -> Result<String, OrmError> {
        if !self.success {
            return Err(OrmError::ProviderFailed {
                provider: provider.to_string(),
                message: self
                    .msg
                    .unwrap_or_else(|| "request was not successful".to_string()),
            });
        }

        if self.choices.is_empty() {
            return Err(OrmError::ProviderBadResponse {
                provider: provider.to_string(),
                detail: "missing choices".to_string(),
            });
        }

        self.choices
            .iter()
            .filter_map(Choice::content)
            .find(|content| !content.trim().is_empty())
            .map(str::to_string)
            .ok_or_else(|| OrmError::ProviderBadResponse {
                provider: provider.to_string(),
                detail: "reply content is empty".to_string(),
            })
    }
}

/// Credentials and endpoint resolved for one provider
#[derive(Clone)]
pub struct ResolvedProvider {
    pub provider: Provider,
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout_seconds: u64,
}

impl ResolvedProvider {
    pub fn resolve(provider: Provider, config: &ProviderConfig) -> Self {
        Self {
            provider,
            api_key: config.resolve_api_key(provider),
            model: config.effective_model(provider).to_string(),
            base_url: config.effective_base_url(provider).to_string(),
            timeout_seconds: config.effective_timeout_seconds(),
        }
    }

    /// Both the API key and the model id must be non-blank
    pub fn is_available(&self) -> bool {
        !self.api_key.trim().is_empty() && !self.model.trim().is_empty()
    }
}

impl std::fmt::Debug for ResolvedProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedProvider")
            .field("provider", &self.provider)
            .field("api_key", &if self.api_key.is_empty() { "" } else { "***" })
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

/// Build the completion service for a specific provider
pub fn build_service(
    provider: Provider,
    config: &ProviderConfig,
) -> anyhow::Result<Arc<dyn CompletionService>> {
    let resolved = ResolvedProvider::resolve(provider, config);
    log_debug!("Building completion service: {:?}", resolved);

    let service: Arc<dyn CompletionService> = match provider {
        Provider::Zhipu => Arc::new(ZhipuService::new(resolved)?),
        Provider::OpenAI => Arc::new(OpenAIService::new(resolved)?),
    };
    Ok(service)
}

/// Resolve the active provider from the configuration.
///
/// Returns `Ok(None)` when no provider is active; an unknown provider name is
/// an error.
pub fn select_service(config: &Config) -> anyhow::Result<Option<Arc<dyn CompletionService>>> {
    let Some(name) = config
        .active_provider
        .as_deref()
        .filter(|name| !name.trim().is_empty())
    else {
        log_debug!("No active provider configured");
        return Ok(None);
    };

    let provider: Provider = name.parse()?;
    let provider_config = config
        .get_provider_config(provider)
        .cloned()
        .unwrap_or_else(|| ProviderConfig::with_defaults(provider));

    build_service(provider, &provider_config).map(Some)
}
