//! LLM Provider configuration.
//!
//! Single source of truth for supported providers and their defaults.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Request timeout used when a provider config does not set one
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 60;

/// Supported LLM providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    Zhipu,
    OpenAI,
}

impl Provider {
    /// All available providers
    pub const ALL: &'static [Provider] = &[Provider::Zhipu, Provider::OpenAI];

    /// Provider name as used in config files and CLI
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Zhipu => "zhipu",
            Self::OpenAI => "openai",
        }
    }

    /// Human readable name for messages
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Zhipu => "Zhipu AI",
            Self::OpenAI => "OpenAI",
        }
    }

    /// Default model id
    pub const fn default_model(&self) -> &'static str {
        match self {
            Self::Zhipu => "glm-4-flash",
            Self::OpenAI => "gpt-4o-mini",
        }
    }

    /// Base URL of the chat-completions API
    pub const fn default_base_url(&self) -> &'static str {
        match self {
            Self::Zhipu => "https://open.bigmodel.cn/api/paas/v4",
            Self::OpenAI => "https://api.openai.com/v1",
        }
    }

    /// Environment variable name for the API key
    pub const fn api_key_env(&self) -> &'static str {
        match self {
            Self::Zhipu => "ZHIPU_API_KEY",
            Self::OpenAI => "OPENAI_API_KEY",
        }
    }

    /// Get all provider names as strings
    pub fn all_names() -> Vec<&'static str> {
        Self::ALL.iter().map(Self::name).collect()
    }
}

impl FromStr for Provider {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        let normalized = match lower.as_str() {
            "glm" | "bigmodel" => "zhipu",
            other => other,
        };

        Self::ALL
            .iter()
            .find(|p| p.name() == normalized)
            .copied()
            .ok_or_else(|| ProviderError::Unknown(s.to_string()))
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Provider configuration error
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Unknown provider: {0}. Supported: zhipu, openai")]
    Unknown(String),
}

/// Per-provider configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// API key (falls back to the provider's environment variable when blank)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_key: String,
    /// Model id
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub model: String,
    /// Base URL override, mainly for proxies and tests
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Request timeout override in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u64>,
}

impl ProviderConfig {
    /// Create config with defaults for a provider
    pub fn with_defaults(provider: Provider) -> Self {
        Self {
            api_key: String::new(),
            model: provider.default_model().to_string(),
            base_url: None,
            timeout_seconds: None,
        }
    }

    /// Get effective model (configured or default)
    pub fn effective_model(&self, provider: Provider) -> &str {
        if self.model.trim().is_empty() {
            provider.default_model()
        } else {
            &self.model
        }
    }

    /// Get effective base URL (configured or default), without a trailing slash
    pub fn effective_base_url(&self, provider: Provider) -> &str {
        self.base_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| provider.default_base_url())
            .trim_end_matches('/')
    }

    /// Get effective timeout (configured or default)
    pub fn effective_timeout_seconds(&self) -> u64 {
        self.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS)
    }

    /// Resolve the API key, consulting the environment when the config is blank
    pub fn resolve_api_key(&self, provider: Provider) -> String {
        self.resolve_api_key_with(provider, |name| std::env::var(name).ok())
    }

    /// Resolve the API key with a custom environment lookup
    pub fn resolve_api_key_with<F>(&self, provider: Provider, lookup: F) -> String
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.has_api_key() {
            self.api_key.clone()
        } else {
            lookup(provider.api_key_env()).unwrap_or_default()
        }
    }

    /// Check if this config has an API key set
    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}
