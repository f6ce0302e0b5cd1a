use crate::log_debug;
use crate::providers::{Provider, ProviderConfig};

use anyhow::{Context, Result, anyhow};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration structure for orm-forge
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
pub struct Config {
    /// The single active provider. `None` means no completion client is configured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_provider: Option<String>,
    /// Provider-specific configurations, keyed by provider name
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    /// Pipeline limits and resources
    #[serde(default)]
    pub pipeline: PipelineConfig,
    /// Performance and execution settings
    #[serde(default)]
    pub performance: PerformanceConfig,
}

/// Pipeline configuration
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Directory of `<name>.md` prompt templates replacing the built-in ones
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompts_dir: Option<PathBuf>,
    /// Reject uploads larger than this many bytes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_upload_bytes: Option<usize>,
}

/// Performance and execution configuration
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct PerformanceConfig {
    /// Whether to enable verbose logging (includes HTTP stack logs)
    #[serde(default)]
    pub verbose_logging: bool,
}

impl Config {
    /// Load the configuration from the default file
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::load_from(&config_path)
    }

    /// Load the configuration from a specific file, falling back to defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        let config = if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            Self::from_toml(&content).with_context(|| {
                format!(
                    "Invalid configuration file format in {}. Please check it for syntax errors",
                    path.display()
                )
            })?
        } else {
            Self::default()
        };

        log_debug!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Parse a TOML document
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Save the configuration to the default file
    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;
        self.save_to(&config_path)
    }

    /// Save the configuration to a specific file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;
        log_debug!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Get the path to the configuration file
    pub fn get_config_path() -> Result<PathBuf> {
        let mut path =
            config_dir().ok_or_else(|| anyhow!("Unable to determine config directory"))?;
        path.push("orm-forge");
        path.push("config.toml");
        Ok(path)
    }

    /// The active provider, parsed. `Ok(None)` when none is set.
    pub fn active_provider(&self) -> Result<Option<Provider>> {
        self.active_provider
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .map(str::parse::<Provider>)
            .transpose()
            .map_err(Into::into)
    }

    /// Get the configuration for a specific provider
    pub fn get_provider_config(&self, provider: Provider) -> Option<&ProviderConfig> {
        self.providers.get(provider.name()).or_else(|| {
            self.providers
                .iter()
                .find(|(name, _)| name.parse::<Provider>().ok() == Some(provider))
                .map(|(_, config)| config)
        })
    }

    /// Switch the active provider for this process only
    pub fn set_active_provider(&mut self, provider: Provider) {
        self.active_provider = Some(provider.name().to_string());
        self.providers
            .entry(provider.name().to_string())
            .or_insert_with(|| ProviderConfig::with_defaults(provider));
    }

    /// Apply a set of changes. Returns whether anything changed.
    pub fn update(&mut self, changes: ConfigUpdate) -> Result<bool> {
        let before = self.clone();

        if let Some(provider) = changes.provider {
            self.set_active_provider(provider);
        }

        if changes.touches_provider() {
            let provider = self.active_provider()?.context(
                "No active provider. Pass --provider to choose which provider to configure",
            )?;
            let provider_config = self
                .providers
                .entry(provider.name().to_string())
                .or_insert_with(|| ProviderConfig::with_defaults(provider));

            if let Some(key) = changes.api_key {
                provider_config.api_key = key;
            }
            if let Some(model) = changes.model {
                provider_config.model = model;
            }
            if let Some(url) = changes.base_url {
                provider_config.base_url = Some(url);
            }
            if let Some(timeout) = changes.timeout_seconds {
                provider_config.timeout_seconds = Some(timeout);
            }
        }

        if let Some(limit) = changes.max_upload_bytes {
            self.pipeline.max_upload_bytes = Some(limit);
        }
        if let Some(dir) = changes.prompts_dir {
            self.pipeline.prompts_dir = Some(dir);
        }

        let changed = *self != before;
        log_debug!("Configuration updated, changed: {}", changed);
        Ok(changed)
    }
}

/// Changes requested from the command line
#[derive(Debug, Clone, Default)]
pub struct ConfigUpdate {
    pub provider: Option<Provider>,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub max_upload_bytes: Option<usize>,
    pub prompts_dir: Option<PathBuf>,
}

impl ConfigUpdate {
    fn touches_provider(&self) -> bool {
        self.api_key.is_some()
            || self.model.is_some()
            || self.base_url.is_some()
            || self.timeout_seconds.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_toml() {
        let config = Config::from_toml(
            r#"
active_provider = "zhipu"

[providers.zhipu]
api_key = "abc"
model = "glm-4-plus"
timeout_seconds = 15
"#,
        )
        .expect("valid config");

        assert_eq!(
            config.active_provider().expect("known provider"),
            Some(Provider::Zhipu)
        );
        let zhipu = config
            .get_provider_config(Provider::Zhipu)
            .expect("zhipu config");
        assert_eq!(zhipu.model, "glm-4-plus");
        assert_eq!(zhipu.timeout_seconds, Some(15));
        assert_eq!(config.pipeline, PipelineConfig::default());
    }

    #[test]
    fn test_update_requires_provider_for_credentials() {
        let mut config = Config::default();
        let result = config.update(ConfigUpdate {
            api_key: Some("key".into()),
            ..Default::default()
        });
        assert!(result.is_err());

        let changed = config
            .update(ConfigUpdate {
                provider: Some(Provider::OpenAI),
                api_key: Some("key".into()),
                max_upload_bytes: Some(1024),
                ..Default::default()
            })
            .expect("update with provider");
        assert!(changed);

        let openai = config
            .get_provider_config(Provider::OpenAI)
            .expect("openai config");
        assert_eq!(openai.api_key, "key");
        assert_eq!(openai.model, "gpt-4o-mini");
        assert_eq!(config.pipeline.max_upload_bytes, Some(1024));

        let unchanged = config
            .update(ConfigUpdate {
                api_key: Some("key".into()),
                ..Default::default()
            })
            .expect("same key");
        assert!(!unchanged);
    }
}
