//! Zhipu AI (BigModel) chat-completions service.

use async_trait::async_trait;

use super::chat::{ChatCompletionsClient, ProviderFault};
use crate::error::OrmError;
use crate::llm::{CompletionService, ResolvedProvider};
use crate::{log_error, log_info};

/// Completion service backed by the Zhipu AI open platform
pub struct ZhipuService {
    chat: ChatCompletionsClient,
}

impl ZhipuService {
    pub fn new(resolved: ResolvedProvider) -> anyhow::Result<Self> {
        Ok(Self {
            chat: ChatCompletionsClient::new(resolved, classify_error_code)?,
        })
    }
}

/// Zhipu reports auth and throttling problems as numeric business codes,
/// sometimes alongside a generic 400 status.
fn classify_error_code(code: &str) -> Option<ProviderFault> {
    match code {
        "1000" | "1001" | "1002" | "1003" | "1004" => Some(ProviderFault::AuthInvalid),
        "1302" | "1303" | "1305" => Some(ProviderFault::RateLimited),
        _ => None,
    }
}

#[async_trait]
impl CompletionService for ZhipuService {
    fn provider_name(&self) -> &str {
        self.chat.resolved().provider.display_name()
    }

    fn is_available(&self) -> bool {
        self.chat.resolved().is_available()
    }

    async fn complete(&self, prompt: &str) -> Result<String, OrmError> {
        let resolved = self.chat.resolved();
        if !self.is_available() {
            return Err(OrmError::ProviderMisconfigured {
                provider: self.provider_name().to_string(),
                api_key_env: resolved.provider.api_key_env().to_string(),
            });
        }

        log_info!(
            "Generating ORM with {}, model: {}",
            self.provider_name(),
            resolved.model
        );

        match self.chat.send(self.provider_name(), prompt).await {
            Ok(text) => {
                log_info!(
                    "{} generation completed, response length: {}",
                    self.provider_name(),
                    text.len()
                );
                Ok(text)
            }
            Err(e) => {
                log_error!(
                    "{} generation failed, model: {}, error: {}",
                    self.provider_name(),
                    resolved.model,
                    e
                );
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_business_codes() {
        assert_eq!(classify_error_code("1002"), Some(ProviderFault::AuthInvalid));
        assert_eq!(classify_error_code("1303"), Some(ProviderFault::RateLimited));
        assert_eq!(classify_error_code("1113"), None);
    }
}
