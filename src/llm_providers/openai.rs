//! OpenAI chat-completions service.

use async_trait::async_trait;

use super::chat::{ChatCompletionsClient, ProviderFault};
use crate::error::OrmError;
use crate::llm::{CompletionService, ResolvedProvider};
use crate::{log_debug, log_error};

/// Completion service backed by the OpenAI API (or a compatible proxy)
pub struct OpenAIService {
    chat: ChatCompletionsClient,
}

impl OpenAIService {
    pub fn new(resolved: ResolvedProvider) -> anyhow::Result<Self> {
        Ok(Self {
            chat: ChatCompletionsClient::new(resolved, classify_error_code)?,
        })
    }
}

fn classify_error_code(code: &str) -> Option<ProviderFault> {
    match code {
        "invalid_api_key" | "invalid_organization" => Some(ProviderFault::AuthInvalid),
        "rate_limit_exceeded" => Some(ProviderFault::RateLimited),
        _ => None,
    }
}

#[async_trait]
impl CompletionService for OpenAIService {
    fn provider_name(&self) -> &str {
        self.chat.resolved().provider.display_name()
    }

    fn is_available(&self) -> bool {
        self.chat.resolved().is_available()
    }

    async fn complete(&self, prompt: &str) -> Result<String, OrmError> {
        if !self.is_available() {
            return Err(OrmError::ProviderMisconfigured {
                provider: self.provider_name().to_string(),
                api_key_env: self.chat.resolved().provider.api_key_env().to_string(),
            });
        }

        log_debug!("Sending prompt to {}", self.chat.endpoint());
        self.chat
            .send(self.provider_name(), prompt)
            .await
            .inspect_err(|e| log_error!("{} request failed: {}", self.provider_name(), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            classify_error_code("invalid_api_key"),
            Some(ProviderFault::AuthInvalid)
        );
        assert_eq!(
            classify_error_code("rate_limit_exceeded"),
            Some(ProviderFault::RateLimited)
        );
        assert_eq!(classify_error_code("insufficient_quota"), None);
    }
}
