//! Error taxonomy for the ORM generation pipeline.
//!
//! Every failure aborts the pipeline. Callers map kinds to transport status
//! codes through [`OrmError::status_code`] instead of matching on messages.

use thiserror::Error;

/// Failure kinds surfaced by the pipeline and its collaborators
#[derive(Debug, Error)]
pub enum OrmError {
    #[error("Uploaded file is empty")]
    EmptyInput,

    #[error("Uploaded file is {size} bytes, which exceeds the configured limit of {limit} bytes")]
    UploadTooLarge { size: usize, limit: usize },

    #[error("Prompt template '{name}' is not available: {detail}")]
    ConfigurationMissing { name: String, detail: String },

    #[error("No AI provider is active. Set `active_provider` in the configuration")]
    ProviderUnavailable,

    #[error(
        "{provider} is not fully configured: an API key ({api_key_env}) and a model id are required. Check the provider configuration"
    )]
    ProviderMisconfigured {
        provider: String,
        api_key_env: String,
    },

    #[error("Unable to connect to {provider}. Check the network connection: {detail}")]
    ProviderUnreachable { provider: String, detail: String },

    #[error("{provider} request timed out. Check the network connection or try again later")]
    ProviderTimeout { provider: String },

    #[error("{provider} rate limit exceeded. Try again later")]
    ProviderRateLimited { provider: String },

    #[error("{provider} rejected the API key as invalid or expired. Check the API key configuration")]
    ProviderAuthInvalid { provider: String },

    #[error("{provider} returned an unusable response: {detail}")]
    ProviderBadResponse { provider: String, detail: String },

    #[error("{provider} service error: {message}")]
    ProviderFailed { provider: String, message: String },

    #[error("AI response does not contain any XML content. Check the response format of the AI model")]
    NoXmlContent,

    #[error(
        "AI response does not contain complete XML content (start: {start}, end: {end:?}). Check the response format of the AI model"
    )]
    IncompleteXmlContent { start: usize, end: Option<usize> },
}

impl OrmError {
    /// HTTP-equivalent status for this failure
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::EmptyInput => 400,
            Self::UploadTooLarge { .. } => 413,
            _ => 500,
        }
    }

    /// Whether the failure was caused by the caller's input
    pub const fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }

    /// Whether the failure happened while talking to the remote model
    pub const fn is_provider_failure(&self) -> bool {
        matches!(
            self,
            Self::ProviderUnreachable { .. }
                | Self::ProviderTimeout { .. }
                | Self::ProviderRateLimited { .. }
                | Self::ProviderAuthInvalid { .. }
                | Self::ProviderBadResponse { .. }
                | Self::ProviderFailed { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(OrmError::EmptyInput.status_code(), 400);
        assert!(OrmError::EmptyInput.is_client_error());
        assert_eq!(
            OrmError::UploadTooLarge { size: 10, limit: 5 }.status_code(),
            413
        );
        assert_eq!(OrmError::NoXmlContent.status_code(), 500);
        assert!(!OrmError::ProviderUnavailable.is_client_error());
        assert!(
            OrmError::ProviderTimeout {
                provider: "zhipu".to_string()
            }
            .is_provider_failure()
        );
        assert!(!OrmError::NoXmlContent.is_provider_failure());
    }

    #[test]
    fn test_misconfigured_message_names_env_not_secret() {
        let err = OrmError::ProviderMisconfigured {
            provider: "Zhipu AI".to_string(),
            api_key_env: "ZHIPU_API_KEY".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("ZHIPU_API_KEY"));
        assert!(message.contains("Check the provider configuration"));
    }
}
