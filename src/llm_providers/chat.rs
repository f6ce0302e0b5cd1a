//! Chat-completions transport shared by the providers.

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

use crate::error::OrmError;
use crate::llm::{Choice, CompletionReply, CompletionRequest, ResolvedProvider};
use crate::log_debug;

/// Failure categories a provider can read out of a business error code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderFault {
    AuthInvalid,
    RateLimited,
    Timeout,
}

/// Maps provider-specific error codes to a fault category
pub type ErrorCodeClassifier = fn(&str) -> Option<ProviderFault>;

#[derive(Debug, Default, Deserialize)]
struct WireReply {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    error: Option<WireError>,
}

#[derive(Debug, Default, Deserialize)]
struct WireError {
    #[serde(default)]
    code: Option<serde_json::Value>,
    #[serde(default)]
    message: Option<String>,
}

impl WireError {
    fn code(&self) -> Option<String> {
        match self.code.as_ref()? {
            serde_json::Value::String(code) => Some(code.clone()),
            serde_json::Value::Null => None,
            other => Some(other.to_string()),
        }
    }
}

/// HTTP client for a `POST {base_url}/chat/completions` endpoint
pub struct ChatCompletionsClient {
    resolved: ResolvedProvider,
    client: Client,
    classifier: ErrorCodeClassifier,
}

impl ChatCompletionsClient {
    pub fn new(resolved: ResolvedProvider, classifier: ErrorCodeClassifier) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(resolved.timeout_seconds))
            .build()?;
        Ok(Self {
            resolved,
            client,
            classifier,
        })
    }

    pub fn resolved(&self) -> &ResolvedProvider {
        &self.resolved
    }

    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.resolved.base_url)
    }

    /// Issue one request and return the validated reply text
    pub async fn send(&self, provider_name: &str, prompt: &str) -> Result<String, OrmError> {
        let request = CompletionRequest::new(&self.resolved.model, prompt);
        let endpoint = self.endpoint();
        log_debug!(
            "POST {} (model: {}, prompt: {} chars)",
            endpoint,
            request.model,
            prompt.len()
        );

        let response = self
            .client
            .post(&endpoint)
            .bearer_auth(&self.resolved.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| transport_error(provider_name, &e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| transport_error(provider_name, &e))?;
        log_debug!("{} responded with {} ({} bytes)", provider_name, status, body.len());

        reply_from_http(provider_name, status, &body, self.classifier)?.into_text(provider_name)
    }
}

fn transport_error(provider_name: &str, error: &reqwest::Error) -> OrmError {
    if error.is_timeout() {
        OrmError::ProviderTimeout {
            provider: provider_name.to_string(),
        }
    } else {
        OrmError::ProviderUnreachable {
            provider: provider_name.to_string(),
            detail: error.to_string(),
        }
    }
}

fn fault_error(provider_name: &str, fault: ProviderFault) -> OrmError {
    let provider = provider_name.to_string();
    match fault {
        ProviderFault::AuthInvalid => OrmError::ProviderAuthInvalid { provider },
        ProviderFault::RateLimited => OrmError::ProviderRateLimited { provider },
        ProviderFault::Timeout => OrmError::ProviderTimeout { provider },
    }
}

/// Normalise an HTTP status and body into a [`CompletionReply`].
///
/// Auth, rate-limit and gateway-timeout statuses, and error codes the
/// classifier recognises, become typed failures directly.
pub fn reply_from_http(
    provider_name: &str,
    status: StatusCode,
    body: &str,
    classifier: ErrorCodeClassifier,
) -> Result<CompletionReply, OrmError> {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            return Err(fault_error(provider_name, ProviderFault::AuthInvalid));
        }
        StatusCode::TOO_MANY_REQUESTS => {
            return Err(fault_error(provider_name, ProviderFault::RateLimited));
        }
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            return Err(fault_error(provider_name, ProviderFault::Timeout));
        }
        _ => {}
    }

    let wire = match serde_json::from_str::<WireReply>(body) {
        Ok(wire) => wire,
        Err(e) if status.is_success() => {
            return Err(OrmError::ProviderBadResponse {
                provider: provider_name.to_string(),
                detail: format!("undecodable body: {e}"),
            });
        }
        Err(_) => WireReply::default(),
    };

    if let Some(fault) = wire
        .error
        .as_ref()
        .and_then(WireError::code)
        .and_then(|code| classifier(&code))
    {
        return Err(fault_error(provider_name, fault));
    }

    let msg = wire.error.as_ref().map(|error| {
        let message = error.message.clone().unwrap_or_default();
        match error.code() {
            Some(code) => format!("[{code}] {message}"),
            None => message,
        }
    });

    Ok(CompletionReply {
        success: status.is_success() && wire.error.is_none(),
        msg: msg.or_else(|| (!status.is_success()).then(|| format!("HTTP {status}"))),
        choices: wire.choices,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_codes(_: &str) -> Option<ProviderFault> {
        None
    }

    #[test]
    fn test_success_reply() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"<orm/>"}}]}"#;
        let reply = reply_from_http("test", StatusCode::OK, body, no_codes).expect("reply");
        assert!(reply.success);
        assert_eq!(reply.choices[0].content(), Some("<orm/>"));
    }

    #[test]
    fn test_status_classification() {
        assert!(matches!(
            reply_from_http("test", StatusCode::UNAUTHORIZED, "", no_codes),
            Err(OrmError::ProviderAuthInvalid { .. })
        ));
        assert!(matches!(
            reply_from_http("test", StatusCode::TOO_MANY_REQUESTS, "", no_codes),
            Err(OrmError::ProviderRateLimited { .. })
        ));
        assert!(matches!(
            reply_from_http("test", StatusCode::GATEWAY_TIMEOUT, "", no_codes),
            Err(OrmError::ProviderTimeout { .. })
        ));
        assert!(matches!(
            reply_from_http("test", StatusCode::OK, "not json", no_codes),
            Err(OrmError::ProviderBadResponse { .. })
        ));
    }

    #[test]
    fn test_error_body_passes_message_through() {
        let body = r#"{"error":{"code":"1113","message":"account in arrears"}}"#;
        let reply = reply_from_http("test", StatusCode::BAD_REQUEST, body, no_codes).expect("reply");
        assert!(!reply.success);
        assert_eq!(reply.msg.as_deref(), Some("[1113] account in arrears"));

        let reply =
            reply_from_http("test", StatusCode::INTERNAL_SERVER_ERROR, "<html>", no_codes)
                .expect("reply");
        assert_eq!(reply.msg.as_deref(), Some("HTTP 500 Internal Server Error"));
    }

    #[test]
    fn test_classifier_codes_win() {
        fn classify(code: &str) -> Option<ProviderFault> {
            (code == "42").then_some(ProviderFault::RateLimited)
        }
        let body = r#"{"error":{"code":42,"message":"slow down"}}"#;
        assert!(matches!(
            reply_from_http("test", StatusCode::BAD_REQUEST, body, classify),
            Err(OrmError::ProviderRateLimited { .. })
        ));
    }
}
