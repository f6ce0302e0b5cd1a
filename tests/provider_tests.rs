
use orm_forge::OrmError;
use orm_forge::llm::{CompletionService, ResolvedProvider};
use orm_forge::llm_providers::openai::OpenAIService;
use orm_forge::llm_providers::zhipu::ZhipuService;
use orm_forge::providers::Provider;
use std::time::{Duration, Instant};
use test_utils::{spawn_silent_server, spawn_stub_server};

fn resolved(provider: Provider, base_url: &str, api_key: &str) -> ResolvedProvider {
    ResolvedProvider {
        provider,
        api_key: api_key.to_string(),
        model: provider.default_model().to_string(),
        base_url: base_url.to_string(),
        timeout_seconds: 5,
    }
}

#[tokio::test]
async fn test_zhipu_success_sends_chat_request() {
    let (base_url, server) = spawn_stub_server(
        "200 OK",
        r#"{"id":"1","choices":[{"index":0,"message":{"role":"assistant","content":"<orm></orm>"}}]}"#,
    )
    .await;
    let service = ZhipuService::new(resolved(Provider::Zhipu, &base_url, "zhipu-key"))
        .expect("Failed to build service");

    let text = service.complete("design an entity").await.expect("reply");
    assert_eq!(text, "<orm></orm>");

    let request = server.await.expect("stub server panicked");
    assert!(request.head.starts_with("POST /v1/chat/completions"));
    assert!(
        request
            .head
            .to_ascii_lowercase()
            .contains("authorization: bearer zhipu-key")
    );

    let body: serde_json::Value = serde_json::from_str(&request.body).expect("json body");
    assert_eq!(body["model"], "glm-4-flash");
    assert_eq!(body["stream"], false);
    assert_eq!(body["max_tokens"], 4096);
    assert_eq!(body["messages"][0]["role"], "user");
    assert_eq!(body["messages"][0]["content"], "design an entity");
}

#[tokio::test]
async fn test_unauthorized_is_auth_invalid() {
    let (base_url, _server) = spawn_stub_server(
        "401 Unauthorized",
        r#"{"error":{"code":"1001","message":"token invalid"}}"#,
    )
    .await;
    let service = ZhipuService::new(resolved(Provider::Zhipu, &base_url, "bad"))
        .expect("Failed to build service");

    let result = service.complete("prompt").await;
    assert!(matches!(result, Err(OrmError::ProviderAuthInvalid { .. })));
}

#[tokio::test]
async fn test_too_many_requests_is_rate_limited() {
    let (base_url, _server) = spawn_stub_server(
        "429 Too Many Requests",
        r#"{"error":{"code":"rate_limit_exceeded","message":"slow down"}}"#,
    )
    .await;
    let service = OpenAIService::new(resolved(Provider::OpenAI, &base_url, "sk-test"))
        .expect("Failed to build service");

    let result = service.complete("prompt").await;
    assert!(matches!(result, Err(OrmError::ProviderRateLimited { .. })));
}

#[tokio::test]
async fn test_business_error_code_in_bad_request() {
    let (base_url, _server) = spawn_stub_server(
        "400 Bad Request",
        r#"{"error":{"code":"1302","message":"concurrency too high"}}"#,
    )
    .await;
    let service = ZhipuService::new(resolved(Provider::Zhipu, &base_url, "key"))
        .expect("Failed to build service");

    let result = service.complete("prompt").await;
    assert!(matches!(result, Err(OrmError::ProviderRateLimited { .. })));
}

#[tokio::test]
async fn test_server_error_passes_provider_message() {
    let (base_url, _server) = spawn_stub_server(
        "500 Internal Server Error",
        r#"{"error":{"code":"server_error","message":"model overloaded"}}"#,
    )
    .await;
    let service = OpenAIService::new(resolved(Provider::OpenAI, &base_url, "sk-test"))
        .expect("Failed to build service");

    match service.complete("prompt").await {
        Err(OrmError::ProviderFailed { provider, message }) => {
            assert_eq!(provider, "OpenAI");
            assert_eq!(message, "[server_error] model overloaded");
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn test_undecodable_success_body_is_bad_response() {
    let (base_url, _server) = spawn_stub_server("200 OK", "this is not json").await;
    let service = OpenAIService::new(resolved(Provider::OpenAI, &base_url, "sk-test"))
        .expect("Failed to build service");

    let result = service.complete("prompt").await;
    assert!(matches!(result, Err(OrmError::ProviderBadResponse { .. })));
}

#[tokio::test]
async fn test_empty_choices_is_bad_response() {
    let (base_url, _server) = spawn_stub_server("200 OK", r#"{"choices":[]}"#).await;
    let service = ZhipuService::new(resolved(Provider::Zhipu, &base_url, "key"))
        .expect("Failed to build service");

    let result = service.complete("prompt").await;
    assert!(matches!(result, Err(OrmError::ProviderBadResponse { .. })));
}

#[tokio::test]
async fn test_connection_refused_is_unreachable() {
    // Nothing listens on port 1
    let service = ZhipuService::new(resolved(Provider::Zhipu, "http://127.0.0.1:1/v1", "key"))
        .expect("Failed to build service");

    let result = service.complete("prompt").await;
    assert!(matches!(result, Err(OrmError::ProviderUnreachable { .. })));
}

#[tokio::test]
async fn test_blank_key_is_misconfigured_without_network() {
    let service = OpenAIService::new(resolved(Provider::OpenAI, "http://127.0.0.1:1/v1", "  "))
        .expect("Failed to build service");

    assert!(!service.is_available());
    match service.complete("prompt").await {
        Err(OrmError::ProviderMisconfigured {
            provider,
            api_key_env,
        }) => {
            assert_eq!(provider, "OpenAI");
            assert_eq!(api_key_env, "OPENAI_API_KEY");
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn test_silent_server_is_timeout() {
    let (base_url, server) = spawn_silent_server().await;
    let service = ZhipuService::new(ResolvedProvider {
        timeout_seconds: 1,
        ..resolved(Provider::Zhipu, &base_url, "key")
    })
    .expect("Failed to build service");

    let started = Instant::now();
    let result = service.complete("prompt").await;
    server.abort();

    assert!(matches!(result, Err(OrmError::ProviderTimeout { .. })));
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[tokio::test]
async fn test_blank_model_is_misconfigured_without_network() {
    let service = ZhipuService::new(ResolvedProvider {
        model: "  ".to_string(),
        ..resolved(Provider::Zhipu, "http://127.0.0.1:1/v1", "zhipu-key")
    })
    .expect("Failed to build service");

    assert!(!service.is_available());
    match service.complete("prompt").await {
        Err(OrmError::ProviderMisconfigured {
            provider,
            api_key_env,
        }) => {
            assert_eq!(provider, "Zhipu AI");
            assert_eq!(api_key_env, "ZHIPU_API_KEY");
        }
        other => panic!("unexpected result: {other:?}"),
    }
}
