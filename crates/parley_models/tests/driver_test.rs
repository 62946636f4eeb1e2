//! Wire-format tests for the HTTP drivers against an in-process backend.

mod common;

use axum::http::StatusCode;
use common::{FakeBackend, closed_port_url};
use parley_core::{ChatTurn, NpcContext, NpcId, Personality};
use parley_error::ProviderErrorKind;
use parley_interface::ChatProvider;
use parley_models::{GeminiDriver, OllamaDriver, OpenAiDriver, OpenRouterDriver};
use serde_json::json;
use std::time::Duration;

const BUDGET: Duration = Duration::from_secs(5);

fn context() -> NpcContext {
    NpcContext::new(NpcId(3), "Grumpy Miner", Personality::new("grumpy"), "Alex")
}

fn history() -> Vec<ChatTurn> {
    vec![ChatTurn::new("Hi!", "Hmph.")]
}

#[tokio::test]
async fn test_ollama_chat_round_trip() -> anyhow::Result<()> {
    let backend = FakeBackend::start(
        StatusCode::OK,
        json!({ "message": { "role": "assistant", "content": "Go dig your own tunnel." } }),
    )
    .await?;
    let driver = OllamaDriver::new(reqwest::Client::new(), &backend.base_url, "llama3.2");

    let reply = driver
        .generate_response(&context(), &history(), "Where is iron?", BUDGET)
        .await?;
    assert_eq!(reply, "Go dig your own tunnel.");

    let requests = backend.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.path, "/api/chat");
    assert_eq!(request.body["model"], "llama3.2");
    assert_eq!(request.body["stream"], false);
    let messages = request.body["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 4);
    assert_eq!(messages[0]["role"], "system");
    assert_eq!(messages[2]["role"], "assistant");
    assert_eq!(messages[3]["content"], "Where is iron?");
    assert!(request.headers.get("authorization").is_none());
    Ok(())
}

#[tokio::test]
async fn test_ollama_probe_reachable_and_unreachable() -> anyhow::Result<()> {
    let backend = FakeBackend::start(StatusCode::OK, json!({ "models": [] })).await?;
    let reachable = OllamaDriver::new(reqwest::Client::new(), &backend.base_url, "llama3.2");
    assert!(reachable.is_available(Duration::from_secs(2)).await);
    assert_eq!(backend.requests()[0].path, "/api/tags");

    let unreachable =
        OllamaDriver::new(reqwest::Client::new(), closed_port_url().await?, "llama3.2");
    assert!(!unreachable.is_available(Duration::from_millis(500)).await);
    Ok(())
}

#[tokio::test]
async fn test_ollama_probe_rejects_error_status() -> anyhow::Result<()> {
    let backend = FakeBackend::start(StatusCode::SERVICE_UNAVAILABLE, json!({})).await?;
    let driver = OllamaDriver::new(reqwest::Client::new(), &backend.base_url, "llama3.2");
    assert!(!driver.is_available(Duration::from_secs(2)).await);
    Ok(())
}

#[tokio::test]
async fn test_gemini_request_shape() -> anyhow::Result<()> {
    let backend = FakeBackend::start(
        StatusCode::OK,
        json!({ "candidates": [ { "content": { "parts": [ { "text": "Bah. North." } ] } } ] }),
    )
    .await?;
    let driver = GeminiDriver::new(
        reqwest::Client::new(),
        format!("{}/v1beta", backend.base_url),
        "gemini-test",
        Some("g-key".to_string()),
    );

    let reply = driver
        .generate_response(&context(), &history(), "Which way?", BUDGET)
        .await?;
    assert_eq!(reply, "Bah. North.");

    let request = &backend.requests()[0];
    assert_eq!(request.path, "/v1beta/models/gemini-test:generateContent");
    assert_eq!(request.headers["x-goog-api-key"], "g-key");
    assert!(
        request.body["systemInstruction"]["parts"][0]["text"]
            .as_str()
            .unwrap()
            .starts_with("You are Grumpy Miner")
    );
    let contents = request.body["contents"].as_array().unwrap();
    assert_eq!(contents.len(), 3);
    assert_eq!(contents[0]["role"], "user");
    assert_eq!(contents[1]["role"], "model");
    assert_eq!(contents[2]["parts"][0]["text"], "Which way?");
    Ok(())
}

#[tokio::test]
async fn test_gemini_without_credential() -> anyhow::Result<()> {
    let driver = GeminiDriver::new(
        reqwest::Client::new(),
        closed_port_url().await?,
        "gemini-test",
        Some("   ".to_string()),
    );
    assert!(!driver.is_available(BUDGET).await);

    let err = driver
        .generate_response(&context(), &[], "Hello", BUDGET)
        .await
        .unwrap_err();
    assert!(matches!(err.kind, ProviderErrorKind::MissingCredential(_)));
    Ok(())
}

#[tokio::test]
async fn test_openai_bearer_and_reply() -> anyhow::Result<()> {
    let backend = FakeBackend::start(
        StatusCode::OK,
        json!({ "choices": [ { "message": { "role": "assistant", "content": "Fine. Take a torch." } } ] }),
    )
    .await?;
    let driver = OpenAiDriver::new(
        reqwest::Client::new(),
        &backend.base_url,
        "gpt-test",
        Some("sk-test".to_string()),
    );
    assert!(driver.is_available(BUDGET).await);

    let reply = driver
        .generate_response(&context(), &[], "It's dark.", BUDGET)
        .await?;
    assert_eq!(reply, "Fine. Take a torch.");

    let request = &backend.requests()[0];
    assert_eq!(request.path, "/chat/completions");
    assert_eq!(request.headers["authorization"], "Bearer sk-test");
    assert_eq!(request.body["model"], "gpt-test");
    assert!(request.headers.get("x-title").is_none());
    Ok(())
}

#[tokio::test]
async fn test_openrouter_attribution_headers() -> anyhow::Result<()> {
    let backend = FakeBackend::start(
        StatusCode::OK,
        json!({ "choices": [ { "message": { "content": "Hmph." } } ] }),
    )
    .await?;
    let driver = OpenRouterDriver::new(
        reqwest::Client::new(),
        format!("{}/api/v1", backend.base_url),
        "meta-llama/test",
        Some("or-key".to_string()),
    );

    driver
        .generate_response(&context(), &[], "Hello", BUDGET)
        .await?;

    let request = &backend.requests()[0];
    assert_eq!(request.path, "/api/v1/chat/completions");
    assert!(request.headers.contains_key("http-referer"));
    assert!(request.headers.contains_key("x-title"));
    Ok(())
}

#[tokio::test]
async fn test_non_success_status_is_an_error() -> anyhow::Result<()> {
    let backend =
        FakeBackend::start(StatusCode::TOO_MANY_REQUESTS, json!({ "error": "slow down" })).await?;
    let driver = OpenAiDriver::new(
        reqwest::Client::new(),
        &backend.base_url,
        "gpt-test",
        Some("sk-test".to_string()),
    );

    let err = driver
        .generate_response(&context(), &[], "Hello", BUDGET)
        .await
        .unwrap_err();
    assert!(matches!(err.kind, ProviderErrorKind::Api { status: 429, .. }));
    Ok(())
}

#[tokio::test]
async fn test_empty_reply_is_an_error() -> anyhow::Result<()> {
    let backend = FakeBackend::start(StatusCode::OK, json!({ "choices": [] })).await?;
    let driver = OpenAiDriver::new(
        reqwest::Client::new(),
        &backend.base_url,
        "gpt-test",
        Some("sk-test".to_string()),
    );

    let err = driver
        .generate_response(&context(), &[], "Hello", BUDGET)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ProviderErrorKind::EmptyReply);
    Ok(())
}

#[tokio::test]
async fn test_slow_backend_times_out() -> anyhow::Result<()> {
    let backend = FakeBackend::start_delayed(
        StatusCode::OK,
        json!({ "message": { "content": "too late" } }),
        Duration::from_secs(3),
    )
    .await?;
    let driver = OllamaDriver::new(reqwest::Client::new(), &backend.base_url, "llama3.2");

    let err = driver
        .generate_response(&context(), &[], "Hello", Duration::from_millis(200))
        .await
        .unwrap_err();
    assert!(err.is_timeout());
    Ok(())
}
