use ai_llm_service::{
    AiLlmError, ChatMessage, LlmModelConfig, LlmProvider, LlmServiceProfiles, ProviderErrorKind,
    services::{
        gemini_service::GeminiService, ollama_service::OllamaService,
        open_ai_service::OpenAiService,
    },
};
use httpmock::prelude::*;
use serde_json::json;

fn cfg(provider: LlmProvider, endpoint: String, model: &str) -> LlmModelConfig {
    LlmModelConfig {
        provider,
        model: model.into(),
        endpoint,
        api_key: match provider {
            LlmProvider::Ollama => None,
            _ => Some("test-key".into()),
        },
        max_tokens: Some(256),
        temperature: Some(0.7),
        top_p: None,
        timeout_secs: Some(5),
    }
}

fn conversation() -> Vec<ChatMessage> {
    vec![
        ChatMessage::system("You are a portfolio assistant."),
        ChatMessage::user("What does Ada do?"),
    ]
}

#[tokio::test]
async fn ollama_chat_returns_message_content() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/chat")
                .body_includes("\"stream\":false")
                .body_includes("\"role\":\"system\"");
            then.status(200).json_body(json!({
                "model": "llama3.1",
                "message": { "role": "assistant", "content": "Ada builds compilers." },
                "done": true
            }));
        })
        .await;

    let svc = OllamaService::new(cfg(LlmProvider::Ollama, server.base_url(), "llama3.1")).unwrap();
    let answer = svc.chat(&conversation()).await.unwrap();

    mock.assert_async().await;
    assert_eq!(answer, "Ada builds compilers.");
}

#[tokio::test]
async fn ollama_embed_returns_first_vector() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/embed");
            then.status(200)
                .json_body(json!({ "embeddings": [[0.1, 0.2, 0.3]] }));
        })
        .await;

    let svc =
        OllamaService::new(cfg(LlmProvider::Ollama, server.base_url(), "nomic-embed-text")).unwrap();
    let v = svc.embeddings("hello").await.unwrap();
    assert_eq!(v, vec![0.1, 0.2, 0.3]);
}

#[tokio::test]
async fn openai_chat_sends_bearer_and_reads_first_choice() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/chat/completions")
                .header("authorization", "Bearer test-key");
            then.status(200).json_body(json!({
                "choices": [ { "message": { "role": "assistant", "content": "Hi there" } } ]
            }));
        })
        .await;

    let svc = OpenAiService::new(cfg(LlmProvider::OpenAI, server.base_url(), "gpt-4o-mini")).unwrap();
    let answer = svc.chat(&conversation()).await.unwrap();

    mock.assert_async().await;
    assert_eq!(answer, "Hi there");
}

#[tokio::test]
async fn openai_non_success_maps_to_http_status() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(429).body("rate limited");
        })
        .await;

    let svc = OpenAiService::new(cfg(LlmProvider::OpenAI, server.base_url(), "gpt-4o-mini")).unwrap();
    let err = svc.chat(&conversation()).await.unwrap_err();

    match err {
        AiLlmError::Provider(e) => match e.kind {
            ProviderErrorKind::HttpStatus(http) => {
                assert_eq!(http.status.as_u16(), 429);
                assert!(http.snippet.contains("rate limited"));
            }
            other => panic!("unexpected kind: {other:?}"),
        },
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn gemini_chat_moves_system_prompt_out_of_band() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1beta/models/gemini-2.5-flash:generateContent")
                .header("x-goog-api-key", "test-key")
                .body_includes("\"systemInstruction\"")
                .body_includes("\"generationConfig\"");
            then.status(200).json_body(json!({
                "candidates": [
                    { "content": { "role": "model", "parts": [ { "text": "Ada " }, { "text": "writes Rust." } ] } }
                ]
            }));
        })
        .await;

    let svc =
        GeminiService::new(cfg(LlmProvider::Gemini, server.base_url(), "gemini-2.5-flash")).unwrap();
    let answer = svc.chat(&conversation()).await.unwrap();

    mock.assert_async().await;
    assert_eq!(answer, "Ada writes Rust.");
}

#[tokio::test]
async fn gemini_empty_candidates_is_an_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1beta/models/gemini-2.5-flash:generateContent");
            then.status(200).json_body(json!({ "candidates": [] }));
        })
        .await;

    let svc =
        GeminiService::new(cfg(LlmProvider::Gemini, server.base_url(), "gemini-2.5-flash")).unwrap();
    let err = svc.chat(&conversation()).await.unwrap_err();
    assert!(matches!(
        err,
        AiLlmError::Provider(ref e) if matches!(e.kind, ProviderErrorKind::EmptyChoices)
    ));
}

#[tokio::test]
async fn gemini_embed_content_returns_values() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1beta/models/text-embedding-004:embedContent");
            then.status(200)
                .json_body(json!({ "embedding": { "values": [1.0, 0.0] } }));
        })
        .await;

    let svc = GeminiService::new(cfg(
        LlmProvider::Gemini,
        server.base_url(),
        "models/text-embedding-004",
    ))
    .unwrap();
    assert_eq!(svc.embeddings("text").await.unwrap(), vec![1.0, 0.0]);
}

#[tokio::test]
async fn profiles_route_chat_and_embedding_and_report_health() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/chat");
            then.status(200)
                .json_body(json!({ "message": { "role": "assistant", "content": "ok" } }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/embed");
            then.status(200).json_body(json!({ "embeddings": [[0.5, 0.5]] }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/tags");
            then.status(200).json_body(json!({
                "models": [ { "name": "llama3.1:latest" }, { "name": "nomic-embed-text:latest" } ]
            }));
        })
        .await;

    let svc = LlmServiceProfiles::new(
        cfg(LlmProvider::Ollama, server.base_url(), "llama3.1"),
        cfg(LlmProvider::Ollama, server.base_url(), "nomic-embed-text"),
        Some(5),
    )
    .unwrap();

    assert_eq!(svc.chat(&conversation()).await.unwrap(), "ok");
    assert_eq!(svc.embed("x").await.unwrap(), vec![0.5, 0.5]);

    let health = svc.health_all().await;
    assert_eq!(health.len(), 2);
    assert!(health.iter().all(|h| h.ok), "{health:?}");
}

#[tokio::test]
async fn health_reports_failure_instead_of_erroring() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v1beta/models/gemini-2.5-flash");
            then.status(403).body("API key not valid");
        })
        .await;

    let health = ai_llm_service::HealthService::new(Some(5)).unwrap();
    let status = health
        .check(&cfg(LlmProvider::Gemini, server.base_url(), "gemini-2.5-flash"))
        .await;
    assert!(!status.ok);
    assert!(status.message.contains("403"));
}
