use std::{
    path::Path,
    sync::{Arc, Mutex},
    time::Duration,
};

use ai_llm_service::{AiLlmError, ChatMessage, LlmProvider, ProviderError, ProviderErrorKind};
use api::{
    core::{
        app_state::AppState,
        session::{SESSION_COOKIE, SessionStore},
    },
    router,
};
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, Response, StatusCode, header},
};
use contextor::{
    AnswerGenerator, BioContext, BioCorpus, ChatFuture, ChatModel, ChatPipeline, ContextMode,
    Persona, PromptTemplate,
};
use serde_json::{Value, json};
use tower::ServiceExt;

/// Echoes the query and remembers every system prompt it was given.
#[derive(Default)]
struct ScriptedModel {
    system_prompts: Mutex<Vec<String>>,
    fail: bool,
}

impl ChatModel for ScriptedModel {
    fn complete<'a>(&'a self, messages: &'a [ChatMessage]) -> ChatFuture<'a> {
        Box::pin(async move {
            self.system_prompts
                .lock()
                .unwrap()
                .push(messages[0].content.clone());
            if self.fail {
                return Err(AiLlmError::Provider(ProviderError::new(
                    LlmProvider::Ollama,
                    ProviderErrorKind::EmptyChoices,
                )));
            }
            Ok(format!("echo: {}", messages[messages.len() - 1].content))
        })
    }
}

fn state_with(model: Option<Arc<ScriptedModel>>) -> Arc<AppState> {
    let pipeline = model.map(|m| {
        let corpus = BioCorpus::from_documents(vec![(
            "about.txt".into(),
            "Grace builds distributed systems.".into(),
        )]);
        Arc::new(ChatPipeline::new(
            Arc::new(BioContext::new(&corpus)),
            PromptTemplate::new(Persona {
                owner: "Grace".into(),
                contact: None,
            }),
            AnswerGenerator::new(m),
            ContextMode::Bio,
        ))
    });
    Arc::new(AppState::new(
        pipeline,
        None,
        SessionStore::new(Duration::from_secs(3600)),
        "<h1>Grace</h1>".into(),
        ContextMode::Bio,
    ))
}

fn app(state: Arc<AppState>) -> Router {
    router(state, Path::new("static"))
}

fn chat_request(body: &str, cookie: Option<&str>) -> Request<Body> {
    let mut req = Request::builder()
        .method("POST")
        .uri("/chat")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(c) = cookie {
        req = req.header(header::COOKIE, c);
    }
    req.body(Body::from(body.to_string())).unwrap()
}

async fn json_body(res: Response<Body>) -> Value {
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// `name=value` part of the session `Set-Cookie` header.
fn session_cookie_of(res: &Response<Body>) -> String {
    let raw = res
        .headers()
        .get(header::SET_COOKIE)
        .expect("session cookie")
        .to_str()
        .unwrap();
    let pair = raw.split(';').next().unwrap().to_string();
    assert!(pair.starts_with(SESSION_COOKIE));
    pair
}

#[tokio::test]
async fn chat_answers_and_sets_cookie() {
    let model = Arc::new(ScriptedModel::default());
    let res = app(state_with(Some(model.clone())))
        .oneshot(chat_request(r#"{"message":"What do you build?"}"#, None))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().contains_key("x-request-id"));
    session_cookie_of(&res);
    assert_eq!(
        json_body(res).await,
        json!({ "answer": "echo: What do you build?" })
    );
    assert!(model.system_prompts.lock().unwrap()[0].contains("Grace builds distributed systems."));
}

#[tokio::test]
async fn missing_or_blank_message_is_bad_request() {
    let state = state_with(Some(Arc::new(ScriptedModel::default())));
    for body in [
        r#"{}"#,
        r#"{"question":"hi","history":[]}"#,
        r#"{"message":"   "}"#,
        r#"{"message":null}"#,
        r#"{"message":42}"#,
        "not json",
    ] {
        let res = app(state.clone())
            .oneshot(chat_request(body, None))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "body: {body}");
        assert_eq!(json_body(res).await, json!({ "error": "No message provided" }));
    }
}

#[tokio::test]
async fn unavailable_chatbot_wins_over_bad_request() {
    let state = state_with(None);
    for body in [r#"{"message":"hi"}"#, r#"{}"#] {
        let res = app(state.clone())
            .oneshot(chat_request(body, None))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json_body(res).await, json!({ "error": "Chatbot is not available" }));
    }

    let landing = app(state)
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(landing.status(), StatusCode::OK);
}

#[tokio::test]
async fn generation_failure_is_500_and_not_recorded() {
    let model = Arc::new(ScriptedModel {
        fail: true,
        ..ScriptedModel::default()
    });
    let state = state_with(Some(model));
    let res = app(state.clone())
        .oneshot(chat_request(r#"{"message":"hi"}"#, None))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(res).await, json!({ "error": "Failed to generate response" }));
    assert_eq!(state.sessions.len().await, 0);
}

#[tokio::test]
async fn history_follows_the_cookie_and_resets_on_landing() {
    let model = Arc::new(ScriptedModel::default());
    let state = state_with(Some(model.clone()));

    let first = app(state.clone())
        .oneshot(chat_request(r#"{"message":"first"}"#, None))
        .await
        .unwrap();
    let cookie = session_cookie_of(&first);

    app(state.clone())
        .oneshot(chat_request(r#"{"message":"second"}"#, Some(&cookie)))
        .await
        .unwrap();
    {
        let prompts = model.system_prompts.lock().unwrap();
        assert!(prompts[0].contains("No previous messages"));
        assert!(prompts[1].contains("User Input: first; Bot response: echo: first"));
    }

    let landing = app(state.clone())
        .oneshot(
            Request::builder()
                .uri("/")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(landing.status(), StatusCode::OK);
    assert_eq!(session_cookie_of(&landing), cookie);
    let html = to_bytes(landing.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&html[..], b"<h1>Grace</h1>");

    app(state.clone())
        .oneshot(chat_request(r#"{"message":"third"}"#, Some(&cookie)))
        .await
        .unwrap();
    let prompts = model.system_prompts.lock().unwrap();
    assert!(prompts[2].contains("No previous messages"));
}

#[tokio::test]
async fn sessions_do_not_share_history() {
    let model = Arc::new(ScriptedModel::default());
    let state = state_with(Some(model.clone()));

    app(state.clone())
        .oneshot(chat_request(r#"{"message":"mine"}"#, None))
        .await
        .unwrap();
    app(state.clone())
        .oneshot(chat_request(r#"{"message":"yours"}"#, None))
        .await
        .unwrap();

    assert_eq!(state.sessions.len().await, 2);
    let prompts = model.system_prompts.lock().unwrap();
    assert!(prompts[1].contains("No previous messages"));
}

#[tokio::test]
async fn tampered_signed_cookie_starts_a_new_session() {
    let model = Arc::new(ScriptedModel::default());
    let mut state = state_with(Some(model.clone()));
    Arc::get_mut(&mut state).unwrap().sessions =
        SessionStore::new(Duration::from_secs(3600)).with_secret("deploy-secret");

    let first = app(state.clone())
        .oneshot(chat_request(r#"{"message":"first"}"#, None))
        .await
        .unwrap();
    let cookie = session_cookie_of(&first);
    let (name_and_id, tag) = cookie.split_once('.').expect("signed cookie");
    let flipped = if tag.starts_with('0') { "1" } else { "0" };
    let forged = format!("{name_and_id}.{flipped}{}", &tag[1..]);

    let res = app(state.clone())
        .oneshot(chat_request(r#"{"message":"second"}"#, Some(&forged)))
        .await
        .unwrap();
    assert_ne!(session_cookie_of(&res), cookie);
    assert_eq!(state.sessions.len().await, 2);
    {
        let prompts = model.system_prompts.lock().unwrap();
        assert!(prompts[1].contains("No previous messages"));
    }

    app(state.clone())
        .oneshot(chat_request(r#"{"message":"third"}"#, Some(&cookie)))
        .await
        .unwrap();
    let prompts = model.system_prompts.lock().unwrap();
    assert!(prompts[2].contains("User Input: first; Bot response: echo: first"));
}

#[tokio::test]
async fn landing_visits_do_not_grow_the_session_store() {
    let state = state_with(Some(Arc::new(ScriptedModel::default())));
    for _ in 0..20 {
        let res = app(state.clone())
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        session_cookie_of(&res);
    }
    assert_eq!(state.sessions.len().await, 0);
}

#[tokio::test]
async fn health_reports_chatbot_state() {
    let res = app(state_with(None))
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = json_body(res).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["chatbot_available"], false);
    assert_eq!(body["context_mode"], "bio");
    assert_eq!(body["providers"], json!([]));
}

#[tokio::test]
async fn request_id_is_echoed() {
    let res = app(state_with(None))
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("x-request-id", "trace-42")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.headers()["x-request-id"], "trace-42");
}

#[tokio::test]
async fn static_files_are_served() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("style.css"), "body{}").unwrap();
    let res = router(state_with(None), dir.path())
        .oneshot(
            Request::builder()
                .uri("/static/style.css")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"body{}");
}
