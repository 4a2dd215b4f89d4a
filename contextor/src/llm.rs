//! Answer generation over a chat model.

use std::{future::Future, pin::Pin, sync::Arc, time::Instant};

use ai_llm_service::{AiLlmError, ChatMessage, LlmServiceProfiles};
use tracing::{error, info};

pub type ChatFuture<'a> = Pin<Box<dyn Future<Output = Result<String, AiLlmError>> + Send + 'a>>;

/// A model that turns an ordered message list into a reply.
pub trait ChatModel: Send + Sync {
    fn complete<'a>(&'a self, messages: &'a [ChatMessage]) -> ChatFuture<'a>;
}

impl ChatModel for LlmServiceProfiles {
    fn complete<'a>(&'a self, messages: &'a [ChatMessage]) -> ChatFuture<'a> {
        Box::pin(self.chat(messages))
    }
}

/// Single-attempt generator; failures are logged and become `None`.
#[derive(Clone)]
pub struct AnswerGenerator {
    model: Arc<dyn ChatModel>,
}

impl AnswerGenerator {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model }
    }

    pub async fn generate(&self, messages: &[ChatMessage]) -> Option<String> {
        let started = Instant::now();
        match self.model.complete(messages).await {
            Ok(answer) => {
                info!(
                    latency_ms = started.elapsed().as_millis(),
                    answer_chars = answer.chars().count(),
                    "answer generated"
                );
                Some(answer)
            }
            Err(e) => {
                error!(
                    error = %e,
                    latency_ms = started.elapsed().as_millis(),
                    "answer generation failed"
                );
                None
            }
        }
    }
}
