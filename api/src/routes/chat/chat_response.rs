use serde::Serialize;

/// Response payload for /chat.
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub answer: String,
}
