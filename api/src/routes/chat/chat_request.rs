use serde::Deserialize;

/// Request payload for /chat.
#[derive(Debug, Default, Deserialize)]
pub struct ChatRequest {
    /// Visitor's question; absent or blank is a bad request.
    #[serde(default)]
    pub message: Option<String>,
}

impl ChatRequest {
    /// The message if it carries any non-whitespace text.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref().filter(|m| !m.trim().is_empty())
    }
}
