//! Per-session chat history.

use std::fmt::Write as _;

/// One completed exchange.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatTurn {
    pub user: String,
    pub bot: String,
}

/// Ordered, append-only record of a session's exchanges.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChatHistory {
    turns: Vec<ChatTurn>,
}

impl ChatHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, user: impl Into<String>, bot: impl Into<String>) {
        self.turns.push(ChatTurn {
            user: user.into(),
            bot: bot.into(),
        });
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Text block handed to the prompt, one line per turn.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for t in &self.turns {
            let _ = writeln!(out, "User Input: {}; Bot response: {}", t.user, t.bot);
        }
        out
    }
}
