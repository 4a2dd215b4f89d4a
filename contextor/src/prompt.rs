//! Prompt builder: persona system message with context and history, then the raw query.

use ai_llm_service::ChatMessage;

/// Substituted for an empty chat history.
pub const NO_HISTORY: &str = "No previous messages";

/// Persona system template.
///
/// Placeholders: `{owner}`, `{contact_hint}`, `{context}`, `{chat_history}`.
pub const PERSONA_TEMPLATE: &str = "\
You are the Artificial Intelligence Delegate of {owner}, an AI assistant dedicated to helping people learn about {owner}.

**Instructions:**
1. Use the context below to answer questions about {owner} accurately and concisely.
2. Keep responses friendly, professional, and to the point.
3. If asked about information not in the context, politely suggest contacting {owner} directly{contact_hint}.
4. Be helpful and engaging in your responses.

**Context about {owner}:**
{context}

**Previous Chat History:**
{chat_history}";

/// Who the assistant speaks for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Persona {
    pub owner: String,
    pub contact: Option<String>,
}

impl Default for Persona {
    fn default() -> Self {
        Self {
            owner: "the portfolio owner".into(),
            contact: None,
        }
    }
}

/// Per-request values fed into the template.
#[derive(Clone, Debug, Default)]
pub struct PromptContext {
    pub context: String,
    /// Rendered chat history; empty means no prior turns.
    pub history: String,
    pub user_query: String,
}

#[derive(Clone, Debug, Default)]
pub struct PromptTemplate {
    persona: Persona,
}

impl PromptTemplate {
    pub fn new(persona: Persona) -> Self {
        Self { persona }
    }

    pub fn persona(&self) -> &Persona {
        &self.persona
    }

    /// Renders `[System(persona + context + history), User(query)]`.
    pub fn render(&self, ctx: &PromptContext) -> Vec<ChatMessage> {
        let contact_hint = self
            .persona
            .contact
            .as_deref()
            .map(|c| format!(" ({c})"))
            .unwrap_or_default();
        let history = if ctx.history.trim().is_empty() {
            NO_HISTORY
        } else {
            ctx.history.as_str()
        };

        let system = fill(
            PERSONA_TEMPLATE,
            &[
                ("owner", self.persona.owner.as_str()),
                ("contact_hint", contact_hint.as_str()),
                ("context", ctx.context.as_str()),
                ("chat_history", history),
            ],
        );

        vec![
            ChatMessage::system(system),
            ChatMessage::user(ctx.user_query.clone()),
        ]
    }
}

/// Single-pass `{name}` substitution; substituted values are never rescanned.
fn fill(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len() + vars.iter().map(|(_, v)| v.len()).sum::<usize>());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let hit = after.find('}').and_then(|close| {
            let name = &after[..close];
            vars.iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| (*v, close))
        });
        match hit {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
