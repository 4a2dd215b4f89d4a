//! Context + prompt + generation for the portfolio chatbot.
//!
//! Public entry point: [`ChatPipeline::answer`]. It obtains the context block
//! (the whole bio corpus, or top-k chunks from the local vector index), renders
//! the persona prompt with the session history, calls the chat model once and
//! returns the answer, or `None` on failure.

mod bio;
mod cfg;
mod context;
mod error;
mod history;
mod indexer;
mod llm;
mod pipeline;
mod prompt;

pub use bio::BioCorpus;
pub use cfg::{ContextMode, ContextorConfig, DEFAULT_BIO_DIR};
pub use context::{BioContext, ContextFuture, ContextSource, RetrievalContext};
pub use error::ContextorError;
pub use history::{ChatHistory, ChatTurn};
pub use indexer::index_documents;
pub use llm::{AnswerGenerator, ChatFuture, ChatModel};
pub use pipeline::ChatPipeline;
pub use prompt::{NO_HISTORY, PERSONA_TEMPLATE, Persona, PromptContext, PromptTemplate};
