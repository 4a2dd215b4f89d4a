//! Biography corpus loaded once at startup.

use std::path::Path;

use tracing::{info, warn};

/// `(file name, text)` pairs from the bio directory, in file-name order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BioCorpus {
    documents: Vec<(String, String)>,
}

impl BioCorpus {
    /// Reads every `*.txt` directly inside `dir`.
    ///
    /// Never fails: a missing directory or unreadable files leave the corpus
    /// (partially) empty and are logged.
    pub fn load(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            warn!("bio directory {:?} not found", dir);
            return Self::default();
        }

        let documents: Vec<(String, String)> = rag_store::read_documents(dir)
            .into_iter()
            .map(|d| (d.source, d.text))
            .collect();
        let corpus = Self { documents };

        if corpus.is_empty() {
            warn!("bio directory {:?} has no readable .txt files", dir);
        }
        info!(
            "Loaded {} bio file(s), {} characters",
            corpus.documents.len(),
            corpus.merged().chars().count()
        );
        corpus
    }

    pub fn from_documents(documents: Vec<(String, String)>) -> Self {
        Self { documents }
    }

    /// All texts joined with a blank line.
    pub fn merged(&self) -> String {
        self.documents
            .iter()
            .map(|(_, text)| text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.documents.iter().map(|(name, _)| name.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}
