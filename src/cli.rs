//! Command-line interface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about = "Portfolio chatbot backend", long_about = None, propagate_version = true)]
pub struct Cli {
    /// Defaults to `serve`.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP server.
    Serve {
        /// Listen address, overrides `API_ADDRESS`.
        #[arg(long, env = "API_ADDRESS")]
        address: Option<String>,
    },

    /// Chunk, embed and persist the documents into the vector index.
    Index {
        /// File or directory of `.txt` documents, overrides `DOCS_PATH`.
        #[arg(long, short = 's')]
        source: Option<PathBuf>,

        /// Output directory, overrides `INDEX_DIR`.
        #[arg(long)]
        index_dir: Option<PathBuf>,
    },
}

impl Commands {
    pub fn serve() -> Self {
        Commands::Serve { address: None }
    }
}
