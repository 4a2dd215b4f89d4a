mod cli;
mod telemetry;

use std::sync::Arc;

use ai_llm_service::{
    AiLlmError, LlmServiceProfiles,
    config::default_config::{config_chat_from_env, config_embedding_from_env},
};
use anyhow::Context;
use api::core::{app_state::AppState, config::ApiConfig};
use clap::Parser;
use contextor::{ContextorConfig, index_documents};
use rag_store::IndicatifProgress;
use tracing::info;

use crate::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine; the process environment still applies.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let mut api_cfg = ApiConfig::from_env()?;
    let mut ctx_cfg = ContextorConfig::from_env()?;

    telemetry::init(api_cfg.debug).context("failed to install tracing subscriber")?;

    match cli.command.unwrap_or_else(Commands::serve) {
        Commands::Serve { address } => {
            if let Some(address) = address {
                api_cfg.address = address;
            }
            let state = AppState::bootstrap(&api_cfg, &ctx_cfg, llm_profiles());
            api::start(&api_cfg, Arc::new(state)).await?;
        }
        Commands::Index { source, index_dir } => {
            if let Some(dir) = index_dir {
                ctx_cfg.index_dir = dir;
            }
            let svc = Arc::new(llm_profiles().context("language model providers are not configured")?);
            let progress = IndicatifProgress::spinner();
            let report = index_documents(&ctx_cfg, svc, source.as_deref(), &progress).await?;
            info!(
                "Indexed {} document(s) into {} chunk(s) of dim {} at {}",
                report.documents,
                report.chunks,
                report.dim,
                report.index_dir.display()
            );
        }
    }

    Ok(())
}

fn llm_profiles() -> Result<LlmServiceProfiles, AiLlmError> {
    LlmServiceProfiles::new(config_chat_from_env()?, config_embedding_from_env()?, None)
}
