//! `relay serve` command implementation

use anyhow::{Context, Result};
use clap::Args;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use crate::processor::MessageProcessor;
use crate::reply::Formatter;
use crate::server::{self, AppState};

#[derive(Args)]
pub struct ServeArgs {
    /// Address to listen on (default: server.host:server.port from the config)
    #[arg(long)]
    bind: Option<String>,

    /// Keep tasks in memory instead of Focalboard
    #[arg(long)]
    memory: bool,
}

pub async fn run(config_path: Option<&Path>, args: ServeArgs) -> Result<()> {
    let config = super::load_config(config_path)?;
    if args.memory {
        if !config.line.skip_signature && config.line.channel_secret.is_none() {
            warn!("No channel secret configured; every webhook will be rejected");
        }
    } else {
        config
            .validate_for_serve()
            .context("Configuration is incomplete for serving")?;
    }

    let store = super::open_store(&config, args.memory).await?;
    info!(store = store.name(), locale = %config.reply.locale, "Starting webhook server");

    let processor = MessageProcessor::new(store, Formatter::new(config.reply.locale));
    let state = AppState::from_config(&config, processor)?;

    let addr = args.bind.unwrap_or_else(|| config.server.bind_addr());
    server::serve(Arc::new(state), &addr).await?;
    Ok(())
}
