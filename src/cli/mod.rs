//! CLI command implementations

pub mod definition;
pub mod exec;
pub mod help;
pub mod parse;
#[cfg(feature = "serve")]
pub mod serve;

pub use definition::{Cli, Commands};

use anyhow::{Context, Result};
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use crate::board::{FocalboardStore, MemoryStore, TaskStore};
use crate::config::Config;

/// Load the config file given on the command line, or the usual one
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let mut config = match path {
        Some(path) => Config::from_path(path)?,
        None => return Config::load().context("Failed to load configuration"),
    };
    config.apply_env()?;
    Ok(config)
}

/// Message text from arguments; a lone `-` reads stdin
pub fn message_text(parts: &[String]) -> Result<String> {
    if let [only] = parts {
        if only == "-" {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read message from stdin")?;
            return Ok(text);
        }
    }
    Ok(parts.join(" "))
}

/// In-memory store, or the configured Focalboard board
pub async fn open_store(config: &Config, memory: bool) -> Result<Arc<dyn TaskStore>> {
    if memory {
        return Ok(Arc::new(MemoryStore::new()));
    }

    let store = FocalboardStore::new(config.board.clone())?;
    let board = store
        .initialize()
        .await
        .with_context(|| format!("Failed to open a board at {}", config.board.api_url))?
        .to_string();
    tracing::info!(board = %board, "Board ready");
    Ok(Arc::new(store))
}
