//! `relay exec` command implementation

use anyhow::Result;
use clap::Args;
use std::path::Path;

use crate::processor::MessageProcessor;
use crate::reply::{Formatter, Locale};

#[derive(Args)]
pub struct ExecArgs {
    /// Message text; `-` reads it from stdin
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    text: Vec<String>,

    /// Use an empty in-memory store instead of Focalboard
    #[arg(long)]
    memory: bool,

    /// User id recorded in logs
    #[arg(long, default_value = "cli")]
    user: String,

    /// Reply language (defaults to reply.locale from the config)
    #[arg(long, value_enum)]
    locale: Option<Locale>,

    /// Print the reply as JSON with its success flag
    #[arg(long)]
    json: bool,
}

pub async fn run(config_path: Option<&Path>, args: ExecArgs) -> Result<()> {
    let config = super::load_config(config_path)?;
    let text = super::message_text(&args.text)?;

    let store = super::open_store(&config, args.memory).await?;
    let formatter = Formatter::new(args.locale.unwrap_or(config.reply.locale));
    let processor = MessageProcessor::new(store, formatter);

    let reply = processor.process(&text, &args.user).await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reply)?);
    } else {
        println!("{}", reply.message);
    }

    if !reply.success {
        std::process::exit(1);
    }
    Ok(())
}
