//! `relay parse` command implementation

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Args;

use crate::command::CommandParser;

#[derive(Args)]
pub struct ParseArgs {
    /// Message text; `-` reads it from stdin
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    text: Vec<String>,

    /// Resolve relative dates against this day (YYYY-MM-DD) instead of today
    #[arg(long)]
    today: Option<String>,

    /// Single-line JSON
    #[arg(long)]
    compact: bool,
}

pub fn run(args: ParseArgs) -> Result<()> {
    let text = super::message_text(&args.text)?;
    let parser = CommandParser::standard();

    let command = match &args.today {
        Some(day) => {
            let today = NaiveDate::parse_from_str(day, "%Y-%m-%d")
                .with_context(|| format!("Invalid --today date: {}", day))?;
            parser.parse_on(&text, today)
        }
        None => parser.parse(&text),
    };

    let json = if args.compact {
        serde_json::to_string(&command)?
    } else {
        serde_json::to_string_pretty(&command)?
    };
    println!("{}", json);
    Ok(())
}
