//! `relay help-text` command implementation

use anyhow::Result;
use clap::Args;

use crate::reply::{Formatter, Locale};

#[derive(Args)]
pub struct HelpTextArgs {
    /// Language of the help text
    #[arg(long, value_enum, default_value_t = Locale::ZhTw)]
    locale: Locale,

    /// Print the welcome messages as well
    #[arg(long)]
    welcome: bool,
}

pub fn run(args: HelpTextArgs) -> Result<()> {
    let formatter = Formatter::new(args.locale);
    println!("{}", formatter.help_text());
    if args.welcome {
        println!("\n{}\n\n{}", formatter.follow_text(), formatter.join_text());
    }
    Ok(())
}
