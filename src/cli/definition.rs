//! Command-line definition for `relay`

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use super::exec::ExecArgs;
use super::help::HelpTextArgs;
use super::parse::ParseArgs;
#[cfg(feature = "serve")]
use super::serve::ServeArgs;

#[derive(Parser)]
#[command(name = "relay", version, about = "Turn chat task commands into board cards")]
pub struct Cli {
    /// Config file (default: <config dir>/task-relay/config.toml)
    #[arg(long, global = true, env = "TASK_RELAY_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse a message and print the command as JSON
    Parse(ParseArgs),

    /// Run one message against the board and print the reply
    Exec(ExecArgs),

    /// Run the LINE webhook server
    #[cfg(feature = "serve")]
    Serve(ServeArgs),

    /// Print the chat help text
    HelpText(HelpTextArgs),

    /// Generate shell completions
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
