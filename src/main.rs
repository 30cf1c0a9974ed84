//! relay - LINE to Focalboard task bot

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use task_relay::cli::{self, Cli, Commands};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let default_filter = if std::env::var("TASK_RELAY_DEBUG").is_ok() {
        "task_relay=debug,tower_http=debug"
    } else {
        "task_relay=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Parse(args) => cli::parse::run(args),
        Commands::Exec(args) => cli::exec::run(config_path, args).await,
        #[cfg(feature = "serve")]
        Commands::Serve(args) => cli::serve::run(config_path, args).await,
        Commands::HelpText(args) => cli::help::run(args),
        Commands::Completion { shell } => {
            generate(shell, &mut Cli::command(), "relay", &mut std::io::stdout());
            Ok(())
        }
    }
}
