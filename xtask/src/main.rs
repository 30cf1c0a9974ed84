//! xtask - Development tasks for task-relay

use clap::{Parser, Subcommand};
use std::fs;
use std::path::Path;

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Development tasks for task-relay")]
struct Xtask {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate CLI documentation from clap definitions
    GenDocs,
    /// Write the chat usage text for every locale to docs/chat
    GenHelp,
}

fn main() {
    let args = Xtask::parse();
    match args.command {
        Commands::GenDocs => generate_cli_docs(),
        Commands::GenHelp => generate_help_docs(),
    }
}

fn generate_cli_docs() {
    let markdown = clap_markdown::help_markdown::<task_relay::cli::Cli>();

    let docs_dir = Path::new("docs/cli");
    fs::create_dir_all(docs_dir).expect("Failed to create docs/cli directory");

    let output_path = docs_dir.join("reference.md");
    fs::write(&output_path, markdown).expect("Failed to write CLI reference");

    println!("Generated CLI documentation at {}", output_path.display());
}

fn generate_help_docs() {
    use task_relay::reply::{Formatter, Locale};

    let docs_dir = Path::new("docs/chat");
    fs::create_dir_all(docs_dir).expect("Failed to create docs/chat directory");

    for locale in [Locale::ZhTw, Locale::En] {
        let text = Formatter::new(locale).help_text();
        let output_path = docs_dir.join(format!("help.{}.txt", locale.code()));
        fs::write(&output_path, text).expect("Failed to write help text");
        println!("Generated chat help at {}", output_path.display());
    }
}
