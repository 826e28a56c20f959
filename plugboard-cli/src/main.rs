use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod host;

#[derive(Parser)]
#[command(name = "plugboard", about = "Plugin host harness for MVU applications")]
#[command(version, propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Host config file (defaults to ~/.config/plugboard/plugins.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a message script against a model
    Replay(commands::replay::ReplayArgs),
    /// List the reference plugins
    Plugins(commands::plugins::PluginsArgs),
    /// Print the message table
    Messages(commands::messages::MessagesArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = host::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Replay(args) => commands::replay::run(args, config),
        Commands::Plugins(args) => commands::plugins::run(args, config),
        Commands::Messages(args) => commands::messages::run(args, config),
    }
}
