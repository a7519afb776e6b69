//! skytalk - talk through your Bluesky timeline with a realtime voice assistant.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use commands::{ChatCommand, DevicesCommand, TimelineCommand};

/// skytalk - a voice assistant that catches you up on your Bluesky timeline.
///
/// Speak to it through your microphone (or type a message and press Enter);
/// it reads your home timeline on demand and answers out loud.
///
/// Credentials come from ~/.skytalk/config.yaml or the environment:
///   OPENAI_API_KEY, BSKY_HANDLE, BSKY_APP_PASSWORD
#[derive(Parser)]
#[command(name = "skytalk")]
#[command(about = "Realtime voice chat about your Bluesky timeline")]
#[command(version)]
pub struct Cli {
    /// Config file (default is ~/.skytalk/config.yaml)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Verbose output
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start a voice conversation (default)
    Chat(ChatCommand),
    /// Print timeline summaries or a post's detail
    Timeline(TimelineCommand),
    /// List audio devices
    Devices(DevicesCommand),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over --verbose
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();

    match &cli.command {
        Some(Commands::Chat(cmd)) => cmd.run(&cli).await,
        Some(Commands::Timeline(cmd)) => cmd.run(&cli).await,
        Some(Commands::Devices(cmd)) => cmd.run(&cli).await,
        None => ChatCommand::default().run(&cli).await,
    }
}
