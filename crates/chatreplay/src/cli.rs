use clap::{Parser, Subcommand};

use crate::error::Result;
use crate::inspect::{InspectArgs, run_inspect};
use crate::logging::{self, LogArgs};
use crate::play::{PlayArgs, run_play};

#[derive(Debug, Parser)]
#[command(
    name = "chatreplay",
    about = "Replay a recorded live-stream chat log in sync with playback time",
    version
)]
pub struct Cli {
    #[command(flatten)]
    pub log: LogArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Replay a chat log in the terminal.
    Play(PlayArgs),

    /// Load a chat log and summarize what was parsed.
    Inspect(InspectArgs),
}

pub fn run_from_env() -> Result<()> {
    let cli = Cli::parse();
    run(cli)
}

pub fn run(cli: Cli) -> Result<()> {
    let interactive = match &cli.command {
        Commands::Play(args) => args.is_interactive(),
        Commands::Inspect(_) => false,
    };
    logging::init(&cli.log, interactive)?;

    match cli.command {
        Commands::Play(args) => run_play(args),
        Commands::Inspect(args) => run_inspect(args),
    }
}
