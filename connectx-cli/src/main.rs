//! Connect-X CLI - Command-line interface
//!
//! Commands:
//! - matchup: Many games between two agents on one board
//! - meta-matchup: Two agents across several boards and win lengths
//! - tournament: Round-robin over a roster of agents
//! - play: Play or replay a single game

mod agents;
mod matchup_cmd;
mod meta_cmd;
mod options;
mod play_cmd;
mod report;
mod tournament_cmd;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "connectx")]
#[command(about = "Connect-X agent competition harness")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play many games between two agents
    Matchup(matchup_cmd::MatchupArgs),
    /// Play matchups over every board and win length
    MetaMatchup(meta_cmd::MetaMatchupArgs),
    /// Round-robin tournament
    Tournament(tournament_cmd::TournamentArgs),
    /// Play or replay a single game
    Play(play_cmd::PlayArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Matchup(args) => matchup_cmd::run(args),
        Commands::MetaMatchup(args) => meta_cmd::run(args),
        Commands::Tournament(args) => tournament_cmd::run(args),
        Commands::Play(args) => play_cmd::run(args),
    }
}
