//! Connect-X Tournament - Competition harness for Connect-X agents
//!
//! This crate provides the infrastructure around the game engine:
//! - Timed games with per-move limits and fault capture
//! - Matchups (many games between two agents, alternating starts)
//! - Meta matchups across board sizes and win lengths
//! - Round-robin tournaments with a champion rule
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: Tournament::play_tournament (orchestration)
//! - Level 2: MetaMatchup::play_matchups, Matchup::play_n_games (phases)
//! - Level 3: TimedMatch::play_full_game, determine_champion (steps)
//! - Level 4: configuration, errors

mod config;
mod error;
mod matchup;
mod meta_matchup;
mod timed_match;
mod tournament;

pub use config::{BoardDimension, ExecutionMode, MatchupConfig, TournamentConfig};
pub use error::{Result, TournamentError};
pub use matchup::{
    Matchup, MatchupCounts, MatchupSummary, Side, Verdict, MAX_SAVED_GAMES, NO_CLEAR_WINNER,
};
pub use meta_matchup::MetaMatchup;
pub use timed_match::{GameOutcome, TimedMatch};
pub use tournament::Tournament;
