//! Error types for the tournament layer

use connectx_core::MatchError;

/// Errors that abort a Matchup, MetaMatchup or Tournament run.
///
/// Agent misbehaviour never shows up here; it is settled inside each game.
#[derive(Debug, thiserror::Error)]
pub enum TournamentError {
    #[error("protocol violation: {0}")]
    Protocol(#[from] MatchError),

    #[error("results requested before any games were scheduled")]
    NotPlayed,

    #[error("tournament has already been played")]
    AlreadyPlayed,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, TournamentError>;
