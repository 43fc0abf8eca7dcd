//! Matchup - many games between two agents on one board configuration
//!
//! Level 2 - Phase-level implementation

use std::fmt;

use connectx_core::{Agent, Match, MatchError};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::{ExecutionMode, MatchupConfig};
use crate::error::{Result, TournamentError};
use crate::timed_match::{GameOutcome, TimedMatch};

/// Finished games kept per winning side
pub const MAX_SAVED_GAMES: usize = 5;

/// Label used when neither side clears the threshold
pub const NO_CLEAR_WINNER: &str = "NO_CLEAR_WINNER";

// ============================================================================
// RESULT TYPES
// ============================================================================

/// Win/draw counts from the first agent's point of view
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchupCounts {
    pub first_wins: u32,
    pub second_wins: u32,
    pub draws: u32,
}

impl MatchupCounts {
    pub fn total(&self) -> u32 {
        self.first_wins + self.second_wins + self.draws
    }

    /// Combine two tallies (commutative and associative)
    pub fn merge(&self, other: &MatchupCounts) -> MatchupCounts {
        MatchupCounts {
            first_wins: self.first_wins + other.first_wins,
            second_wins: self.second_wins + other.second_wins,
            draws: self.draws + other.draws,
        }
    }

    fn percentage(&self, count: u32) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            count as f64 * 100.0 / total as f64
        }
    }
}

/// Decision between two agents
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    Winner(String),
    NoClearWinner,
}

impl Verdict {
    /// `first` wins if its percentage leads by at least `threshold` points,
    /// symmetric for `second`, otherwise there is no clear winner
    pub fn decide(
        first: &str,
        second: &str,
        pct_first: f64,
        pct_second: f64,
        threshold: f64,
    ) -> Self {
        if pct_first >= pct_second + threshold {
            Verdict::Winner(first.to_string())
        } else if pct_second >= pct_first + threshold {
            Verdict::Winner(second.to_string())
        } else {
            Verdict::NoClearWinner
        }
    }

    pub fn winner(&self) -> Option<&str> {
        match self {
            Verdict::Winner(name) => Some(name),
            Verdict::NoClearWinner => None,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Winner(name) => f.write_str(name),
            Verdict::NoClearWinner => f.write_str(NO_CLEAR_WINNER),
        }
    }
}

/// Final numbers of a matchup (or of a meta matchup, summed)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchupSummary {
    pub counts: MatchupCounts,
    pub pct_first_wins: f64,
    pub pct_second_wins: f64,
    pub pct_draws: f64,
    pub verdict: Verdict,
}

impl MatchupSummary {
    /// Percentages over the games played and the thresholded verdict.
    /// With no games everything is zero and there is no clear winner.
    pub fn from_counts(counts: MatchupCounts, first: &str, second: &str, threshold: f64) -> Self {
        if counts.total() == 0 {
            return Self {
                counts,
                pct_first_wins: 0.0,
                pct_second_wins: 0.0,
                pct_draws: 0.0,
                verdict: Verdict::NoClearWinner,
            };
        }
        let pct_first_wins = counts.percentage(counts.first_wins);
        let pct_second_wins = counts.percentage(counts.second_wins);
        Self {
            counts,
            pct_first_wins,
            pct_second_wins,
            pct_draws: counts.percentage(counts.draws),
            verdict: Verdict::decide(first, second, pct_first_wins, pct_second_wins, threshold),
        }
    }

    pub fn total_games(&self) -> u32 {
        self.counts.total()
    }
}

/// Which agent of a matchup
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    First,
    Second,
}

// ============================================================================
// MATCHUP
// ============================================================================

/// Repeated games between two agents under one configuration
pub struct Matchup {
    config: MatchupConfig,
    first: Agent,
    second: Agent,
    counts: MatchupCounts,
    /// Games dispatched so far; drives who starts the next game
    games_scheduled: usize,
    played: bool,
    saved_first_games: Vec<Match>,
    saved_second_games: Vec<Match>,
}

impl Matchup {
    pub fn new(config: MatchupConfig, first: Agent, second: Agent) -> Result<Self> {
        config.validate()?;
        if first.name() == second.name() {
            return Err(TournamentError::InvalidConfig(format!(
                "both agents are named {:?}",
                first.name()
            )));
        }
        Ok(Self {
            config,
            first,
            second,
            counts: MatchupCounts::default(),
            games_scheduled: 0,
            played: false,
            saved_first_games: Vec::new(),
            saved_second_games: Vec::new(),
        })
    }

    pub fn config(&self) -> &MatchupConfig {
        &self.config
    }

    pub fn first_agent(&self) -> &Agent {
        &self.first
    }

    pub fn second_agent(&self) -> &Agent {
        &self.second
    }

    pub fn counts(&self) -> MatchupCounts {
        self.counts
    }

    /// Up to [`MAX_SAVED_GAMES`] finished games won by `side`
    pub fn saved_games(&self, side: Side) -> &[Match] {
        match side {
            Side::First => &self.saved_first_games,
            Side::Second => &self.saved_second_games,
        }
    }

    /// Percentages and verdict. Fails if no games were ever scheduled.
    pub fn summary(&self) -> Result<MatchupSummary> {
        if !self.played {
            return Err(TournamentError::NotPlayed);
        }
        Ok(MatchupSummary::from_counts(
            self.counts,
            self.first.name(),
            self.second.name(),
            self.config.win_threshold_pct,
        ))
    }

    /// Play `n` games using the configured execution mode
    pub fn play(&mut self, n: usize) -> Result<()> {
        match self.config.mode {
            ExecutionMode::Sequential => self.play_n_games(n),
            ExecutionMode::Parallel { workers } => self.play_n_games_parallel(n, workers),
        }
    }

    /// Play `n` games one after another, alternating the starting agent
    pub fn play_n_games(&mut self, n: usize) -> Result<()> {
        self.play_batch_with(n, play_single_game)
    }

    /// Play `n` games on a rayon pool of `workers` threads (global pool when
    /// `None`).
    ///
    /// Every game owns its match; outcomes are collected in game order and
    /// merged only after all of them have finished, so the result is the one
    /// a sequential run would produce.
    pub fn play_n_games_parallel(&mut self, n: usize, workers: Option<usize>) -> Result<()> {
        let start = self.games_scheduled;
        let (config, first, second) = (&self.config, &self.first, &self.second);
        let run = || -> std::result::Result<Vec<GameRecord>, MatchError> {
            (start..start + n)
                .into_par_iter()
                .map(|index| play_single_game(config, first, second, index))
                .collect()
        };

        let records = match workers {
            Some(threads) => rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()?
                .install(run)?,
            None => run()?,
        };

        self.commit_batch(records, n);
        Ok(())
    }

    // ========================================================================
    // Level 3 - Steps
    // ========================================================================

    /// Play `n` games in order with `play`. Nothing is recorded unless every
    /// game finishes.
    fn play_batch_with<F>(&mut self, n: usize, mut play: F) -> Result<()>
    where
        F: FnMut(&MatchupConfig, &Agent, &Agent, usize) -> GameResult,
    {
        let start = self.games_scheduled;
        let records = (start..start + n)
            .map(|index| play(&self.config, &self.first, &self.second, index))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        self.commit_batch(records, n);
        Ok(())
    }

    fn commit_batch(&mut self, records: Vec<GameRecord>, n: usize) {
        for record in records {
            self.record(record);
        }
        self.finish_batch(n);
    }

    fn record(&mut self, record: GameRecord) {
        let GameRecord {
            outcome,
            index,
            first_started,
        } = record;
        match outcome.winner.as_deref() {
            Some(name) if name == self.first.name() => {
                self.counts.first_wins += 1;
                if self.saved_first_games.len() < MAX_SAVED_GAMES {
                    self.saved_first_games.push(outcome.game);
                }
            }
            Some(name) if name == self.second.name() => {
                self.counts.second_wins += 1;
                if self.saved_second_games.len() < MAX_SAVED_GAMES {
                    self.saved_second_games.push(outcome.game);
                }
            }
            _ => self.counts.draws += 1,
        }
        tracing::debug!(game = index, first_started, "game recorded");
    }

    fn finish_batch(&mut self, n: usize) {
        self.games_scheduled += n;
        self.played = true;
        tracing::info!(
            first = self.first.name(),
            second = self.second.name(),
            board = %self.config.board,
            win_length = self.config.win_length,
            first_wins = self.counts.first_wins,
            second_wins = self.counts.second_wins,
            draws = self.counts.draws,
            "matchup batch complete"
        );
    }
}

type GameResult = std::result::Result<GameRecord, MatchError>;

/// Outcome with context about which agent started
struct GameRecord {
    outcome: GameOutcome,
    index: usize,
    first_started: bool,
}

/// Play game `index` of a matchup. Even games are started by `first`.
fn play_single_game(
    config: &MatchupConfig,
    first: &Agent,
    second: &Agent,
    index: usize,
) -> GameResult {
    let first_started = index % 2 == 0;
    let (starter, follower) = if first_started {
        (first, second)
    } else {
        (second, first)
    };
    tracing::debug!(game = index, starter = starter.name(), "playing game");

    let outcome = TimedMatch::from_config(config, starter.clone(), follower.clone()).run()?;
    Ok(GameRecord {
        outcome,
        index,
        first_started,
    })
}
