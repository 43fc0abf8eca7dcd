//! MetaMatchup - one matchup per (board, win length) combination
//!
//! Level 2 - Phase-level implementation

use connectx_core::Agent;
use rayon::prelude::*;

use crate::config::{ExecutionMode, TournamentConfig};
use crate::error::{Result, TournamentError};
use crate::matchup::{Matchup, MatchupCounts, MatchupSummary};

/// Two agents across every configured board and win length
pub struct MetaMatchup {
    config: TournamentConfig,
    first: Agent,
    second: Agent,
    matchups: Vec<Matchup>,
    played: bool,
}

impl MetaMatchup {
    pub fn new(config: TournamentConfig, first: Agent, second: Agent) -> Result<Self> {
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
            matchups: Vec::new(),
            played: false,
        })
    }

    pub fn config(&self) -> &TournamentConfig {
        &self.config
    }

    pub fn first_agent(&self) -> &Agent {
        &self.first
    }

    pub fn second_agent(&self) -> &Agent {
        &self.second
    }

    /// Matchups played so far, boards outermost then win lengths
    pub fn matchups(&self) -> &[Matchup] {
        &self.matchups
    }

    /// Play every combination in order; games inside each matchup follow
    /// the configured execution mode
    pub fn play_matchups(&mut self) -> Result<()> {
        let games = self.config.games_per_matchup;
        let mut matchups = Vec::new();
        for matchup_config in self.config.combinations() {
            let mut matchup =
                Matchup::new(matchup_config, self.first.clone(), self.second.clone())?;
            matchup.play(games)?;
            matchups.push(matchup);
        }
        self.finish(matchups);
        Ok(())
    }

    /// Play the combinations themselves concurrently, each one sequentially
    /// inside. Results keep combination order.
    pub fn play_matchups_parallel(&mut self) -> Result<()> {
        let games = self.config.games_per_matchup;
        let (first, second) = (&self.first, &self.second);
        let matchups = self
            .config
            .combinations()
            .into_par_iter()
            .map(|matchup_config| -> Result<Matchup> {
                let config = matchup_config.with_mode(ExecutionMode::Sequential);
                let mut matchup = Matchup::new(config, first.clone(), second.clone())?;
                matchup.play_n_games(games)?;
                Ok(matchup)
            })
            .collect::<Result<Vec<_>>>()?;
        self.finish(matchups);
        Ok(())
    }

    /// Counts summed over every matchup
    pub fn totals(&self) -> MatchupCounts {
        self.matchups
            .iter()
            .map(Matchup::counts)
            .fold(MatchupCounts::default(), |acc, counts| acc.merge(&counts))
    }

    /// Summed percentages and the thresholded verdict
    pub fn summary(&self) -> Result<MatchupSummary> {
        if !self.played {
            return Err(TournamentError::NotPlayed);
        }
        Ok(MatchupSummary::from_counts(
            self.totals(),
            self.first.name(),
            self.second.name(),
            self.config.win_threshold_pct,
        ))
    }

    fn finish(&mut self, matchups: Vec<Matchup>) {
        self.matchups = matchups;
        self.played = true;
        let totals = self.totals();
        tracing::info!(
            first = self.first.name(),
            second = self.second.name(),
            matchups = self.matchups.len(),
            first_wins = totals.first_wins,
            second_wins = totals.second_wins,
            draws = totals.draws,
            "meta matchup complete"
        );
    }
}
