//! Options shared by the matchup, meta-matchup and tournament commands
//!
//! Level 4 - Configuration

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;

use connectx_tournament::{BoardDimension, ExecutionMode, MatchupConfig, TournamentConfig};

#[derive(Args, Debug, Clone)]
pub struct HarnessArgs {
    /// JSON config file (TournamentConfig fields); flags override it
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Board size as COLSxROWS (repeat for meta matchups and tournaments)
    #[arg(long = "board", value_name = "COLSxROWS")]
    pub boards: Vec<BoardDimension>,

    /// Tokens in a row needed to win (repeatable)
    #[arg(long = "win-length", value_name = "N")]
    pub win_lengths: Vec<usize>,

    /// Games per matchup (use an even number so starts balance)
    #[arg(long)]
    pub games: Option<usize>,

    /// Per-move time limit in milliseconds
    #[arg(long, value_name = "MS")]
    pub time_limit_ms: Option<u64>,

    /// Percentage points one agent must lead by to win
    #[arg(long, value_name = "PCT")]
    pub threshold: Option<f64>,

    /// Play games on a thread pool
    #[arg(long)]
    pub parallel: bool,

    /// Worker threads for --parallel (default: one per core)
    #[arg(long, requires = "parallel")]
    pub workers: Option<usize>,

    /// Call agents on the driver thread (no time limit enforcement)
    #[arg(long)]
    pub no_isolation: bool,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,

    /// Directory to write text reports into
    #[arg(long, value_name = "DIR")]
    pub report_dir: Option<PathBuf>,
}

impl HarnessArgs {
    /// Defaults, then the config file, then flags
    pub fn tournament_config(&self) -> Result<TournamentConfig> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => TournamentConfig::default(),
        };

        if !self.boards.is_empty() {
            config.board_dimensions = self.boards.clone();
        }
        if !self.win_lengths.is_empty() {
            config.win_lengths = self.win_lengths.clone();
        }
        if let Some(games) = self.games {
            config.games_per_matchup = games;
        }
        if let Some(ms) = self.time_limit_ms {
            config = config.with_time_limit(Duration::from_millis(ms));
        }
        if let Some(pct) = self.threshold {
            config = config.with_threshold(pct);
        }
        if self.parallel {
            config = config.with_mode(ExecutionMode::Parallel {
                workers: self.workers,
            });
        }
        if self.no_isolation {
            config = config.with_isolation(false);
        }

        config.validate()?;
        Ok(config)
    }

    /// Single-matchup config: the first board and win length
    pub fn matchup_config(&self) -> Result<(MatchupConfig, usize)> {
        let config = self.tournament_config()?;
        if config.board_dimensions.len() > 1 || config.win_lengths.len() > 1 {
            tracing::warn!("matchup uses only the first board and win length");
        }
        let matchup = config
            .combinations()
            .into_iter()
            .next()
            .context("no board and win length configured")?;
        Ok((matchup, config.games_per_matchup))
    }
}

fn load_config(path: &PathBuf) -> Result<TournamentConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse config: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare() -> HarnessArgs {
        HarnessArgs {
            config: None,
            boards: Vec::new(),
            win_lengths: Vec::new(),
            games: None,
            time_limit_ms: None,
            threshold: None,
            parallel: false,
            workers: None,
            no_isolation: false,
            json: false,
            report_dir: None,
        }
    }

    #[test]
    fn test_defaults_without_flags() {
        let config = bare().tournament_config().unwrap();
        assert_eq!(config, TournamentConfig::default());
    }

    #[test]
    fn test_flags_override() {
        let args = HarnessArgs {
            boards: vec![BoardDimension::new(8, 7), BoardDimension::new(9, 8)],
            win_lengths: vec![5],
            games: Some(12),
            time_limit_ms: Some(250),
            threshold: Some(10.0),
            parallel: true,
            workers: Some(2),
            no_isolation: true,
            ..bare()
        };
        let config = args.tournament_config().unwrap();
        assert_eq!(config.board_dimensions.len(), 2);
        assert_eq!(config.win_lengths, vec![5]);
        assert_eq!(config.games_per_matchup, 12);
        assert_eq!(config.time_limit_ms, 250);
        assert_eq!(config.win_threshold_pct, 10.0);
        assert_eq!(config.mode, ExecutionMode::Parallel { workers: Some(2) });
        assert!(!config.isolate_agents);

        let (matchup, games) = args.matchup_config().unwrap();
        assert_eq!(matchup.board, BoardDimension::new(8, 7));
        assert_eq!(games, 12);
    }

    #[test]
    fn test_invalid_flags_rejected() {
        let args = HarnessArgs {
            win_lengths: vec![0],
            ..bare()
        };
        assert!(args.tournament_config().is_err());
    }
}
