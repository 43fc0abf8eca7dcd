//! Configuration types for matchups and tournaments
//!
//! Level 4 - Utilities and configuration

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TournamentError};

/// Board size for one configuration
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoardDimension {
    pub columns: usize,
    pub rows: usize,
}

impl BoardDimension {
    pub const fn new(columns: usize, rows: usize) -> Self {
        Self { columns, rows }
    }
}

impl Default for BoardDimension {
    fn default() -> Self {
        Self::new(7, 6)
    }
}

impl fmt::Display for BoardDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.columns, self.rows)
    }
}

/// Parses `"7x6"` (columns x rows)
impl FromStr for BoardDimension {
    type Err = TournamentError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || {
            TournamentError::InvalidConfig(format!(
                "bad board dimension {:?}, expected COLSxROWS",
                s
            ))
        };
        let (columns, rows) = s.trim().split_once(['x', 'X']).ok_or_else(invalid)?;
        let columns = columns.trim().parse().map_err(|_| invalid())?;
        let rows = rows.trim().parse().map_err(|_| invalid())?;
        Ok(Self::new(columns, rows))
    }
}

/// How the games of a matchup are scheduled
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionMode {
    /// One game after another on the calling thread
    #[default]
    Sequential,
    /// Games spread over a rayon pool (`None` = global pool)
    Parallel { workers: Option<usize> },
}

/// Configuration for a single matchup (one board, one win length)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchupConfig {
    pub board: BoardDimension,
    pub win_length: usize,
    /// Per-move time limit in milliseconds
    pub time_limit_ms: u64,
    /// Percentage points one side must lead by to be declared winner
    pub win_threshold_pct: f64,
    /// Run every agent call on its own thread so timeouts can be enforced
    pub isolate_agents: bool,
    pub mode: ExecutionMode,
}

impl Default for MatchupConfig {
    fn default() -> Self {
        Self {
            board: BoardDimension::default(),
            win_length: 4,
            time_limit_ms: 1000,
            win_threshold_pct: 5.0,
            isolate_agents: true,
            mode: ExecutionMode::Sequential,
        }
    }
}

impl MatchupConfig {
    /// Create config for a board and win length, defaults elsewhere
    pub fn new(board: BoardDimension, win_length: usize) -> Self {
        Self {
            board,
            win_length,
            ..Default::default()
        }
    }

    pub fn time_limit(&self) -> Duration {
        Duration::from_millis(self.time_limit_ms)
    }

    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit_ms = limit.as_millis() as u64;
        self
    }

    pub fn with_threshold(mut self, pct: f64) -> Self {
        self.win_threshold_pct = pct;
        self
    }

    pub fn with_isolation(mut self, isolate: bool) -> Self {
        self.isolate_agents = isolate;
        self
    }

    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.board.columns == 0 || self.board.rows == 0 {
            return Err(TournamentError::InvalidConfig(format!(
                "board {} has no cells",
                self.board
            )));
        }
        if self.win_length == 0 {
            return Err(TournamentError::InvalidConfig(
                "win length must be at least 1".to_string(),
            ));
        }
        validate_common(self.win_threshold_pct, self.mode)
    }
}

/// Tournament (and meta matchup) configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TournamentConfig {
    pub board_dimensions: Vec<BoardDimension>,
    pub win_lengths: Vec<usize>,
    pub time_limit_ms: u64,
    pub win_threshold_pct: f64,
    /// Games per (board, win length) matchup; should be even so starts balance
    pub games_per_matchup: usize,
    pub isolate_agents: bool,
    pub mode: ExecutionMode,
}

impl Default for TournamentConfig {
    fn default() -> Self {
        Self {
            board_dimensions: vec![BoardDimension::new(7, 6)],
            win_lengths: vec![4],
            time_limit_ms: 1000,
            win_threshold_pct: 5.0,
            games_per_matchup: 100,
            isolate_agents: true,
            mode: ExecutionMode::Sequential,
        }
    }
}

impl TournamentConfig {
    /// Create config covering the given boards and win lengths
    pub fn new(board_dimensions: Vec<BoardDimension>, win_lengths: Vec<usize>) -> Self {
        Self {
            board_dimensions,
            win_lengths,
            ..Default::default()
        }
    }

    pub fn with_games(mut self, games_per_matchup: usize) -> Self {
        self.games_per_matchup = games_per_matchup;
        self
    }

    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit_ms = limit.as_millis() as u64;
        self
    }

    pub fn with_threshold(mut self, pct: f64) -> Self {
        self.win_threshold_pct = pct;
        self
    }

    pub fn with_isolation(mut self, isolate: bool) -> Self {
        self.isolate_agents = isolate;
        self
    }

    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Matchup config for one (board, win length) combination
    pub fn matchup_config(&self, board: BoardDimension, win_length: usize) -> MatchupConfig {
        MatchupConfig {
            board,
            win_length,
            time_limit_ms: self.time_limit_ms,
            win_threshold_pct: self.win_threshold_pct,
            isolate_agents: self.isolate_agents,
            mode: self.mode,
        }
    }

    /// Every (board, win length) combination, boards outermost
    pub fn combinations(&self) -> Vec<MatchupConfig> {
        self.board_dimensions
            .iter()
            .flat_map(|&board| {
                self.win_lengths
                    .iter()
                    .map(move |&win_length| self.matchup_config(board, win_length))
            })
            .collect()
    }

    pub fn validate(&self) -> Result<()> {
        if self.board_dimensions.is_empty() || self.win_lengths.is_empty() {
            return Err(TournamentError::InvalidConfig(
                "need at least one board dimension and one win length".to_string(),
            ));
        }
        self.combinations().iter().try_for_each(MatchupConfig::validate)
    }
}

fn validate_common(threshold: f64, mode: ExecutionMode) -> Result<()> {
    if !threshold.is_finite() || threshold < 0.0 {
        return Err(TournamentError::InvalidConfig(format!(
            "win threshold must be a non-negative percentage, got {}",
            threshold
        )));
    }
    if let ExecutionMode::Parallel { workers: Some(0) } = mode {
        return Err(TournamentError::InvalidConfig(
            "parallel mode needs at least one worker".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matchup_config_defaults() {
        let config = MatchupConfig::default();
        assert_eq!(config.board, BoardDimension::new(7, 6));
        assert_eq!(config.win_length, 4);
        assert_eq!(config.time_limit(), Duration::from_secs(1));
        assert!(config.isolate_agents);
        assert_eq!(config.mode, ExecutionMode::Sequential);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_board_dimension_parse() {
        assert_eq!("8x7".parse::<BoardDimension>().unwrap(), BoardDimension::new(8, 7));
        assert_eq!(" 10X10 ".parse::<BoardDimension>().unwrap(), BoardDimension::new(10, 10));
        assert!("8by7".parse::<BoardDimension>().is_err());
        assert!("x7".parse::<BoardDimension>().is_err());
        assert_eq!(BoardDimension::new(9, 8).to_string(), "9x8");
    }

    #[test]
    fn test_matchup_config_validation() {
        assert!(MatchupConfig::new(BoardDimension::new(0, 6), 4).validate().is_err());
        assert!(MatchupConfig::new(BoardDimension::new(7, 6), 0).validate().is_err());
        assert!(MatchupConfig::default().with_threshold(-1.0).validate().is_err());
        assert!(MatchupConfig::default()
            .with_mode(ExecutionMode::Parallel { workers: Some(0) })
            .validate()
            .is_err());
        // Unreachable win lengths are allowed
        assert!(MatchupConfig::new(BoardDimension::new(3, 3), 9).validate().is_ok());
    }

    #[test]
    fn test_tournament_combinations_order() {
        let config = TournamentConfig::new(
            vec![BoardDimension::new(7, 6), BoardDimension::new(8, 7)],
            vec![4, 5, 6],
        )
        .with_threshold(10.0);
        let combos = config.combinations();
        assert_eq!(combos.len(), 6);
        assert_eq!(combos[0].board, BoardDimension::new(7, 6));
        assert_eq!(combos[0].win_length, 4);
        assert_eq!(combos[2].win_length, 6);
        assert_eq!(combos[3].board, BoardDimension::new(8, 7));
        assert!(combos.iter().all(|c| c.win_threshold_pct == 10.0));
    }

    #[test]
    fn test_tournament_config_validation() {
        assert!(TournamentConfig::default().validate().is_ok());
        assert!(TournamentConfig::new(vec![], vec![4]).validate().is_err());
        assert!(TournamentConfig::new(vec![BoardDimension::new(7, 6)], vec![0])
            .validate()
            .is_err());
    }

    #[test]
    fn test_config_json_partial() {
        let config: TournamentConfig =
            serde_json::from_str(r#"{"win_lengths": [4, 5], "games_per_matchup": 10}"#).unwrap();
        assert_eq!(config.win_lengths, vec![4, 5]);
        assert_eq!(config.games_per_matchup, 10);
        assert_eq!(config.board_dimensions, vec![BoardDimension::new(7, 6)]);
        assert!(config.isolate_agents);
    }
}
