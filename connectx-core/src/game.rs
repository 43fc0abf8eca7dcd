//! Match state machine: legality, move application, win/draw detection

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::board::Board;

// ============================================================================
// CORE TYPES
// ============================================================================

/// Why a move was rejected
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum IllegalMove {
    /// The answer could not be read as a column number
    NotAnInteger { input: String },
    /// Column outside `[0, columns)`
    OutOfBounds { column: i64 },
    /// Column has no empty row left
    ColumnFull { column: usize },
}

impl fmt::Display for IllegalMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IllegalMove::NotAnInteger { input } => {
                write!(f, "Column must be an integer (got {:?}).", input)
            }
            IllegalMove::OutOfBounds { column } => {
                write!(f, "Played outside of the board (column {}).", column)
            }
            IllegalMove::ColumnFull { column } => {
                write!(f, "Tried to play in a full column ({}).", column)
            }
        }
    }
}

/// Match state. Every variant except `InProgress` is terminal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchState {
    InProgress,
    Win { winner: String },
    Draw,
    IllegalMove { winner: String, reason: IllegalMove },
    TimeLimitExceeded { winner: String },
    AgentError { winner: String, diagnostic: String },
}

impl MatchState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, MatchState::InProgress)
    }

    /// Winner name, `None` while in progress or for a draw
    pub fn winner(&self) -> Option<&str> {
        match self {
            MatchState::InProgress | MatchState::Draw => None,
            MatchState::Win { winner }
            | MatchState::IllegalMove { winner, .. }
            | MatchState::TimeLimitExceeded { winner }
            | MatchState::AgentError { winner, .. } => Some(winner),
        }
    }

    /// Check if the game ended by forfeit rather than being played out
    pub fn is_forfeit(&self) -> bool {
        matches!(
            self,
            MatchState::IllegalMove { .. }
                | MatchState::TimeLimitExceeded { .. }
                | MatchState::AgentError { .. }
        )
    }

    /// Short uppercase label used in logs and reports
    pub fn label(&self) -> &'static str {
        match self {
            MatchState::InProgress => "IN_PROGRESS",
            MatchState::Win { .. } => "WIN",
            MatchState::Draw => "DRAW",
            MatchState::IllegalMove { .. } => "ILLEGAL_MOVE",
            MatchState::TimeLimitExceeded { .. } => "TIME_LIMIT_EXCEEDED",
            MatchState::AgentError { .. } => "AGENT_ERROR",
        }
    }
}

impl fmt::Display for MatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.winner() {
            Some(winner) => write!(f, "{} ({})", self.label(), winner),
            None => f.write_str(self.label()),
        }
    }
}

/// Harness-level protocol violations. These are bugs in the caller and are
/// never folded into the match state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatchError {
    #[error("player {player} is not in the game")]
    UnknownPlayer { player: String },

    #[error("tried to play while in terminal state {state}")]
    GameOver { state: MatchState },
}

pub type Result<T> = std::result::Result<T, MatchError>;

// ============================================================================
// MATCH
// ============================================================================

/// A single Connect-X game between two named players
#[derive(Clone, Debug)]
pub struct Match {
    board: Board,
    win_length: usize,
    first_player: String,
    second_player: String,
    state: MatchState,
    last_mover: Option<String>,
    /// Every attempted move, legal or not
    moves: Vec<(String, i64)>,
    log: Vec<String>,
}

impl Match {
    /// Create a new match. `first_player` moves first.
    pub fn new(
        columns: usize,
        rows: usize,
        win_length: usize,
        first_player: impl Into<String>,
        second_player: impl Into<String>,
    ) -> Self {
        Self {
            board: Board::new(columns, rows),
            win_length,
            first_player: first_player.into(),
            second_player: second_player.into(),
            state: MatchState::InProgress,
            last_mover: None,
            moves: Vec::new(),
            log: Vec::new(),
        }
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn win_length(&self) -> usize {
        self.win_length
    }

    pub fn first_player(&self) -> &str {
        &self.first_player
    }

    pub fn second_player(&self) -> &str {
        &self.second_player
    }

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    pub fn winner(&self) -> Option<&str> {
        self.state.winner()
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    pub fn last_mover(&self) -> Option<&str> {
        self.last_mover.as_deref()
    }

    pub fn moves(&self) -> &[(String, i64)] {
        &self.moves
    }

    pub fn log(&self) -> &[String] {
        &self.log
    }

    /// The registered player who is not `player`
    pub fn other_player(&self, player: &str) -> &str {
        if player == self.first_player {
            &self.second_player
        } else {
            &self.first_player
        }
    }

    /// Player due to move: whoever did not move last, first player at the start
    pub fn next_player(&self) -> &str {
        match &self.last_mover {
            None => &self.first_player,
            Some(last) => self.other_player(last),
        }
    }

    /// Columns that are not full. Empty once the board is full.
    pub fn possible_actions(&self) -> Vec<usize> {
        self.board.open_columns()
    }

    // ========================================================================
    // MOVES
    // ========================================================================

    /// Play `column` as `player`.
    ///
    /// Returns `Ok(true)` if the game goes on and `Ok(false)` once it is over.
    /// Illegal columns forfeit the game to the opponent; only protocol
    /// violations (unknown player, finished game) are returned as errors.
    pub fn make_move(&mut self, column: i64, player: &str) -> Result<bool> {
        self.check_protocol(player)?;
        self.moves.push((player.to_string(), column));

        let column = match self.validate_column(column) {
            Ok(column) => column,
            Err(reason) => {
                self.forfeit_illegal(player, reason);
                return Ok(false);
            }
        };

        // validate_column guarantees an empty row
        self.board.drop_token(column, player);
        self.last_mover = Some(player.to_string());

        if self.board.has_run_for(player, self.win_length) {
            self.log.push(format!("Player {} won the game.", player));
            self.state = MatchState::Win {
                winner: player.to_string(),
            };
            return Ok(false);
        }

        if self.board.is_full() {
            self.log.push("The game is a draw. All columns are full.".to_string());
            self.state = MatchState::Draw;
            return Ok(false);
        }

        self.log
            .push(format!("Player {} played in column {}.", player, column));
        Ok(true)
    }

    /// Play a column given as text, e.g. from a line-based agent or the CLI.
    ///
    /// Non-integral text is an illegal move, not a parse error.
    pub fn make_move_raw(&mut self, input: &str, player: &str) -> Result<bool> {
        match input.trim().parse::<i64>() {
            Ok(column) => self.make_move(column, player),
            Err(_) => {
                self.check_protocol(player)?;
                self.forfeit_illegal(
                    player,
                    IllegalMove::NotAnInteger {
                        input: input.to_string(),
                    },
                );
                Ok(false)
            }
        }
    }

    /// Play `column` as whichever player is due to move
    pub fn play_with_next_player(&mut self, column: i64) -> Result<bool> {
        let player = self.next_player().to_string();
        self.make_move(column, &player)
    }

    /// Return a copy of this match with `column` played by the next player.
    /// `self` is left untouched.
    pub fn take_action(&self, column: i64) -> Result<Match> {
        let mut next = self.clone();
        next.play_with_next_player(column)?;
        Ok(next)
    }

    /// Terminal reward from the first player's perspective: +1 win, -1 loss,
    /// 0 draw. `None` while the game is in progress.
    pub fn reward(&self) -> Option<i8> {
        if !self.state.is_terminal() {
            return None;
        }
        Some(match self.state.winner() {
            None => 0,
            Some(winner) if winner == self.first_player => 1,
            Some(_) => -1,
        })
    }

    // ========================================================================
    // FORFEITS
    // ========================================================================

    /// `player` did not answer in time; the opponent wins
    pub fn register_timeout(&mut self, player: &str) -> Result<()> {
        self.check_protocol(player)?;
        let winner = self.other_player(player).to_string();
        self.log
            .push(format!("Player {} exceeded the time limit and lost.", player));
        tracing::debug!(player, "time limit exceeded");
        self.last_mover = Some(player.to_string());
        self.state = MatchState::TimeLimitExceeded { winner };
        Ok(())
    }

    /// `player`'s strategy failed; the opponent wins
    pub fn register_agent_error(&mut self, player: &str, diagnostic: &str) -> Result<()> {
        self.check_protocol(player)?;
        let winner = self.other_player(player).to_string();
        self.log.push(format!(
            "Player {} caused an error and lost: {}",
            player, diagnostic
        ));
        tracing::debug!(player, diagnostic, "agent error");
        self.last_mover = Some(player.to_string());
        self.state = MatchState::AgentError {
            winner,
            diagnostic: diagnostic.to_string(),
        };
        Ok(())
    }

    // ========================================================================
    // HELPERS
    // ========================================================================

    fn check_protocol(&self, player: &str) -> Result<()> {
        if player != self.first_player && player != self.second_player {
            return Err(MatchError::UnknownPlayer {
                player: player.to_string(),
            });
        }
        if self.state.is_terminal() {
            return Err(MatchError::GameOver {
                state: self.state.clone(),
            });
        }
        Ok(())
    }

    fn validate_column(&self, column: i64) -> std::result::Result<usize, IllegalMove> {
        let index = usize::try_from(column)
            .ok()
            .filter(|&c| c < self.board.columns())
            .ok_or(IllegalMove::OutOfBounds { column })?;
        if self.board.is_column_full(index) {
            return Err(IllegalMove::ColumnFull { column: index });
        }
        Ok(index)
    }

    fn forfeit_illegal(&mut self, player: &str, reason: IllegalMove) {
        let winner = self.other_player(player).to_string();
        self.log.push(reason.to_string());
        self.log
            .push(format!("Player {} made an illegal move and lost.", player));
        tracing::debug!(player, %reason, "illegal move");
        self.last_mover = Some(player.to_string());
        self.state = MatchState::IllegalMove { winner, reason };
    }
}

/// Equality covers the position, not its history: move and event logs are
/// ignored so transpositions compare equal.
impl PartialEq for Match {
    fn eq(&self, other: &Self) -> bool {
        self.board == other.board
            && self.win_length == other.win_length
            && self.first_player == other.first_player
            && self.second_player == other.second_player
            && self.state == other.state
            && self.last_mover == other.last_mover
    }
}

impl Eq for Match {}

impl fmt::Display for Match {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.board)?;
        write!(
            f,
            "{} vs {} | win length {} | {}",
            self.first_player, self.second_player, self.win_length, self.state
        )
    }
}
