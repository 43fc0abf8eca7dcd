//! Reference strategies
//!
//! Small, predictable opponents used by the CLI and the test suites. Serious
//! strategies live outside this crate and plug in through [`Strategy`].

use std::sync::Mutex;

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use crate::agent::Strategy;
use crate::board::Board;

/// Always plays the same column, whatever the board looks like
#[derive(Clone, Copy, Debug)]
pub struct ColumnAgent {
    pub column: i64,
}

impl ColumnAgent {
    pub fn new(column: i64) -> Self {
        Self { column }
    }
}

impl Strategy for ColumnAgent {
    fn choose_column(
        &self,
        _board: Board,
        _win_length: usize,
        _opponent: &str,
    ) -> anyhow::Result<i64> {
        Ok(self.column)
    }
}

/// Uniformly random column in `[0, columns)`; full columns are not avoided
pub struct RandomAgent {
    rng: Mutex<ChaCha8Rng>,
}

impl RandomAgent {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(ChaCha8Rng::from_entropy()),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(ChaCha8Rng::seed_from_u64(seed)),
        }
    }
}

impl Default for RandomAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl Strategy for RandomAgent {
    fn choose_column(
        &self,
        board: Board,
        _win_length: usize,
        _opponent: &str,
    ) -> anyhow::Result<i64> {
        if board.columns() == 0 {
            anyhow::bail!("board has no columns");
        }
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| anyhow::anyhow!("random agent state poisoned"))?;
        Ok(rng.gen_range(0..board.columns()) as i64)
    }
}

/// Greedy one-ply agent.
///
/// Plays a column that wins immediately, otherwise blocks a column where the
/// opponent would win next move, otherwise the open column closest to the
/// centre (ties go left).
#[derive(Clone, Debug)]
pub struct WinningMoveAgent {
    name: String,
}

impl WinningMoveAgent {
    /// `name` must be the name this agent plays under, so it can recognise
    /// its own tokens on the board.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Strategy for WinningMoveAgent {
    fn choose_column(
        &self,
        board: Board,
        win_length: usize,
        opponent: &str,
    ) -> anyhow::Result<i64> {
        let open = centre_first(&board);

        if let Some(column) = find_winning_column(&board, &open, &self.name, win_length) {
            return Ok(column as i64);
        }
        if let Some(column) = find_winning_column(&board, &open, opponent, win_length) {
            return Ok(column as i64);
        }

        // Nothing open: the game is over and this is the final notification
        Ok(open.first().copied().unwrap_or(0) as i64)
    }
}

/// Open columns ordered by distance from the centre
fn centre_first(board: &Board) -> Vec<usize> {
    let mut open = board.open_columns();
    let centre2 = board.columns().saturating_sub(1);
    open.sort_by_key(|&col| (col * 2).abs_diff(centre2));
    open
}

/// First column in `candidates` where dropping a token for `owner` completes a run
pub fn find_winning_column(
    board: &Board,
    candidates: &[usize],
    owner: &str,
    win_length: usize,
) -> Option<usize> {
    candidates.iter().copied().find(|&column| {
        let mut trial = board.clone();
        trial.drop_token(column, owner).is_some() && trial.has_run_for(owner, win_length)
    })
}
