//! Agents: a name plus a move-selection capability

use std::fmt;
use std::sync::Arc;

use crate::board::Board;

/// Move-selection capability.
///
/// Receives its own copy of the board, the win length and the opponent's
/// name, and answers with a column. Any integer is accepted; columns off the
/// board are judged as illegal moves by the match, not as errors. Returning
/// `Err` (or panicking) is an agent fault and forfeits the game.
///
/// Implementations that keep state across calls need interior mutability,
/// since the same strategy may be called from several games at once.
pub trait Strategy: Send + Sync {
    fn choose_column(
        &self,
        board: Board,
        win_length: usize,
        opponent: &str,
    ) -> anyhow::Result<i64>;
}

impl<F> Strategy for F
where
    F: Fn(Board, usize, &str) -> anyhow::Result<i64> + Send + Sync,
{
    fn choose_column(
        &self,
        board: Board,
        win_length: usize,
        opponent: &str,
    ) -> anyhow::Result<i64> {
        self(board, win_length, opponent)
    }
}

/// A named competitor. Cloning shares the underlying strategy.
#[derive(Clone)]
pub struct Agent {
    name: String,
    strategy: Arc<dyn Strategy>,
}

impl Agent {
    pub fn new(name: impl Into<String>, strategy: impl Strategy + 'static) -> Self {
        Self {
            name: name.into(),
            strategy: Arc::new(strategy),
        }
    }

    /// Build an agent from a closure
    pub fn from_fn<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(Board, usize, &str) -> anyhow::Result<i64> + Send + Sync + 'static,
    {
        Self::new(name, f)
    }

    /// Build an agent from an already shared strategy
    pub fn from_arc(name: impl Into<String>, strategy: Arc<dyn Strategy>) -> Self {
        Self {
            name: name.into(),
            strategy,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn strategy(&self) -> Arc<dyn Strategy> {
        Arc::clone(&self.strategy)
    }

    /// Call the strategy directly on the current thread
    pub fn choose_column(
        &self,
        board: Board,
        win_length: usize,
        opponent: &str,
    ) -> anyhow::Result<i64> {
        self.strategy.choose_column(board, win_length, opponent)
    }
}

impl fmt::Debug for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Agent").field("name", &self.name).finish_non_exhaustive()
    }
}
