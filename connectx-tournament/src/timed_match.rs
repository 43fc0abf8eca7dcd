//! Timed match - drives one game between two agents
//!
//! Level 3 - Step-level implementation
//!
//! Every agent call gets a fresh copy of the board. With isolation enabled the
//! call runs on its own thread and the driver waits at most the time limit for
//! the answer. A thread that overruns is abandoned, not killed: it keeps
//! running until the strategy returns, and whatever it sends afterwards is
//! dropped with the closed channel. A strategy that never returns leaks its
//! thread for the life of the process.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use connectx_core::{Agent, Board, Match, MatchError, MatchState, Strategy};

use crate::config::MatchupConfig;

/// Result of asking an agent for a column
#[derive(Clone, Debug, PartialEq, Eq)]
enum Invocation {
    Column(i64),
    Fault(String),
    TimedOut,
}

/// Outcome of a single finished game
#[derive(Clone, Debug)]
pub struct GameOutcome {
    /// Final (terminal) state
    pub state: MatchState,
    /// Winner name, `None` for a draw
    pub winner: Option<String>,
    /// The finished match, including its move and event logs
    pub game: Match,
}

impl GameOutcome {
    pub fn is_draw(&self) -> bool {
        self.winner.is_none()
    }
}

/// A match whose players are agents, with a per-move time budget
pub struct TimedMatch {
    game: Match,
    first: Agent,
    second: Agent,
    time_limit: Duration,
    isolate_agents: bool,
}

impl TimedMatch {
    /// Create a timed match; `first` moves first. Defaults to a 1 s limit
    /// with isolation enabled.
    pub fn new(
        columns: usize,
        rows: usize,
        win_length: usize,
        first: Agent,
        second: Agent,
    ) -> Self {
        let game = Match::new(columns, rows, win_length, first.name(), second.name());
        Self {
            game,
            first,
            second,
            time_limit: Duration::from_secs(1),
            isolate_agents: true,
        }
    }

    /// Create a timed match from a matchup configuration
    pub fn from_config(config: &MatchupConfig, first: Agent, second: Agent) -> Self {
        Self::new(
            config.board.columns,
            config.board.rows,
            config.win_length,
            first,
            second,
        )
        .with_time_limit(config.time_limit())
        .with_isolation(config.isolate_agents)
    }

    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = limit;
        self
    }

    /// Without isolation agents are called on the driving thread: errors and
    /// panics are still caught but timeouts cannot be detected.
    pub fn with_isolation(mut self, isolate: bool) -> Self {
        self.isolate_agents = isolate;
        self
    }

    pub fn game(&self) -> &Match {
        &self.game
    }

    pub fn into_game(self) -> Match {
        self.game
    }

    // ========================================================================
    // TURNS
    // ========================================================================

    /// Ask `player`'s agent for a move and apply it.
    ///
    /// Returns `Ok(true)` if the game goes on. Timeouts, agent faults and
    /// illegal answers end the game with a forfeit; an unknown player or a
    /// finished game is a protocol violation.
    pub fn play_move_with_agent(&mut self, player: &str) -> Result<bool, MatchError> {
        if self.game.is_terminal() {
            return Err(MatchError::GameOver {
                state: self.game.state().clone(),
            });
        }
        let agent = self.agent_for(player)?.clone();
        let opponent = self.game.other_player(player).to_string();

        let started = Instant::now();
        let invocation = self.invoke(&agent, &opponent);
        tracing::trace!(
            player,
            elapsed_ms = started.elapsed().as_millis() as u64,
            ?invocation,
            "agent answered"
        );

        match invocation {
            Invocation::Column(column) => self.game.make_move(column, player),
            Invocation::Fault(diagnostic) => {
                tracing::warn!(player, %diagnostic, "agent error, forfeiting game");
                self.game.register_agent_error(player, &diagnostic)?;
                Ok(false)
            }
            Invocation::TimedOut => {
                tracing::warn!(
                    player,
                    limit_ms = self.time_limit.as_millis() as u64,
                    "time limit exceeded, forfeiting game"
                );
                self.game.register_timeout(player)?;
                Ok(false)
            }
        }
    }

    /// Play one move for whichever agent is due
    pub fn play_move_with_next_agent(&mut self) -> Result<bool, MatchError> {
        let player = self.game.next_player().to_string();
        self.play_move_with_agent(&player)
    }

    /// Play until the game is over and return the winner (`None` for a draw).
    ///
    /// Both agents are then shown the final board once more. Anything that
    /// goes wrong in that notification is logged and ignored.
    pub fn play_full_game(&mut self) -> Result<Option<String>, MatchError> {
        while !self.game.is_terminal() {
            self.play_move_with_next_agent()?;
        }
        self.notify_final_state();
        Ok(self.game.winner().map(str::to_string))
    }

    /// Play the whole game and package the result
    pub fn run(mut self) -> Result<GameOutcome, MatchError> {
        let winner = self.play_full_game()?;
        Ok(GameOutcome {
            state: self.game.state().clone(),
            winner,
            game: self.game,
        })
    }

    // ========================================================================
    // HELPERS
    // ========================================================================

    fn agent_for(&self, player: &str) -> Result<&Agent, MatchError> {
        if player == self.first.name() {
            Ok(&self.first)
        } else if player == self.second.name() {
            Ok(&self.second)
        } else {
            Err(MatchError::UnknownPlayer {
                player: player.to_string(),
            })
        }
    }

    fn notify_final_state(&self) {
        for (agent, opponent) in [(&self.first, &self.second), (&self.second, &self.first)] {
            match self.invoke(agent, opponent.name()) {
                Invocation::Column(_) => {}
                Invocation::Fault(diagnostic) => tracing::warn!(
                    agent = agent.name(),
                    %diagnostic,
                    "error when informing agent about final state"
                ),
                Invocation::TimedOut => tracing::warn!(
                    agent = agent.name(),
                    "agent did not acknowledge final state in time"
                ),
            }
        }
    }

    fn invoke(&self, agent: &Agent, opponent: &str) -> Invocation {
        let win_length = self.game.win_length();
        if !self.isolate_agents {
            let board = self.game.board().clone();
            return call_guarded(&*agent.strategy(), board, win_length, opponent);
        }

        let (tx, rx) = mpsc::channel();
        let strategy = agent.strategy();
        let board = self.game.board().clone();
        let opponent_name = opponent.to_string();
        let spawned = thread::Builder::new()
            .name(format!("agent-{}", agent.name()))
            .spawn(move || {
                let answer = call_guarded(&*strategy, board, win_length, &opponent_name);
                // Receiver is gone if the driver already gave up on us
                let _ = tx.send(answer);
            });

        if let Err(err) = spawned {
            tracing::warn!(
                agent = agent.name(),
                %err,
                "could not spawn agent thread, calling directly"
            );
            let board = self.game.board().clone();
            return call_guarded(&*agent.strategy(), board, win_length, opponent);
        }

        match rx.recv_timeout(self.time_limit) {
            Ok(answer) => answer,
            Err(RecvTimeoutError::Timeout) => Invocation::TimedOut,
            Err(RecvTimeoutError::Disconnected) => {
                Invocation::Fault("agent thread exited without answering".to_string())
            }
        }
    }
}

/// Call a strategy, turning errors and panics into `Invocation::Fault`
fn call_guarded(
    strategy: &dyn Strategy,
    board: Board,
    win_length: usize,
    opponent: &str,
) -> Invocation {
    match panic::catch_unwind(AssertUnwindSafe(|| {
        strategy.choose_column(board, win_length, opponent)
    })) {
        Ok(Ok(column)) => Invocation::Column(column),
        Ok(Err(err)) => Invocation::Fault(format!("{:#}", err)),
        Err(payload) => Invocation::Fault(format!("panicked: {}", panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
