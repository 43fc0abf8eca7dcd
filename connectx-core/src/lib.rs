//! Connect-X Core - Game engine and agents
//!
//! This crate provides the core game logic for Connect-X:
//! - Board geometry (column-drop grid with gravity)
//! - Match state machine with win/draw detection and forfeits
//! - The agent capability interface
//! - A few reference strategies

pub mod board;
pub mod game;
pub mod agent;
pub mod ai;

// Re-exports for convenient access
pub use board::{Board, Cell};
pub use game::{IllegalMove, Match, MatchError, MatchState};
pub use agent::{Agent, Strategy};
pub use ai::{ColumnAgent, RandomAgent, WinningMoveAgent};
