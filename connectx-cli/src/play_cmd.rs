//! Play command - a single game, shown move by move
//!
//! Either two agents play under the usual time limit, or a list of columns
//! is replayed for two named players (`--moves 3,3,4,...`).

use std::time::Duration;

use anyhow::{bail, Result};
use clap::Args;
use serde::Serialize;

use connectx_core::{Board, Match, MatchState};
use connectx_tournament::{BoardDimension, TimedMatch};

use crate::agents::parse_agent;

#[derive(Args)]
pub struct PlayArgs {
    /// First player: an agent spec, or a plain name with --moves
    #[arg(long, value_name = "AGENT")]
    pub first: Option<String>,

    /// Second player: an agent spec, or a plain name with --moves
    #[arg(long, value_name = "AGENT")]
    pub second: Option<String>,

    /// Comma-separated columns to replay instead of asking agents
    #[arg(long, value_name = "COLS")]
    pub moves: Option<String>,

    #[arg(long, default_value = "7x6", value_name = "COLSxROWS")]
    pub board: BoardDimension,

    #[arg(long, default_value = "4")]
    pub win_length: usize,

    /// Per-move time limit in milliseconds
    #[arg(long, default_value = "1000", value_name = "MS")]
    pub time_limit_ms: u64,

    /// Output the finished game as JSON
    #[arg(long)]
    pub json: bool,
}

/// Run play command
pub fn run(args: PlayArgs) -> Result<()> {
    if args.board.columns == 0 || args.board.rows == 0 || args.win_length == 0 {
        bail!("board and win length must be non-zero");
    }

    let game = match &args.moves {
        Some(moves) => replay(&args, moves)?,
        None => play_agents(&args)?,
    };

    if args.json {
        print_json_game(&game)
    } else {
        print_text_game(&game);
        Ok(())
    }
}

fn play_agents(args: &PlayArgs) -> Result<Match> {
    let (Some(first), Some(second)) = (&args.first, &args.second) else {
        bail!("--first and --second agents are required unless --moves is given");
    };
    let first = parse_agent(first)?;
    let second = parse_agent(second)?;
    if first.name() == second.name() {
        bail!("both agents are named {:?}", first.name());
    }

    let mut timed = TimedMatch::new(
        args.board.columns,
        args.board.rows,
        args.win_length,
        first,
        second,
    )
    .with_time_limit(Duration::from_millis(args.time_limit_ms));
    timed.play_full_game()?;
    Ok(timed.into_game())
}

/// Replay textual columns; stops early if the game ends
fn replay(args: &PlayArgs, moves: &str) -> Result<Match> {
    let first = args.first.as_deref().unwrap_or("X");
    let second = args.second.as_deref().unwrap_or("O");
    if first == second {
        bail!("players need different names");
    }

    let mut game = Match::new(args.board.columns, args.board.rows, args.win_length, first, second);
    for input in moves.split(',').filter(|m| !m.trim().is_empty()) {
        if game.is_terminal() {
            tracing::warn!(remaining = input, "game already over, ignoring further moves");
            break;
        }
        let player = game.next_player().to_string();
        game.make_move_raw(input, &player)?;
    }
    Ok(game)
}

fn print_text_game(game: &Match) {
    println!("{} vs {}", game.first_player(), game.second_player());
    println!();
    for line in game.log() {
        println!("  {}", line);
    }
    println!();
    print!("{}", game.board());
    println!();
    println!("Result: {}", game.state());
}

fn print_json_game(game: &Match) -> Result<()> {
    #[derive(Serialize)]
    struct JsonGame<'a> {
        first_player: &'a str,
        second_player: &'a str,
        win_length: usize,
        state: &'a MatchState,
        winner: Option<&'a str>,
        moves: &'a [(String, i64)],
        log: &'a [String],
        board: &'a Board,
    }

    let output = JsonGame {
        first_player: game.first_player(),
        second_player: game.second_player(),
        win_length: game.win_length(),
        state: game.state(),
        winner: game.winner(),
        moves: game.moves(),
        log: game.log(),
        board: game.board(),
    };
    crate::report::print_json(&output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(moves: Option<&str>) -> PlayArgs {
        PlayArgs {
            first: None,
            second: None,
            moves: moves.map(str::to_string),
            board: BoardDimension::new(7, 6),
            win_length: 4,
            time_limit_ms: 1000,
            json: false,
        }
    }

    #[test]
    fn test_replay_vertical_win() {
        let game = replay(&args(None), "0,6,0,6,0,6,0").unwrap();
        assert_eq!(game.winner(), Some("X"));
        assert!(matches!(game.state(), MatchState::Win { .. }));
    }

    #[test]
    fn test_replay_non_integer_forfeits() {
        let game = replay(&args(None), "3, left").unwrap();
        assert_eq!(game.winner(), Some("X"));
        assert!(matches!(game.state(), MatchState::IllegalMove { .. }));
    }

    #[test]
    fn test_replay_ignores_moves_after_end() {
        let game = replay(&args(None), "0,6,0,6,0,6,0,6,6").unwrap();
        assert_eq!(game.moves().len(), 7);
    }

    #[test]
    fn test_agents_required_without_moves() {
        assert!(play_agents(&args(None)).is_err());
    }

    #[test]
    fn test_play_agents() {
        let mut a = args(None);
        a.first = Some("column:0".to_string());
        a.second = Some("column:6".to_string());
        let game = play_agents(&a).unwrap();
        assert_eq!(game.winner(), Some("column-0"));
    }
}
