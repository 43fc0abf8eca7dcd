//! Integration tests for the Connect-X harness
//!
//! Tests the full stack: game engine, timed games, matchups, tournaments and
//! the `connectx` binary

use std::process::Command;
use std::time::Duration;

use connectx_core::{Agent, ColumnAgent, Match, MatchState, WinningMoveAgent};
use connectx_tournament::{
    BoardDimension, ExecutionMode, Matchup, MatchupConfig, MetaMatchup, Side, TimedMatch,
    Tournament, TournamentConfig, Verdict,
};

// ============================================================================
// TEST FIXTURES
// ============================================================================

fn column(name: &str, column: i64) -> Agent {
    Agent::new(name, ColumnAgent::new(column))
}

fn winning(name: &str) -> Agent {
    Agent::new(name, WinningMoveAgent::new(name))
}

/// Column 0 against `victim`, an illegal column against everyone else
fn picky(name: &str, victim: &'static str) -> Agent {
    Agent::from_fn(name, move |_board, _win_length, opponent| {
        Ok(if opponent == victim { 0 } else { -1 })
    })
}

// ============================================================================
// GAME ENGINE
// ============================================================================

#[test]
fn test_column_race_first_player_wins() {
    let mut timed = TimedMatch::new(7, 6, 4, column("A", 0), column("B", 6));
    let winner = timed.play_full_game().unwrap();

    assert_eq!(winner.as_deref(), Some("A"));
    assert_eq!(timed.game().moves().len(), 7);
    assert!(matches!(timed.game().state(), MatchState::Win { .. }));
}

#[test]
fn test_failing_agent_forfeits() {
    let broken = Agent::from_fn("B", |_board, _win_length, _opponent| {
        anyhow::bail!("no strategy loaded")
    });
    let outcome = TimedMatch::new(7, 6, 4, column("A", 0), broken).run().unwrap();

    assert_eq!(outcome.winner.as_deref(), Some("A"));
    match &outcome.state {
        MatchState::AgentError { winner, diagnostic } => {
            assert_eq!(winner, "A");
            assert!(diagnostic.contains("no strategy loaded"));
        }
        other => panic!("expected agent error, got {:?}", other),
    }
}

#[test]
fn test_full_board_is_draw() {
    let mut game = Match::new(7, 6, 10, "A", "B");
    // A run of 10 does not fit on a 7x6 board
    for _ in 0..6 {
        for col in 0..7 {
            let player = game.next_player().to_string();
            game.make_move(col, &player).unwrap();
        }
    }

    assert_eq!(game.state(), &MatchState::Draw);
    assert_eq!(game.winner(), None);
    assert!(game.board().is_full());
}

#[test]
fn test_slow_agent_loses_on_time() {
    let slow = Agent::from_fn("sleepy", |_board, _win_length, _opponent| {
        std::thread::sleep(Duration::from_millis(300));
        Ok(3)
    });
    let outcome = TimedMatch::new(7, 6, 4, slow, column("quick", 0))
        .with_time_limit(Duration::from_millis(30))
        .run()
        .unwrap();

    assert_eq!(
        outcome.state,
        MatchState::TimeLimitExceeded {
            winner: "quick".to_string()
        }
    );
}

// ============================================================================
// MATCHUPS AND TOURNAMENTS
// ============================================================================

#[test]
fn test_dominant_agent_wins_matchup() {
    let config = MatchupConfig::new(BoardDimension::new(7, 6), 4).with_threshold(10.0);
    let mut matchup = Matchup::new(config, winning("greedy"), column("stacker", 0)).unwrap();
    matchup.play_n_games(10).unwrap();

    let summary = matchup.summary().unwrap();
    assert_eq!(summary.total_games(), 10);
    assert_eq!(summary.verdict, Verdict::Winner("greedy".to_string()));
    assert!(summary.pct_first_wins >= summary.pct_second_wins + 10.0);
    assert!(!matchup.saved_games(Side::First).is_empty());
}

#[test]
fn test_parallel_matchup_equals_sequential() {
    let config = MatchupConfig::new(BoardDimension::new(7, 6), 4);
    let mut sequential =
        Matchup::new(config.clone(), winning("greedy"), column("stacker", 3)).unwrap();
    sequential.play(10).unwrap();

    let parallel_config = config.with_mode(ExecutionMode::Parallel { workers: Some(4) });
    let mut parallel =
        Matchup::new(parallel_config, winning("greedy"), column("stacker", 3)).unwrap();
    parallel.play(10).unwrap();

    assert_eq!(sequential.counts(), parallel.counts());
}

#[test]
fn test_meta_matchup_sums_configurations() {
    let config = TournamentConfig::new(
        vec![BoardDimension::new(7, 6), BoardDimension::new(8, 7)],
        vec![4, 5],
    )
    .with_games(2);
    let mut meta = MetaMatchup::new(config, column("left", 0), column("right", 6)).unwrap();
    meta.play_matchups().unwrap();

    let summary = meta.summary().unwrap();
    assert_eq!(meta.matchups().len(), 4);
    assert_eq!(summary.total_games(), 8);
    // Every configuration is a column race the starter wins
    assert_eq!(summary.counts.first_wins, 4);
    assert_eq!(summary.verdict, Verdict::NoClearWinner);
}

#[test]
fn test_cyclic_tournament_has_no_champion() {
    let config = TournamentConfig::new(vec![BoardDimension::new(7, 6)], vec![4]).with_games(2);
    let roster = vec![picky("A", "B"), picky("B", "C"), picky("C", "A")];
    let mut tournament = Tournament::new(config, roster).unwrap();

    let champion = tournament.play_tournament().unwrap();

    assert_eq!(champion, Verdict::NoClearWinner);
    assert_eq!(tournament.tally(), vec![("A", 1), ("B", 1), ("C", 1)]);
    assert_eq!(tournament.ties(), 0);
}

// ============================================================================
// BINARY
// ============================================================================

fn connectx(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_connectx"))
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .expect("failed to run connectx")
}

#[test]
fn test_cli_matchup_json() {
    let output = connectx(&[
        "matchup",
        "--first",
        "greedy=winning",
        "--second",
        "column:0",
        "--games",
        "4",
        "--threshold",
        "10",
        "--json",
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["first"], "greedy");
    assert_eq!(json["second"], "column-0");
    assert_eq!(json["summary"]["counts"]["first_wins"], 4);
}

#[test]
fn test_cli_tournament_writes_reports() {
    let dir = std::env::temp_dir().join(format!("connectx-it-{}", std::process::id()));
    let dir_arg = dir.to_string_lossy().to_string();
    let output = connectx(&[
        "tournament",
        "greedy=winning",
        "left=column:0",
        "right=column:6",
        "--games",
        "2",
        "--report-dir",
        &dir_arg,
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let result = std::fs::read_to_string(dir.join("tournament_result.txt")).unwrap();
    assert!(result.contains("Winner: greedy"));
    assert!(dir.join("greedy_vs_left.txt").exists());
    assert!(dir.join("greedy_vs_right.txt").exists());
    assert!(dir.join("left_vs_right.txt").exists());
    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_cli_replay() {
    let output = connectx(&["play", "--moves", "0,6,0,6,0,6,0"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Result: WIN (X)"));
}

#[test]
fn test_cli_rejects_unknown_agent() {
    let output = connectx(&["matchup", "--first", "minimax", "--second", "winning"]);
    assert!(!output.status.success());
}
