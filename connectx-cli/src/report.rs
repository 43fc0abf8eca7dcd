//! Text and JSON reports for matchups, meta matchups and tournaments
//!
//! Level 4 - Formatting utilities

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

use connectx_tournament::{Matchup, MatchupSummary, MetaMatchup, Tournament};

const RULE: &str = "========================";

/// Name of the report file for one pair of agents
pub fn pair_file_name(first: &str, second: &str) -> String {
    format!("{}_vs_{}.txt", first, second)
}

pub const TOURNAMENT_FILE: &str = "tournament_result.txt";

// ============================================================================
// TEXT REPORTS
// ============================================================================

fn matchup_lines(matchup: &Matchup) -> Result<Vec<String>> {
    let summary = matchup.summary()?;
    let config = matchup.config();
    let counts = summary.counts;
    Ok(vec![
        "Connect X Matchup Report".to_string(),
        RULE.to_string(),
        format!("Columns: {}", config.board.columns),
        format!("Rows: {}", config.board.rows),
        format!("Win Length: {}", config.win_length),
        format!("First Player: {}", matchup.first_agent().name()),
        format!("Second Player: {}", matchup.second_agent().name()),
        format!("Total Games Played: {}", summary.total_games()),
        format!("Time Limit: {} seconds", config.time_limit().as_secs_f64()),
        format!("Win Percentage Threshold for Win: {}", config.win_threshold_pct),
        String::new(),
        "Results:".to_string(),
        format!("First Player Wins: {} ({:.2}%)", counts.first_wins, summary.pct_first_wins),
        format!("Second Player Wins: {} ({:.2}%)", counts.second_wins, summary.pct_second_wins),
        format!("Draws: {} ({:.2}%)", counts.draws, summary.pct_draws),
        String::new(),
        format!("Winner: {}", summary.verdict),
        RULE.to_string(),
    ])
}

pub fn matchup_text(matchup: &Matchup) -> Result<String> {
    Ok(matchup_lines(matchup)?.join("\n"))
}

/// Overall numbers followed by every matchup report
pub fn meta_matchup_text(meta: &MetaMatchup) -> Result<String> {
    let summary = meta.summary()?;
    let counts = summary.counts;
    let (first, second) = (meta.first_agent().name(), meta.second_agent().name());

    let mut lines = vec![
        "Connect X Meta Matchup Report".to_string(),
        RULE.to_string(),
        "Agents:".to_string(),
        format!("First Agent: {}", first),
        format!("Second Agent: {}", second),
        String::new(),
        "Results:".to_string(),
        format!("Total Games: {}", summary.total_games()),
        format!("{}: {} ({:.2}%)", first, counts.first_wins, summary.pct_first_wins),
        format!("{}: {} ({:.2}%)", second, counts.second_wins, summary.pct_second_wins),
        format!("Draws: {} ({:.2}%)", counts.draws, summary.pct_draws),
        String::new(),
        format!("Winner: {}", summary.verdict),
        RULE.to_string(),
        String::new(),
        "Matchups:".to_string(),
        String::new(),
    ];
    for matchup in meta.matchups() {
        lines.extend(matchup_lines(matchup)?);
        lines.push(String::new());
    }
    Ok(lines.join("\n"))
}

pub fn tournament_text(tournament: &Tournament) -> Result<String> {
    let champion = tournament.champion()?;
    let mut lines = vec![
        "Connect X Tournament Report".to_string(),
        RULE.to_string(),
        "Agents:".to_string(),
    ];
    lines.extend(
        tournament
            .tally()
            .into_iter()
            .map(|(name, wins)| format!("{}: {}", name, wins)),
    );
    lines.push(format!("Ties: {}", tournament.ties()));
    lines.push(String::new());
    lines.push("Results:".to_string());
    lines.push(format!("Winner: {}", champion));
    lines.push(RULE.to_string());
    Ok(lines.join("\n") + "\n")
}

// ============================================================================
// JSON REPORTS
// ============================================================================

#[derive(Serialize)]
pub struct MatchupReport {
    pub first: String,
    pub second: String,
    pub columns: usize,
    pub rows: usize,
    pub win_length: usize,
    pub time_limit_ms: u64,
    pub win_threshold_pct: f64,
    pub summary: MatchupSummary,
}

impl MatchupReport {
    pub fn from_matchup(matchup: &Matchup) -> Result<Self> {
        let config = matchup.config();
        Ok(Self {
            first: matchup.first_agent().name().to_string(),
            second: matchup.second_agent().name().to_string(),
            columns: config.board.columns,
            rows: config.board.rows,
            win_length: config.win_length,
            time_limit_ms: config.time_limit_ms,
            win_threshold_pct: config.win_threshold_pct,
            summary: matchup.summary()?,
        })
    }
}

#[derive(Serialize)]
pub struct MetaMatchupReport {
    pub first: String,
    pub second: String,
    pub summary: MatchupSummary,
    pub matchups: Vec<MatchupReport>,
}

impl MetaMatchupReport {
    pub fn from_meta(meta: &MetaMatchup) -> Result<Self> {
        Ok(Self {
            first: meta.first_agent().name().to_string(),
            second: meta.second_agent().name().to_string(),
            summary: meta.summary()?,
            matchups: meta
                .matchups()
                .iter()
                .map(MatchupReport::from_matchup)
                .collect::<Result<_>>()?,
        })
    }
}

#[derive(Serialize)]
pub struct Standing {
    pub name: String,
    pub meta_matchup_wins: u32,
}

#[derive(Serialize)]
pub struct TournamentReport {
    pub generated_at: DateTime<Utc>,
    pub standings: Vec<Standing>,
    pub ties: u32,
    pub champion: String,
    pub meta_matchups: Vec<MetaMatchupReport>,
}

impl TournamentReport {
    pub fn from_tournament(tournament: &Tournament) -> Result<Self> {
        Ok(Self {
            generated_at: Utc::now(),
            standings: tournament
                .tally()
                .into_iter()
                .map(|(name, wins)| Standing {
                    name: name.to_string(),
                    meta_matchup_wins: wins,
                })
                .collect(),
            ties: tournament.ties(),
            champion: tournament.champion()?.to_string(),
            meta_matchups: tournament
                .meta_matchups()
                .iter()
                .map(MetaMatchupReport::from_meta)
                .collect::<Result<_>>()?,
        })
    }
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize report")?;
    println!("{}", json);
    Ok(())
}

// ============================================================================
// FILES
// ============================================================================

/// Write `contents` to `dir/file_name`, creating `dir` if needed
pub fn write_report(dir: &Path, file_name: &str, contents: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create report directory: {}", dir.display()))?;
    let path = dir.join(file_name);
    std::fs::write(&path, contents)
        .with_context(|| format!("Failed to write report: {}", path.display()))?;
    tracing::info!(path = %path.display(), "report written");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use connectx_core::{Agent, ColumnAgent};
    use connectx_tournament::{BoardDimension, MatchupConfig, TournamentConfig};

    fn racers() -> (Agent, Agent) {
        (
            Agent::new("left", ColumnAgent::new(0)),
            Agent::new("right", ColumnAgent::new(6)),
        )
    }

    #[test]
    fn test_matchup_text() {
        let (left, right) = racers();
        let config = MatchupConfig::new(BoardDimension::new(7, 6), 4).with_threshold(10.0);
        let mut matchup = Matchup::new(config, left, right).unwrap();
        matchup.play_n_games(4).unwrap();

        let text = matchup_text(&matchup).unwrap();
        assert!(text.starts_with("Connect X Matchup Report"));
        assert!(text.contains("Columns: 7"));
        assert!(text.contains("Total Games Played: 4"));
        assert!(text.contains("Time Limit: 1 seconds"));
        assert!(text.contains("First Player Wins: 2 (50.00%)"));
        assert!(text.contains("Winner: NO_CLEAR_WINNER"));
    }

    #[test]
    fn test_report_requires_play() {
        let (left, right) = racers();
        let matchup = Matchup::new(MatchupConfig::default(), left, right).unwrap();
        assert!(matchup_text(&matchup).is_err());
        assert!(MatchupReport::from_matchup(&matchup).is_err());
    }

    #[test]
    fn test_meta_json_shape() {
        let (left, right) = racers();
        let config =
            TournamentConfig::new(vec![BoardDimension::new(7, 6)], vec![4, 5]).with_games(2);
        let mut meta = MetaMatchup::new(config, left, right).unwrap();
        meta.play_matchups().unwrap();

        let report = MetaMatchupReport::from_meta(&meta).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["first"], "left");
        assert_eq!(json["matchups"].as_array().unwrap().len(), 2);
        assert_eq!(json["summary"]["counts"]["first_wins"], 2);

        let text = meta_matchup_text(&meta).unwrap();
        assert!(text.contains("left: 2 (50.00%)"));
        assert_eq!(text.matches("Connect X Matchup Report").count(), 2);
    }

    #[test]
    fn test_write_report_creates_dir() {
        let dir = std::env::temp_dir().join(format!("connectx-report-{}", std::process::id()));
        let path = write_report(&dir.join("nested"), &pair_file_name("a", "b"), "hello").unwrap();
        assert!(path.ends_with("a_vs_b.txt"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello");
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
