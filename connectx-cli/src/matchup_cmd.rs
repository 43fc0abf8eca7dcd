//! Matchup command - many games between two agents on one board
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: build_matchup(), report_results()
//! - Level 4: report formatting (see `report`)

use anyhow::Result;
use clap::Args;

use connectx_tournament::Matchup;

use crate::agents::parse_agent;
use crate::options::HarnessArgs;
use crate::report;

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct MatchupArgs {
    /// First agent spec, e.g. `winning` or `alice=random:7`
    #[arg(long, value_name = "AGENT")]
    pub first: String,

    /// Second agent spec
    #[arg(long, value_name = "AGENT")]
    pub second: String,

    #[command(flatten)]
    pub harness: HarnessArgs,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run matchup command
///
/// 1. Build agents and configuration
/// 2. Play the games
/// 3. Report results
pub fn run(args: MatchupArgs) -> Result<()> {
    let (mut matchup, games) = build_matchup(&args)?;

    tracing::info!(
        "Starting matchup: {} vs {} ({} games on {}, win length {})",
        matchup.first_agent().name(),
        matchup.second_agent().name(),
        games,
        matchup.config().board,
        matchup.config().win_length
    );

    matchup.play(games)?;

    report_results(&matchup, &args.harness)
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn build_matchup(args: &MatchupArgs) -> Result<(Matchup, usize)> {
    let first = parse_agent(&args.first)?;
    let second = parse_agent(&args.second)?;
    let (config, games) = args.harness.matchup_config()?;
    Ok((Matchup::new(config, first, second)?, games))
}

fn report_results(matchup: &Matchup, harness: &HarnessArgs) -> Result<()> {
    if harness.json {
        report::print_json(&report::MatchupReport::from_matchup(matchup)?)?;
    } else {
        println!("{}", report::matchup_text(matchup)?);
    }

    if let Some(dir) = &harness.report_dir {
        let file = report::pair_file_name(
            matchup.first_agent().name(),
            matchup.second_agent().name(),
        );
        report::write_report(dir, &file, &report::matchup_text(matchup)?)?;
    }
    Ok(())
}
