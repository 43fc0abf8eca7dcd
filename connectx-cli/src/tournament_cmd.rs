//! Tournament command - round-robin over a roster of agents
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: play_with_progress(), report_results()

use anyhow::Result;
use clap::Args;

use connectx_tournament::{MetaMatchup, Tournament};

use crate::agents::parse_roster;
use crate::options::HarnessArgs;
use crate::report;

#[derive(Args)]
pub struct TournamentArgs {
    /// Agent specs, at least two (e.g. `winning a=random:1 b=column:3`)
    #[arg(required = true, num_args = 2.., value_name = "AGENT")]
    pub agents: Vec<String>,

    #[command(flatten)]
    pub harness: HarnessArgs,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run tournament command
///
/// 1. Build roster and configuration
/// 2. Play every pairing, writing pair reports as they finish
/// 3. Report standings and champion
pub fn run(args: TournamentArgs) -> Result<()> {
    let config = args.harness.tournament_config()?;
    let roster = parse_roster(&args.agents)?;
    let mut tournament = Tournament::new(config, roster)?;

    tracing::info!(
        "Starting tournament: {} agents, {} configurations per pairing, {} games each",
        tournament.roster().len(),
        tournament.config().combinations().len(),
        tournament.config().games_per_matchup
    );

    play_with_progress(&mut tournament, &args.harness)?;

    report_results(&tournament, &args.harness)
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn play_with_progress(tournament: &mut Tournament, harness: &HarnessArgs) -> Result<()> {
    let mut write_error = None;
    tournament.play_tournament_with(|meta| {
        if write_error.is_some() {
            return;
        }
        if let Err(err) = record_pairing(meta, harness) {
            write_error = Some(err);
        }
    })?;
    match write_error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

fn record_pairing(meta: &MetaMatchup, harness: &HarnessArgs) -> Result<()> {
    let summary = meta.summary()?;
    if !harness.json {
        println!(
            "{} vs {}: {} ({}-{}-{})",
            meta.first_agent().name(),
            meta.second_agent().name(),
            summary.verdict,
            summary.counts.first_wins,
            summary.counts.second_wins,
            summary.counts.draws
        );
    }
    if let Some(dir) = &harness.report_dir {
        let file = report::pair_file_name(meta.first_agent().name(), meta.second_agent().name());
        report::write_report(dir, &file, &report::meta_matchup_text(meta)?)?;
    }
    Ok(())
}

fn report_results(tournament: &Tournament, harness: &HarnessArgs) -> Result<()> {
    if harness.json {
        report::print_json(&report::TournamentReport::from_tournament(tournament)?)?;
    } else {
        println!();
        print!("{}", report::tournament_text(tournament)?);
    }

    if let Some(dir) = &harness.report_dir {
        report::write_report(dir, report::TOURNAMENT_FILE, &report::tournament_text(tournament)?)?;
    }
    Ok(())
}
