//! Meta-matchup command - two agents across several boards and win lengths

use anyhow::Result;
use clap::Args;

use connectx_tournament::{ExecutionMode, MetaMatchup};

use crate::agents::parse_agent;
use crate::options::HarnessArgs;
use crate::report;

#[derive(Args)]
pub struct MetaMatchupArgs {
    /// First agent spec
    #[arg(long, value_name = "AGENT")]
    pub first: String,

    /// Second agent spec
    #[arg(long, value_name = "AGENT")]
    pub second: String,

    /// Run whole matchups concurrently instead of games within a matchup
    #[arg(long, requires = "parallel")]
    pub across_configs: bool,

    #[command(flatten)]
    pub harness: HarnessArgs,
}

/// Run meta-matchup command
pub fn run(args: MetaMatchupArgs) -> Result<()> {
    let config = args.harness.tournament_config()?;
    let parallel = matches!(config.mode, ExecutionMode::Parallel { .. });
    let mut meta = MetaMatchup::new(config, parse_agent(&args.first)?, parse_agent(&args.second)?)?;

    tracing::info!(
        "Starting meta matchup: {} vs {} ({} configurations)",
        meta.first_agent().name(),
        meta.second_agent().name(),
        meta.config().combinations().len()
    );

    if parallel && args.across_configs {
        meta.play_matchups_parallel()?;
    } else {
        meta.play_matchups()?;
    }

    if args.harness.json {
        report::print_json(&report::MetaMatchupReport::from_meta(&meta)?)?;
    } else {
        println!("{}", report::meta_matchup_text(&meta)?);
    }

    if let Some(dir) = &args.harness.report_dir {
        let file = report::pair_file_name(meta.first_agent().name(), meta.second_agent().name());
        report::write_report(dir, &file, &report::meta_matchup_text(&meta)?)?;
    }
    Ok(())
}
