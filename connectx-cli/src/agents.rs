//! Agent registry - build agents from command-line specs
//!
//! A spec is `kind[:arg]` or `name=kind[:arg]`:
//! - `column:N` always plays column N
//! - `random[:seed]` plays uniformly random columns
//! - `winning` takes wins, blocks threats, otherwise prefers the centre

use anyhow::{bail, Context, Result};

use connectx_core::{Agent, ColumnAgent, RandomAgent, WinningMoveAgent};

/// Parse one agent spec
pub fn parse_agent(spec: &str) -> Result<Agent> {
    let spec = spec.trim();
    let (explicit_name, body) = match spec.split_once('=') {
        Some((name, body)) => (Some(name.trim()), body.trim()),
        None => (None, spec),
    };
    let (kind, arg) = match body.split_once(':') {
        Some((kind, arg)) => (kind.trim(), Some(arg.trim())),
        None => (body, None),
    };

    let name = match explicit_name {
        Some("") => bail!("empty agent name in {:?}", spec),
        Some(name) => name.to_string(),
        None => default_name(kind, arg),
    };

    let agent = match (kind, arg) {
        ("column", Some(column)) => {
            let column: i64 = column
                .parse()
                .with_context(|| format!("column agent needs an integer, got {:?}", column))?;
            Agent::new(name, ColumnAgent::new(column))
        }
        ("column", None) => bail!("column agent needs a column, e.g. column:3"),
        ("random", Some(seed)) => {
            let seed: u64 = seed
                .parse()
                .with_context(|| format!("random agent seed must be an integer, got {:?}", seed))?;
            Agent::new(name, RandomAgent::with_seed(seed))
        }
        ("random", None) => Agent::new(name, RandomAgent::new()),
        ("winning", None) => {
            let strategy = WinningMoveAgent::new(name.clone());
            Agent::new(name, strategy)
        }
        ("winning", Some(_)) => bail!("winning agent takes no argument"),
        (other, _) => bail!(
            "unknown agent kind {:?} (expected column, random or winning)",
            other
        ),
    };
    Ok(agent)
}

/// Parse a list of specs, rejecting duplicate names
pub fn parse_roster(specs: &[String]) -> Result<Vec<Agent>> {
    let mut roster: Vec<Agent> = Vec::with_capacity(specs.len());
    for spec in specs {
        let agent = parse_agent(spec)?;
        if roster.iter().any(|a| a.name() == agent.name()) {
            bail!(
                "agent name {:?} used twice; give one of them a name with NAME=KIND",
                agent.name()
            );
        }
        roster.push(agent);
    }
    Ok(roster)
}

fn default_name(kind: &str, arg: Option<&str>) -> String {
    match arg {
        Some(arg) => format!("{}-{}", kind, arg),
        None => kind.to_string(),
    }
}
