//! Tournament execution - round-robin of meta matchups
//!
//! Level 1 - Orchestration and Level 2 - Phases

use connectx_core::Agent;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::config::TournamentConfig;
use crate::error::{Result, TournamentError};
use crate::matchup::Verdict;
use crate::meta_matchup::MetaMatchup;

/// Round-robin over a roster of agents
pub struct Tournament {
    config: TournamentConfig,
    roster: Vec<Agent>,
    meta_matchups: Vec<MetaMatchup>,
    /// Meta matchups won, keyed by agent name
    wins: FxHashMap<String, u32>,
    ties: u32,
    champion: Option<Verdict>,
}

impl Tournament {
    pub fn new(config: TournamentConfig, roster: Vec<Agent>) -> Result<Self> {
        config.validate()?;
        let mut seen = FxHashSet::default();
        for agent in &roster {
            if !seen.insert(agent.name()) {
                return Err(TournamentError::InvalidConfig(format!(
                    "agent name {:?} appears more than once",
                    agent.name()
                )));
            }
        }
        let wins = roster.iter().map(|a| (a.name().to_string(), 0)).collect();
        Ok(Self {
            config,
            roster,
            meta_matchups: Vec::new(),
            wins,
            ties: 0,
            champion: None,
        })
    }

    pub fn config(&self) -> &TournamentConfig {
        &self.config
    }

    pub fn roster(&self) -> &[Agent] {
        &self.roster
    }

    /// Meta matchups in pairing order
    pub fn meta_matchups(&self) -> &[MetaMatchup] {
        &self.meta_matchups
    }

    /// Meta matchup wins per agent, in roster order
    pub fn tally(&self) -> Vec<(&str, u32)> {
        self.roster
            .iter()
            .map(|a| (a.name(), self.wins.get(a.name()).copied().unwrap_or(0)))
            .collect()
    }

    /// Meta matchups that ended without a clear winner
    pub fn ties(&self) -> u32 {
        self.ties
    }

    pub fn champion(&self) -> Result<&Verdict> {
        self.champion.as_ref().ok_or(TournamentError::NotPlayed)
    }

    // ========================================================================
    // Level 1 - Orchestration
    // ========================================================================

    /// Play every pairing and determine the champion
    pub fn play_tournament(&mut self) -> Result<Verdict> {
        self.play_tournament_with(|_| {})
    }

    /// Like [`play_tournament`](Self::play_tournament), calling `on_meta`
    /// after each pairing finishes
    pub fn play_tournament_with<F>(&mut self, on_meta: F) -> Result<Verdict>
    where
        F: FnMut(&MetaMatchup),
    {
        self.run_pairings(play_pairing, on_meta)
    }

    // ========================================================================
    // Level 2 - Phases
    // ========================================================================

    /// Standings are only touched once every pairing has been played, so a
    /// failed run leaves the tournament unplayed and it can be run again
    fn run_pairings<P, F>(&mut self, mut play: P, mut on_meta: F) -> Result<Verdict>
    where
        P: FnMut(&TournamentConfig, &Agent, &Agent) -> Result<MetaMatchup>,
        F: FnMut(&MetaMatchup),
    {
        if self.champion.is_some() {
            return Err(TournamentError::AlreadyPlayed);
        }

        let pairings = generate_round_robin_pairings(self.roster.len());
        tracing::info!(
            agents = self.roster.len(),
            pairings = pairings.len(),
            "starting tournament"
        );

        let mut wins = self.wins.clone();
        let mut ties = self.ties;
        let mut metas = Vec::with_capacity(pairings.len());
        for (i, j) in pairings {
            let (first, second) = (&self.roster[i], &self.roster[j]);
            let meta = play(&self.config, first, second)?;
            let verdict = meta.summary()?.verdict;
            tracing::info!(
                first = first.name(),
                second = second.name(),
                verdict = %verdict,
                "pairing decided"
            );
            match verdict {
                Verdict::Winner(name) => *wins.entry(name).or_insert(0) += 1,
                Verdict::NoClearWinner => ties += 1,
            }
            on_meta(&meta);
            metas.push(meta);
        }

        self.wins = wins;
        self.ties = ties;
        self.meta_matchups.extend(metas);
        let champion = determine_champion(&self.tally(), self.ties);
        tracing::info!(champion = %champion, ties = self.ties, "tournament complete");
        self.champion = Some(champion.clone());
        Ok(champion)
    }
}

// ============================================================================
// Level 3 - Steps
// ============================================================================

fn play_pairing(
    config: &TournamentConfig,
    first: &Agent,
    second: &Agent,
) -> Result<MetaMatchup> {
    let mut meta = MetaMatchup::new(config.clone(), first.clone(), second.clone())?;
    meta.play_matchups()?;
    Ok(meta)
}

/// Generate all pairings for round-robin
fn generate_round_robin_pairings(n: usize) -> Vec<(usize, usize)> {
    (0..n)
        .flat_map(|i| ((i + 1)..n).map(move |j| (i, j)))
        .collect()
}

/// The agent with strictly the most meta matchup wins. The tie counter
/// competes too: if it holds the maximum, or shares it, nobody is champion.
fn determine_champion(standings: &[(&str, u32)], ties: u32) -> Verdict {
    let best = standings
        .iter()
        .map(|&(_, wins)| wins)
        .chain(std::iter::once(ties))
        .max()
        .unwrap_or(0);
    let holders = standings.iter().filter(|&&(_, wins)| wins == best).count()
        + usize::from(ties == best);
    if holders != 1 {
        return Verdict::NoClearWinner;
    }
    standings
        .iter()
        .find(|&&(_, wins)| wins == best)
        .map(|&(name, _)| Verdict::Winner(name.to_string()))
        .unwrap_or(Verdict::NoClearWinner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BoardDimension;
    use connectx_core::{ColumnAgent, WinningMoveAgent};

    fn config() -> TournamentConfig {
        TournamentConfig::new(vec![BoardDimension::new(7, 6)], vec![4])
            .with_games(4)
            .with_threshold(10.0)
    }

    /// Plays column 0 against `victim`, an illegal column against anyone else
    fn picky(name: &str, victim: &'static str) -> Agent {
        Agent::from_fn(name, move |_board, _win_length, opponent| {
            Ok(if opponent == victim { 0 } else { -1 })
        })
    }

    #[test]
    fn test_generate_round_robin_pairings() {
        let pairings = generate_round_robin_pairings(4);
        assert_eq!(
            pairings,
            vec![(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)]
        );
        assert!(generate_round_robin_pairings(0).is_empty());
        assert!(generate_round_robin_pairings(1).is_empty());
    }

    #[test]
    fn test_determine_champion() {
        assert_eq!(
            determine_champion(&[("a", 2), ("b", 1)], 0),
            Verdict::Winner("a".to_string())
        );
        assert_eq!(determine_champion(&[("a", 1), ("b", 1)], 0), Verdict::NoClearWinner);
        assert_eq!(determine_champion(&[("a", 1), ("b", 0)], 1), Verdict::NoClearWinner);
        assert_eq!(determine_champion(&[("a", 0), ("b", 0)], 1), Verdict::NoClearWinner);
        assert_eq!(determine_champion(&[], 0), Verdict::NoClearWinner);
    }

    #[test]
    fn test_cyclic_roster_has_no_champion() {
        let roster = vec![picky("A", "B"), picky("B", "C"), picky("C", "A")];
        let mut tournament = Tournament::new(config(), roster).unwrap();
        let champion = tournament.play_tournament().unwrap();

        assert_eq!(champion, Verdict::NoClearWinner);
        assert_eq!(tournament.tally(), vec![("A", 1), ("B", 1), ("C", 1)]);
        assert_eq!(tournament.ties(), 0);
        assert_eq!(tournament.meta_matchups().len(), 3);
    }

    #[test]
    fn test_dominant_agent_is_champion() {
        let roster = vec![
            Agent::new("left", ColumnAgent::new(0)),
            Agent::new("greedy", WinningMoveAgent::new("greedy")),
            Agent::new("right", ColumnAgent::new(6)),
        ];
        let mut tournament = Tournament::new(config(), roster).unwrap();

        let mut seen = Vec::new();
        let champion = tournament
            .play_tournament_with(|meta| {
                seen.push((
                    meta.first_agent().name().to_string(),
                    meta.second_agent().name().to_string(),
                ))
            })
            .unwrap();

        assert_eq!(champion, Verdict::Winner("greedy".to_string()));
        assert_eq!(tournament.tally(), vec![("left", 0), ("greedy", 2), ("right", 0)]);
        // Column racers split their games evenly
        assert_eq!(tournament.ties(), 1);
        assert_eq!(seen[0], ("left".to_string(), "greedy".to_string()));
        assert_eq!(seen[2], ("greedy".to_string(), "right".to_string()));
        assert_eq!(tournament.champion().unwrap(), &champion);
    }

    #[test]
    fn test_champion_before_play() {
        let tournament = Tournament::new(config(), vec![picky("A", "B")]).unwrap();
        assert!(matches!(tournament.champion(), Err(TournamentError::NotPlayed)));
    }

    #[test]
    fn test_second_run_rejected() {
        let roster = vec![picky("A", "B"), picky("B", "A")];
        let mut tournament = Tournament::new(config(), roster).unwrap();
        tournament.play_tournament().unwrap();
        assert!(matches!(
            tournament.play_tournament(),
            Err(TournamentError::AlreadyPlayed)
        ));
    }

    #[test]
    fn test_failed_pairing_leaves_standings_untouched() {
        let roster = vec![picky("A", "B"), picky("B", "C"), picky("C", "A")];
        let mut tournament = Tournament::new(config(), roster).unwrap();

        let mut played = 0;
        let result = tournament.run_pairings(
            |config, first, second| {
                played += 1;
                if played == 2 {
                    return Err(TournamentError::InvalidConfig("board vanished".to_string()));
                }
                play_pairing(config, first, second)
            },
            |_| {},
        );

        assert!(matches!(result, Err(TournamentError::InvalidConfig(_))));
        assert_eq!(tournament.tally(), vec![("A", 0), ("B", 0), ("C", 0)]);
        assert_eq!(tournament.ties(), 0);
        assert!(tournament.meta_matchups().is_empty());
        assert!(matches!(tournament.champion(), Err(TournamentError::NotPlayed)));

        // A rerun counts every pairing exactly once
        let champion = tournament.play_tournament().unwrap();
        assert_eq!(champion, Verdict::NoClearWinner);
        assert_eq!(tournament.tally(), vec![("A", 1), ("B", 1), ("C", 1)]);
        assert_eq!(tournament.meta_matchups().len(), 3);
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let roster = vec![picky("A", "B"), picky("A", "C")];
        assert!(matches!(
            Tournament::new(config(), roster),
            Err(TournamentError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_single_agent_has_no_pairings() {
        let mut tournament = Tournament::new(config(), vec![picky("solo", "none")]).unwrap();
        let champion = tournament.play_tournament().unwrap();
        // A lone agent with zero wins ties the zero tie counter
        assert_eq!(champion, Verdict::NoClearWinner);
        assert!(tournament.meta_matchups().is_empty());
    }
}
