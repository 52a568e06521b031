// Prediction records and the prediction store.
//
// A record's `game_results` holds only authoritative picks: games the
// team's own user decided, plus inverses propagated by the sync engine
// once both sides have records. Results inferred from an opponent's picks
// before that point are never stored; they are merged in at query time by
// `merged_game_results`.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::schedule::{ScheduleGraph, DIVISION_GAMES, GAMES_PER_SEASON, LEAGUE_SIZE};

// ---------------------------------------------------------------------------
// Game outcomes
// ---------------------------------------------------------------------------

/// The predicted outcome of a single fixture, from one team's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOutcome {
    #[serde(rename = "W")]
    Win,
    #[serde(rename = "L")]
    Loss,
    #[serde(rename = "T")]
    Tie,
}

impl GameOutcome {
    /// The same fixture seen from the opponent's side.
    pub fn invert(&self) -> GameOutcome {
        match self {
            GameOutcome::Win => GameOutcome::Loss,
            GameOutcome::Loss => GameOutcome::Win,
            GameOutcome::Tie => GameOutcome::Tie,
        }
    }

    pub fn letter(&self) -> &'static str {
        match self {
            GameOutcome::Win => "W",
            GameOutcome::Loss => "L",
            GameOutcome::Tie => "T",
        }
    }
}

impl fmt::Display for GameOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.letter())
    }
}

impl std::str::FromStr for GameOutcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "W" | "w" => Ok(GameOutcome::Win),
            "L" | "l" => Ok(GameOutcome::Loss),
            "T" | "t" => Ok(GameOutcome::Tie),
            other => Err(format!("expected W, L or T, got `{other}`")),
        }
    }
}

// ---------------------------------------------------------------------------
// Prediction record
// ---------------------------------------------------------------------------

/// A single team's predicted season, as entered by the user.
///
/// The serialized shape matches the persisted/export JSON format:
/// camelCase field names, game results keyed by stringified game index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionRecord {
    /// Full-season win total. Always `wins + losses + ties == 17`.
    pub wins: u8,
    /// Full-season loss total.
    pub losses: u8,
    /// Full-season tie total. Absent in older exports, so defaulted.
    #[serde(default)]
    pub ties: u8,
    /// Divisional wins, 0-6. Division losses are derived as `6 - divisionWins`.
    /// Absent in older exports, so defaulted.
    #[serde(default)]
    pub division_wins: u8,
    /// Explicit per-game picks, keyed by game index 0-16. A strict subset of
    /// the 17 games; the aggregates above cover the full season.
    #[serde(default)]
    pub game_results: BTreeMap<u8, GameOutcome>,
}

impl PredictionRecord {
    /// Derived division losses. Division ties are not tracked in the
    /// aggregate; a divisional tie pick is absorbed into this bucket.
    pub fn division_losses(&self) -> u8 {
        DIVISION_GAMES.saturating_sub(self.division_wins)
    }

    /// Tally of this record's own explicit picks.
    pub fn picked_counts(&self) -> PickedCounts {
        PickedCounts::tally(self.game_results.values().copied())
    }

    /// "14-3" or "13-3-1" when ties are present.
    pub fn summary(&self) -> String {
        if self.ties > 0 {
            format!("{}-{}-{}", self.wins, self.losses, self.ties)
        } else {
            format!("{}-{}", self.wins, self.losses)
        }
    }
}

/// Win/loss/tie tally over a set of per-game picks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PickedCounts {
    pub wins: u8,
    pub losses: u8,
    pub ties: u8,
}

impl PickedCounts {
    pub fn tally(results: impl Iterator<Item = GameOutcome>) -> Self {
        let mut counts = PickedCounts::default();
        for result in results {
            match result {
                GameOutcome::Win => counts.wins += 1,
                GameOutcome::Loss => counts.losses += 1,
                GameOutcome::Tie => counts.ties += 1,
            }
        }
        counts
    }

    pub fn total(&self) -> u8 {
        self.wins + self.losses + self.ties
    }
}

// ---------------------------------------------------------------------------
// Prediction store
// ---------------------------------------------------------------------------

/// The mutable mapping from team id to prediction record; the sole source
/// of truth for user input.
///
/// The store is a value: every mutation path (`apply_team_record`, import)
/// produces a new store rather than editing shared state, so callers never
/// observe a partially-propagated update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PredictionStore {
    records: HashMap<String, PredictionRecord>,
}

impl PredictionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, team_id: &str) -> Option<&PredictionRecord> {
        self.records.get(team_id)
    }

    pub fn contains(&self, team_id: &str) -> bool {
        self.records.contains_key(team_id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &PredictionRecord)> {
        self.records.iter()
    }

    /// Percentage of teams predicted, rounded to the nearest integer.
    pub fn completion_percent(&self) -> u8 {
        ((self.len() as f64 / LEAGUE_SIZE as f64) * 100.0).round() as u8
    }

    pub(crate) fn insert(&mut self, team_id: String, record: PredictionRecord) {
        self.records.insert(team_id, record);
    }

    pub(crate) fn get_mut(&mut self, team_id: &str) -> Option<&mut PredictionRecord> {
        self.records.get_mut(team_id)
    }
}

// ---------------------------------------------------------------------------
// Two-tier merged results
// ---------------------------------------------------------------------------

/// A fixture result as seen from one team's side, tagged with whether it is
/// the team's own authoritative pick or was inferred by inverting an
/// opponent's pick at query time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameSlot {
    pub outcome: GameOutcome,
    pub inferred: bool,
}

/// Merge a team's own picks with results inferred from its opponents'
/// records. Own picks always win over inferred ones. Inferred results are
/// computed on the fly and never written back to the store.
pub fn merged_game_results(
    schedule: &ScheduleGraph,
    store: &PredictionStore,
    team_id: &str,
) -> BTreeMap<u8, GameSlot> {
    let mut merged = BTreeMap::new();
    let Some(team) = schedule.team(team_id) else {
        return merged;
    };

    if let Some(record) = store.get(team_id) {
        for (&idx, &outcome) in &record.game_results {
            merged.insert(
                idx,
                GameSlot {
                    outcome,
                    inferred: false,
                },
            );
        }
    }

    for game_idx in 0..GAMES_PER_SEASON {
        if merged.contains_key(&game_idx) {
            continue;
        }
        let Some(opponent_id) = team.opponents.get(game_idx as usize) else {
            continue;
        };
        let Some(opponent_record) = store.get(opponent_id) else {
            continue;
        };
        let Some(opp_idx) = schedule.corresponding_index(team_id, game_idx as usize, opponent_id)
        else {
            continue;
        };
        if let Some(opp_outcome) = opponent_record.game_results.get(&(opp_idx as u8)) {
            merged.insert(
                game_idx,
                GameSlot {
                    outcome: opp_outcome.invert(),
                    inferred: true,
                },
            );
        }
    }

    merged
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
