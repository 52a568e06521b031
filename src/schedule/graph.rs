// The schedule graph: team lookups and the game-index correspondence
// resolver. Pure functions over static data; nothing here mutates.

use std::collections::HashMap;

use serde::Deserialize;
use thiserror::Error;

use super::team::{Conference, Division, Team};
use super::{DIVISION_GAMES, GAMES_PER_SEASON, LEAGUE_SIZE};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("failed to parse schedule feed: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("schedule has {found} teams, expected {LEAGUE_SIZE}")]
    WrongLeagueSize { found: usize },

    #[error("duplicate team id `{id}` in schedule feed")]
    DuplicateTeam { id: String },

    #[error("team `{team}` has {found} opponents, expected {GAMES_PER_SEASON}")]
    WrongGameCount { team: String, found: usize },

    #[error("team `{team}` lists unknown opponent `{opponent}`")]
    UnknownOpponent { team: String, opponent: String },

    #[error("team `{team}` lists itself as an opponent")]
    SelfOpponent { team: String },

    #[error(
        "asymmetric fixtures: `{team_a}` plays `{team_b}` {count_a} time(s) \
         but `{team_b}` plays `{team_a}` {count_b} time(s)"
    )]
    AsymmetricFixtures {
        team_a: String,
        team_b: String,
        count_a: usize,
        count_b: usize,
    },

    #[error("team `{team}` has {found} divisional games, expected {DIVISION_GAMES}")]
    WrongDivisionGameCount { team: String, found: usize },

    #[error("team `{team}` declares conference {declared} but its division is {division}")]
    ConferenceMismatch {
        team: String,
        declared: Conference,
        division: Division,
    },
}

// ---------------------------------------------------------------------------
// Feed shape
// ---------------------------------------------------------------------------

/// Top-level shape of the schedule JSON document.
#[derive(Debug, Deserialize)]
struct ScheduleFile {
    season: u16,
    teams: Vec<Team>,
}

// ---------------------------------------------------------------------------
// Graph
// ---------------------------------------------------------------------------

/// The full league schedule: 32 teams, 17 opponents each.
#[derive(Debug, Clone)]
pub struct ScheduleGraph {
    season: u16,
    teams: Vec<Team>,
    by_id: HashMap<String, usize>,
}

impl ScheduleGraph {
    /// Build a graph without integrity validation. Callers loading external
    /// data should prefer [`ScheduleGraph::from_json`].
    pub fn new(season: u16, teams: Vec<Team>) -> Self {
        let by_id = teams
            .iter()
            .enumerate()
            .map(|(i, t)| (t.id.clone(), i))
            .collect();
        ScheduleGraph {
            season,
            teams,
            by_id,
        }
    }

    /// Parse and validate a schedule feed document.
    pub fn from_json(text: &str) -> Result<Self, ScheduleError> {
        let file: ScheduleFile = serde_json::from_str(text)?;
        let graph = ScheduleGraph::new(file.season, file.teams);
        graph.validate()?;
        Ok(graph)
    }

    /// Check the structural invariants of the schedule: league size, unique
    /// ids, 17 opponents per team, referential integrity, pairwise fixture
    /// symmetry, 6 divisional games per team, and conference/division
    /// agreement.
    pub fn validate(&self) -> Result<(), ScheduleError> {
        if self.teams.len() != LEAGUE_SIZE {
            return Err(ScheduleError::WrongLeagueSize {
                found: self.teams.len(),
            });
        }
        if self.by_id.len() != self.teams.len() {
            // Find the id that collided for a useful message.
            let mut seen = HashMap::new();
            for team in &self.teams {
                if seen.insert(team.id.as_str(), ()).is_some() {
                    return Err(ScheduleError::DuplicateTeam {
                        id: team.id.clone(),
                    });
                }
            }
        }

        for team in &self.teams {
            if team.conference != team.division.conference() {
                return Err(ScheduleError::ConferenceMismatch {
                    team: team.id.clone(),
                    declared: team.conference,
                    division: team.division,
                });
            }
            if team.opponents.len() != GAMES_PER_SEASON as usize {
                return Err(ScheduleError::WrongGameCount {
                    team: team.id.clone(),
                    found: team.opponents.len(),
                });
            }

            let mut division_games = 0usize;
            for opponent_id in &team.opponents {
                if opponent_id == &team.id {
                    return Err(ScheduleError::SelfOpponent {
                        team: team.id.clone(),
                    });
                }
                let Some(opponent) = self.team(opponent_id) else {
                    return Err(ScheduleError::UnknownOpponent {
                        team: team.id.clone(),
                        opponent: opponent_id.clone(),
                    });
                };
                if opponent.division == team.division {
                    division_games += 1;
                }
            }
            if division_games != DIVISION_GAMES as usize {
                return Err(ScheduleError::WrongDivisionGameCount {
                    team: team.id.clone(),
                    found: division_games,
                });
            }
        }

        // Pairwise symmetry: A plays B as often as B plays A.
        for a in &self.teams {
            for b in &self.teams {
                if a.id >= b.id {
                    continue;
                }
                let count_a = a.opponents.iter().filter(|o| **o == b.id).count();
                let count_b = b.opponents.iter().filter(|o| **o == a.id).count();
                if count_a != count_b {
                    return Err(ScheduleError::AsymmetricFixtures {
                        team_a: a.id.clone(),
                        team_b: b.id.clone(),
                        count_a,
                        count_b,
                    });
                }
            }
        }

        Ok(())
    }

    pub fn season(&self) -> u16 {
        self.season
    }

    /// All teams in feed order.
    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    /// Look up a team by id.
    pub fn team(&self, id: &str) -> Option<&Team> {
        self.by_id.get(id).map(|&i| &self.teams[i])
    }

    /// All teams in a division, in feed order.
    pub fn teams_in_division(&self, division: Division) -> impl Iterator<Item = &Team> {
        self.teams.iter().filter(move |t| t.division == division)
    }

    /// All teams in a conference, in feed order.
    pub fn teams_in_conference(&self, conference: Conference) -> impl Iterator<Item = &Team> {
        self.teams
            .iter()
            .filter(move |t| t.division.conference() == conference)
    }

    /// Division rivals of a team (the other 3 teams in its division).
    pub fn division_rivals<'a>(&'a self, team: &'a Team) -> impl Iterator<Item = &'a Team> {
        self.teams_in_division(team.division)
            .filter(move |t| t.id != team.id)
    }

    /// True if the fixture at `game_idx` in `team`'s schedule is against a
    /// divisional rival.
    pub fn is_divisional_game(&self, team: &Team, game_idx: usize) -> bool {
        team.opponents
            .get(game_idx)
            .and_then(|id| self.team(id))
            .is_some_and(|opponent| opponent.division == team.division)
    }

    /// Find the index in `team_b`'s schedule of the fixture that `team_a`
    /// plays at `game_idx`.
    ///
    /// Teams may meet twice, so the match is by ordinal occurrence: count
    /// which meeting with `team_b` this is in `team_a`'s schedule, then find
    /// the same ordinal meeting with `team_a` in `team_b`'s schedule. Returns
    /// `None` for unknown teams or when the ordinal cannot be matched
    /// (corrupt schedule data).
    pub fn corresponding_index(
        &self,
        team_a: &str,
        game_idx: usize,
        team_b: &str,
    ) -> Option<usize> {
        let a = self.team(team_a)?;
        let b = self.team(team_b)?;
        if game_idx >= a.opponents.len() || a.opponents[game_idx] != b.id {
            return None;
        }

        let occurrence = a.opponents[..=game_idx]
            .iter()
            .filter(|o| **o == b.id)
            .count();

        let mut seen = 0usize;
        for (i, opponent_id) in b.opponents.iter().enumerate() {
            if *opponent_id == a.id {
                seen += 1;
                if seen == occurrence {
                    return Some(i);
                }
            }
        }
        None
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
