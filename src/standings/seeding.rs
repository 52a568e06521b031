// Playoff seeding: four division winners plus three wild cards per
// conference. A division enters the field only once all four of its teams
// have records, so partially predicted conferences yield partial fields
// and a half-predicted division contributes neither a winner nor wild
// card candidates.

use serde::Serialize;

use crate::prediction::PredictionStore;
use crate::schedule::{Conference, ScheduleGraph, Team};
use crate::standings::{division_standings, sort_by_record};

/// The playoff field for one conference, best seed first within each group.
#[derive(Debug, Clone, Serialize)]
pub struct ConferenceSeeding {
    pub conference: Conference,
    /// Winners of fully predicted divisions, ordered best record first.
    /// Fewer than 4 entries while divisions are incomplete.
    pub division_winners: Vec<String>,
    /// The best 3 non-winners from fully predicted divisions.
    pub wild_cards: Vec<String>,
}

impl ConferenceSeeding {
    /// The conference's top seed, when at least one division has settled.
    pub fn top_seed(&self) -> Option<&str> {
        self.division_winners.first().map(String::as_str)
    }

    pub fn is_complete(&self) -> bool {
        self.division_winners.len() == 4 && self.wild_cards.len() == 3
    }
}

pub fn conference_seeding(
    schedule: &ScheduleGraph,
    store: &PredictionStore,
    conference: Conference,
) -> ConferenceSeeding {
    let mut winners: Vec<&Team> = Vec::new();
    let mut field: Vec<&Team> = Vec::new();
    for division in conference.divisions() {
        let fully_predicted = schedule
            .teams_in_division(division)
            .all(|team| store.contains(&team.id));
        if !fully_predicted {
            continue;
        }
        let mut standings = division_standings(schedule, store, division).into_iter();
        if let Some(leader) = standings.next() {
            winners.push(leader);
        }
        field.extend(standings);
    }
    sort_by_record(schedule, store, &mut winners);
    sort_by_record(schedule, store, &mut field);
    field.truncate(3);

    ConferenceSeeding {
        conference,
        division_winners: winners.iter().map(|t| t.id.clone()).collect(),
        wild_cards: field.iter().map(|t| t.id.clone()).collect(),
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
