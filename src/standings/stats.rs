// Season-level talking points derived from a set of predictions: best and
// worst teams, the toughest division, bold calls, and the projected
// conference champions.

use serde::Serialize;

use crate::prediction::PredictionStore;
use crate::schedule::{Division, ScheduleGraph, Team};
use crate::standings::sort_by_record;

/// Win totals at or above this make a prediction "bold"; at or below the
/// loss-side mirror likewise.
const BOLD_WIN_THRESHOLD: u8 = 12;
const BOLD_LOSS_THRESHOLD: u8 = 4;

/// One team with its predicted record, for display.
#[derive(Debug, Clone, Serialize)]
pub struct TeamLine {
    pub id: String,
    pub name: String,
    pub record: String,
}

/// A division and the combined predicted wins of its four teams.
#[derive(Debug, Clone, Serialize)]
pub struct DivisionStrength {
    pub division: Division,
    pub combined_wins: u16,
}

/// The headline numbers for an exported season.
#[derive(Debug, Clone, Serialize)]
pub struct SeasonStats {
    pub best_team: Option<TeamLine>,
    pub worst_team: Option<TeamLine>,
    /// Highest combined win total across fully recorded divisions.
    pub toughest_division: Option<DivisionStrength>,
    /// Teams predicted to 12+ wins or 4-or-fewer wins.
    pub bold_predictions: Vec<TeamLine>,
    pub afc_champion: Option<TeamLine>,
    pub nfc_champion: Option<TeamLine>,
    pub completion_percent: u8,
}

fn team_line(schedule: &ScheduleGraph, store: &PredictionStore, id: &str) -> Option<TeamLine> {
    let team = schedule.team(id)?;
    let record = store.get(id)?;
    Some(TeamLine {
        id: team.id.clone(),
        name: team.name.clone(),
        record: record.summary(),
    })
}

/// Compute the full stats block. Every field degrades gracefully on a
/// partially recorded league; nothing here requires completion.
pub fn season_stats(schedule: &ScheduleGraph, store: &PredictionStore) -> SeasonStats {
    let mut recorded: Vec<_> = schedule
        .teams()
        .iter()
        .filter(|team| store.contains(&team.id))
        .collect();
    sort_by_record(schedule, store, &mut recorded);

    let best_team = recorded
        .first()
        .and_then(|team| team_line(schedule, store, &team.id));
    let worst_team = if recorded.len() > 1 {
        recorded
            .last()
            .and_then(|team| team_line(schedule, store, &team.id))
    } else {
        None
    };

    let toughest_division = Division::ALL
        .into_iter()
        .filter_map(|division| {
            let mut combined: u16 = 0;
            for team in schedule.teams_in_division(division) {
                combined += store.get(&team.id)?.wins as u16;
            }
            Some(DivisionStrength {
                division,
                combined_wins: combined,
            })
        })
        .max_by_key(|strength| strength.combined_wins);

    let bold_predictions = recorded
        .iter()
        .filter(|team| {
            let record = store.get(&team.id);
            record.is_some_and(|r| {
                r.wins >= BOLD_WIN_THRESHOLD || r.wins <= BOLD_LOSS_THRESHOLD
            })
        })
        .filter_map(|team| team_line(schedule, store, &team.id))
        .collect();

    // The projected champion is the conference's best predicted team, even
    // while its division is only partially filled in.
    let champion = |conference| {
        let mut field: Vec<&Team> = schedule
            .teams_in_conference(conference)
            .filter(|team| store.contains(&team.id))
            .collect();
        sort_by_record(schedule, store, &mut field);
        field
            .first()
            .and_then(|team| team_line(schedule, store, &team.id))
    };

    SeasonStats {
        best_team,
        worst_team,
        toughest_division,
        bold_predictions,
        afc_champion: champion(crate::schedule::Conference::Afc),
        nfc_champion: champion(crate::schedule::Conference::Nfc),
        completion_percent: store.completion_percent(),
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::prediction::PredictionRecord;
    use crate::schedule::test_league;

    fn record(wins: u8, division_wins: u8) -> PredictionRecord {
        PredictionRecord {
            wins,
            losses: 17 - wins,
            ties: 0,
            division_wins,
            game_results: BTreeMap::new(),
        }
    }

    #[test]
    fn empty_store_yields_empty_stats() {
        let league = test_league();
        let store = PredictionStore::new();
        let stats = season_stats(&league, &store);
        assert!(stats.best_team.is_none());
        assert!(stats.worst_team.is_none());
        assert!(stats.toughest_division.is_none());
        assert!(stats.bold_predictions.is_empty());
        assert_eq!(stats.completion_percent, 0);
    }

    #[test]
    fn best_worst_and_bold_from_a_few_records() {
        let league = test_league();
        let mut store = PredictionStore::new();
        store.insert("KC".into(), record(14, 5));
        store.insert("DEN".into(), record(3, 1));
        store.insert("BUF".into(), record(10, 4));

        let stats = season_stats(&league, &store);
        assert_eq!(stats.best_team.as_ref().unwrap().id, "KC");
        assert_eq!(stats.best_team.as_ref().unwrap().record, "14-3");
        assert_eq!(stats.worst_team.as_ref().unwrap().id, "DEN");
        // KC at 14 and DEN at 3 are bold; BUF at 10 is not.
        let bold_ids: Vec<&str> = stats
            .bold_predictions
            .iter()
            .map(|line| line.id.as_str())
            .collect();
        assert_eq!(bold_ids, ["KC", "DEN"]);
    }

    #[test]
    fn champions_come_from_partially_predicted_conferences() {
        let league = test_league();
        let mut store = PredictionStore::new();
        store.insert("KC".into(), record(14, 5));
        store.insert("BUF".into(), record(11, 4));

        let stats = season_stats(&league, &store);
        assert_eq!(stats.afc_champion.unwrap().id, "KC");
        assert!(stats.nfc_champion.is_none());
    }

    #[test]
    fn toughest_division_requires_all_four_records() {
        let league = test_league();
        let mut store = PredictionStore::new();
        // Full AFC West at modest totals, one strong loner elsewhere.
        for (id, wins) in [("DEN", 9u8), ("KC", 9), ("LV", 8), ("LAC", 8)] {
            store.insert(id.into(), record(wins, 3));
        }
        store.insert("BUF".into(), record(15, 6));

        let stats = season_stats(&league, &store);
        let toughest = stats.toughest_division.unwrap();
        // BUF's division is missing three records, so only the AFC West
        // qualifies despite BUF's 15 wins.
        assert_eq!(toughest.division.label(), "AFC West");
        assert_eq!(toughest.combined_wins, 34);
    }

    #[test]
    fn single_record_is_best_but_not_worst() {
        let league = test_league();
        let mut store = PredictionStore::new();
        store.insert("KC".into(), record(14, 5));
        let stats = season_stats(&league, &store);
        assert_eq!(stats.best_team.as_ref().unwrap().id, "KC");
        assert!(stats.worst_team.is_none());
    }
}
