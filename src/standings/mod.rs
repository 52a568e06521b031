// Derived standings over the prediction store: record-based ordering,
// strength of schedule, and conference records. Everything here is computed
// on demand from the store; nothing is cached or persisted.

pub mod seeding;
pub mod stats;

pub use seeding::{conference_seeding, ConferenceSeeding};
pub use stats::{season_stats, SeasonStats};

use serde::Serialize;

use crate::prediction::record::{merged_game_results, PredictionStore};
use crate::prediction::GameOutcome;
use crate::schedule::{Division, ScheduleGraph, Team};

/// Combined predicted record of a team's 17 opponents. Opponents without a
/// record contribute nothing; `games` says how much of the schedule the
/// number actually covers.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct StrengthOfSchedule {
    pub wins: u16,
    pub losses: u16,
    pub ties: u16,
    pub games: u16,
}

impl StrengthOfSchedule {
    /// Opponents' combined winning percentage, counting a tie as half a
    /// win. Zero when no opponent has a record yet.
    pub fn win_percent(&self) -> f64 {
        if self.games == 0 {
            return 0.0;
        }
        (self.wins as f64 + self.ties as f64 / 2.0) / self.games as f64
    }
}

/// Sum the predicted records of every opponent on `team`'s schedule.
/// Opponents faced twice count twice, matching how hard the slate actually
/// is.
pub fn strength_of_schedule(
    schedule: &ScheduleGraph,
    store: &PredictionStore,
    team: &Team,
) -> StrengthOfSchedule {
    let mut sos = StrengthOfSchedule::default();
    for opponent_id in &team.opponents {
        if let Some(record) = store.get(opponent_id) {
            sos.wins += record.wins as u16;
            sos.losses += record.losses as u16;
            sos.ties += record.ties as u16;
            sos.games += (record.wins + record.losses + record.ties) as u16;
        }
    }
    sos
}

/// A team's record in games against its own conference, read from the
/// merged per-game picks (own picks plus inferred opponent picks). Games
/// with no pick on either side are not counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConferenceRecord {
    pub wins: u8,
    pub losses: u8,
    pub ties: u8,
}

pub fn conference_record(
    schedule: &ScheduleGraph,
    store: &PredictionStore,
    team: &Team,
) -> ConferenceRecord {
    let merged = merged_game_results(schedule, store, &team.id);
    let mut record = ConferenceRecord::default();
    for (&idx, slot) in &merged {
        let in_conference = team
            .opponents
            .get(idx as usize)
            .and_then(|id| schedule.team(id))
            .is_some_and(|opponent| opponent.conference == team.conference);
        if !in_conference {
            continue;
        }
        match slot.outcome {
            GameOutcome::Win => record.wins += 1,
            GameOutcome::Loss => record.losses += 1,
            GameOutcome::Tie => record.ties += 1,
        }
    }
    record
}

/// Order teams best-first: predicted wins, then division wins, then
/// strength of schedule (a harder slate ranks the same record higher),
/// then name as the stable tail. Unrecorded teams sink to the bottom.
pub fn sort_by_record<'a>(
    schedule: &ScheduleGraph,
    store: &PredictionStore,
    teams: &mut Vec<&'a Team>,
) {
    teams.sort_by(|a, b| {
        let rec_a = store.get(&a.id);
        let rec_b = store.get(&b.id);
        let wins = |r: Option<&crate::prediction::PredictionRecord>| {
            r.map(|r| r.wins).unwrap_or(0)
        };
        let division_wins = |r: Option<&crate::prediction::PredictionRecord>| {
            r.map(|r| r.division_wins).unwrap_or(0)
        };
        wins(rec_b)
            .cmp(&wins(rec_a))
            .then_with(|| division_wins(rec_b).cmp(&division_wins(rec_a)))
            .then_with(|| {
                let sos_a = strength_of_schedule(schedule, store, a).win_percent();
                let sos_b = strength_of_schedule(schedule, store, b).win_percent();
                sos_b.partial_cmp(&sos_a).unwrap_or(std::cmp::Ordering::Equal)
            })
            .then_with(|| a.name.cmp(&b.name))
    });
}

/// The four teams of a division, best record first.
pub fn division_standings<'a>(
    schedule: &'a ScheduleGraph,
    store: &PredictionStore,
    division: Division,
) -> Vec<&'a Team> {
    let mut teams: Vec<&Team> = schedule.teams_in_division(division).collect();
    sort_by_record(schedule, store, &mut teams);
    teams
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

    fn record(wins: u8, losses: u8, ties: u8, division_wins: u8) -> PredictionRecord {
        PredictionRecord {
            wins,
            losses,
            ties,
            division_wins,
            game_results: BTreeMap::new(),
        }
    }

    #[test]
    fn sort_orders_by_wins_then_division_wins() {
        let league = test_league();
        let mut store = crate::prediction::PredictionStore::new();
        store.insert("KC".into(), record(12, 5, 0, 5));
        store.insert("DEN".into(), record(12, 5, 0, 4));
        store.insert("LV".into(), record(13, 4, 0, 4));
        store.insert("LAC".into(), record(3, 14, 0, 0));

        let ordered = division_standings(&league, &store, league.team("KC").unwrap().division);
        let ids: Vec<&str> = ordered.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["LV", "KC", "DEN", "LAC"]);
    }

    #[test]
    fn sos_breaks_equal_records() {
        let league = test_league();
        let mut store = crate::prediction::PredictionStore::new();
        // Same record and division wins; every KC opponent gets a strong
        // record, so DEN (whose slate overlaps KC's but swaps KC in for
        // itself) ends up with the slightly softer schedule.
        store.insert("KC".into(), record(10, 7, 0, 3));
        store.insert("DEN".into(), record(10, 7, 0, 3));
        for opponent_id in &league.team("KC").unwrap().opponents.clone() {
            if opponent_id != "DEN" && store.get(opponent_id).is_none() {
                store.insert(opponent_id.clone(), record(12, 5, 0, 3));
            }
        }

        let kc = league.team("KC").unwrap();
        let den = league.team("DEN").unwrap();
        let sos_kc = strength_of_schedule(&league, &store, kc).win_percent();
        let sos_den = strength_of_schedule(&league, &store, den).win_percent();
        assert!(sos_kc > sos_den);

        let mut teams = vec![den, kc];
        sort_by_record(&league, &store, &mut teams);
        assert_eq!(teams[0].id, "KC");
    }

    #[test]
    fn unrecorded_teams_sort_last() {
        let league = test_league();
        let mut store = crate::prediction::PredictionStore::new();
        store.insert("DEN".into(), record(2, 15, 0, 1));

        let ordered = division_standings(&league, &store, league.team("DEN").unwrap().division);
        assert_eq!(ordered[0].id, "DEN");
    }

    #[test]
    fn conference_record_counts_only_conference_games() {
        let league = test_league();
        let mut store = crate::prediction::PredictionStore::new();
        let kc = league.team("KC").unwrap();

        // Pick a win in every game; conference record counts only the
        // games against AFC opponents.
        let mut rec = record(17, 0, 0, 6);
        for idx in 0..kc.opponents.len() {
            rec.game_results.insert(idx as u8, crate::prediction::GameOutcome::Win);
        }
        store.insert("KC".into(), rec);

        let conf = conference_record(&league, &store, kc);
        let afc_games = kc
            .opponents
            .iter()
            .filter(|id| league.team(id).is_some_and(|t| t.conference == kc.conference))
            .count() as u8;
        assert_eq!(conf.wins, afc_games);
        assert_eq!(conf.losses + conf.ties, 0);
        // 17-game slate: 12 conference games, 5 inter-conference.
        assert_eq!(afc_games, 12);
    }

    #[test]
    fn conference_record_sees_inferred_games() {
        let league = test_league();
        let mut store = crate::prediction::PredictionStore::new();

        // DEN has no picks of its own; KC picking a win over DEN shows up
        // in DEN's conference record as a loss.
        let kc = league.team("KC").unwrap();
        let meeting = kc.opponents.iter().position(|o| o == "DEN").unwrap();
        let mut rec = record(14, 3, 0, 5);
        rec.game_results
            .insert(meeting as u8, crate::prediction::GameOutcome::Win);
        store.insert("KC".into(), rec);

        let den = league.team("DEN").unwrap();
        let conf = conference_record(&league, &store, den);
        assert_eq!(
            conf,
            ConferenceRecord {
                wins: 0,
                losses: 1,
                ties: 0
            }
        );
    }
}
