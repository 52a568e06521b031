// Save path: validates a proposed record, commits it, and propagates
// per-game picks to the opponents' stored records so both sides of every
// fixture always agree.
//
// `apply_team_record` is copy-on-write: it takes the current store by
// reference and returns a new store, so a rejected save leaves the caller's
// state untouched and a successful one commits atomically.

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::{debug, warn};

use crate::prediction::constraints::MAX_TIES;
use crate::prediction::record::{GameOutcome, PredictionRecord, PredictionStore};
use crate::schedule::{
    Division, ScheduleGraph, Team, DIVISION_GAMES, DIVISION_WIN_POOL, GAMES_PER_SEASON,
    TOTAL_LEAGUE_WINS,
};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a proposed record was rejected. Every variant carries enough context
/// to tell the user what to change.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SaveError {
    #[error("unknown team `{id}`")]
    UnknownTeam { id: String },

    #[error(
        "record for {team} does not span the season: \
         {wins}-{losses}-{ties} must sum to {GAMES_PER_SEASON}"
    )]
    InvalidRecordSum {
        team: String,
        wins: u8,
        losses: u8,
        ties: u8,
    },

    #[error(
        "{team} cannot have {division_wins} division wins \
         (limit is min({DIVISION_GAMES}, {wins} total wins))"
    )]
    DivisionWinsOutOfRange {
        team: String,
        division_wins: u8,
        wins: u8,
    },

    #[error("game index {index} is out of range for {team} (0..{GAMES_PER_SEASON})")]
    GameIndexOutOfRange { team: String, index: u8 },

    #[error(
        "{team}'s {stat} total {total} is below its per-game picks ({picked})"
    )]
    AggregateBelowPicks {
        team: String,
        stat: &'static str,
        total: u8,
        picked: u8,
    },

    #[error(
        "{division} would total {total} division wins (max {expected}); \
         reduce somewhere by {fix}"
    )]
    DivisionOverflow {
        division: Division,
        total: u16,
        expected: u16,
        fix: u16,
    },

    #[error(
        "{division} can no longer reach {expected} division wins \
         (recorded {total}, {unrecorded} teams unrecorded)"
    )]
    DivisionUnreachable {
        division: Division,
        total: u16,
        expected: u16,
        unrecorded: u16,
    },

    #[error(
        "league {stat} total {total} exceeds {expected}; \
         reduce somewhere by {fix}"
    )]
    LeagueOverflow {
        stat: &'static str,
        total: u16,
        expected: u16,
        fix: u16,
    },

    #[error(
        "league {stat} total can no longer reach {expected} \
         (recorded {total}, {unrecorded} teams unrecorded)"
    )]
    LeagueUnreachable {
        stat: &'static str,
        total: u16,
        expected: u16,
        unrecorded: u16,
    },
}

// ---------------------------------------------------------------------------
// Record updates
// ---------------------------------------------------------------------------

/// A full replacement record for one team, as proposed by the caller.
#[derive(Debug, Clone, Default)]
pub struct RecordUpdate {
    pub wins: u8,
    pub losses: u8,
    pub ties: u8,
    pub division_wins: u8,
    pub game_results: BTreeMap<u8, GameOutcome>,
}

impl RecordUpdate {
    /// Start from a team's current record, or a season of blanks.
    pub fn from_existing(store: &PredictionStore, team_id: &str) -> RecordUpdate {
        match store.get(team_id) {
            Some(record) => RecordUpdate {
                wins: record.wins,
                losses: record.losses,
                ties: record.ties,
                division_wins: record.division_wins,
                game_results: record.game_results.clone(),
            },
            None => RecordUpdate {
                losses: GAMES_PER_SEASON,
                ..RecordUpdate::default()
            },
        }
    }

    /// Re-clamp the aggregate totals against the per-game picks, exactly as
    /// propagation does for an opponent it has just written a mirror into.
    pub fn normalize(&mut self, schedule: &ScheduleGraph, team: &Team) {
        let mut record = PredictionRecord {
            wins: self.wins,
            losses: self.losses,
            ties: self.ties,
            division_wins: self.division_wins,
            game_results: std::mem::take(&mut self.game_results),
        };
        normalize_aggregates(schedule, team, &mut record);
        self.wins = record.wins;
        self.losses = record.losses;
        self.ties = record.ties;
        self.division_wins = record.division_wins;
        self.game_results = record.game_results;
    }

    fn into_record(self) -> PredictionRecord {
        PredictionRecord {
            wins: self.wins,
            losses: self.losses,
            ties: self.ties,
            division_wins: self.division_wins,
            game_results: self.game_results,
        }
    }
}

/// Validate `update` against the schedule and the current store, then
/// commit it. On success the returned store has:
///
/// - the team's record replaced wholesale;
/// - the inverse of every added or changed game pick written into the
///   opponent's stored record, when the opponent has one;
/// - mirrored picks removed from opponents for every cleared pick, but only
///   while the mirror still matches the cleared value (an opponent's own
///   conflicting pick is left alone);
/// - every touched opponent's aggregates re-normalized so they never drop
///   below that opponent's per-game picks.
///
/// Fixtures whose counterpart cannot be resolved in the opponent's schedule
/// are logged and skipped rather than failing the save.
pub fn apply_team_record(
    schedule: &ScheduleGraph,
    store: &PredictionStore,
    team_id: &str,
    update: RecordUpdate,
) -> Result<PredictionStore, SaveError> {
    let team = schedule
        .team(team_id)
        .ok_or_else(|| SaveError::UnknownTeam { id: team_id.into() })?;

    validate_shape(team, &update)?;

    let previous: BTreeMap<u8, GameOutcome> = store
        .get(team_id)
        .map(|r| r.game_results.clone())
        .unwrap_or_default();

    let mut next = store.clone();
    next.insert(team_id.to_string(), update.into_record());

    propagate_picks(schedule, &mut next, team, &previous);

    validate_division_balance(schedule, &next, team)?;
    validate_league_totals(schedule, &next)?;

    debug!(team = team_id, "record committed");
    Ok(next)
}

fn validate_shape(team: &Team, update: &RecordUpdate) -> Result<(), SaveError> {
    if update.wins as u16 + update.losses as u16 + update.ties as u16 != GAMES_PER_SEASON as u16 {
        return Err(SaveError::InvalidRecordSum {
            team: team.id.clone(),
            wins: update.wins,
            losses: update.losses,
            ties: update.ties,
        });
    }
    if update.division_wins > DIVISION_GAMES || update.division_wins > update.wins {
        return Err(SaveError::DivisionWinsOutOfRange {
            team: team.id.clone(),
            division_wins: update.division_wins,
            wins: update.wins,
        });
    }
    if let Some((&index, _)) = update
        .game_results
        .iter()
        .find(|(&idx, _)| idx >= GAMES_PER_SEASON)
    {
        return Err(SaveError::GameIndexOutOfRange {
            team: team.id.clone(),
            index,
        });
    }

    let picked = PredictionRecord {
        wins: 0,
        losses: 0,
        ties: 0,
        division_wins: 0,
        game_results: update.game_results.clone(),
    }
    .picked_counts();
    for (stat, total, picked) in [
        ("win", update.wins, picked.wins),
        ("loss", update.losses, picked.losses),
        ("tie", update.ties, picked.ties),
    ] {
        if total < picked {
            return Err(SaveError::AggregateBelowPicks {
                team: team.id.clone(),
                stat,
                total,
                picked,
            });
        }
    }
    Ok(())
}

/// Mirror the diff between `previous` and the just-committed picks into the
/// stored records of already-recorded opponents.
fn propagate_picks(
    schedule: &ScheduleGraph,
    next: &mut PredictionStore,
    team: &Team,
    previous: &BTreeMap<u8, GameOutcome>,
) {
    let current: BTreeMap<u8, GameOutcome> = next
        .get(&team.id)
        .map(|r| r.game_results.clone())
        .unwrap_or_default();

    let mut touched: Vec<String> = Vec::new();

    // Added or changed picks: write the inverse into the opponent.
    for (&idx, &outcome) in &current {
        if previous.get(&idx) == Some(&outcome) {
            continue;
        }
        let Some(opponent_id) = team.opponents.get(idx as usize).cloned() else {
            continue;
        };
        let Some(mirror_idx) =
            schedule.corresponding_index(&team.id, idx as usize, &opponent_id)
        else {
            warn!(
                team = %team.id,
                game = idx,
                opponent = %opponent_id,
                "no corresponding fixture in opponent schedule, pick not mirrored"
            );
            continue;
        };
        if let Some(opponent) = next.get_mut(&opponent_id) {
            opponent
                .game_results
                .insert(mirror_idx as u8, outcome.invert());
            touched.push(opponent_id);
        }
    }

    // Cleared picks: remove the mirror, but only while it still matches the
    // inverse of what was cleared.
    for (&idx, &old_outcome) in previous {
        if current.contains_key(&idx) {
            continue;
        }
        let Some(opponent_id) = team.opponents.get(idx as usize).cloned() else {
            continue;
        };
        let Some(mirror_idx) =
            schedule.corresponding_index(&team.id, idx as usize, &opponent_id)
        else {
            continue;
        };
        if let Some(opponent) = next.get_mut(&opponent_id) {
            let mirror_idx = mirror_idx as u8;
            if opponent.game_results.get(&mirror_idx) == Some(&old_outcome.invert()) {
                opponent.game_results.remove(&mirror_idx);
                touched.push(opponent_id);
            }
        }
    }

    touched.sort();
    touched.dedup();
    for opponent_id in touched {
        let Some(opponent) = schedule.team(&opponent_id) else {
            continue;
        };
        if let Some(record) = next.get_mut(&opponent_id) {
            normalize_aggregates(schedule, opponent, record);
        }
    }
}

/// Pull a record's aggregate totals back into agreement with its per-game
/// picks after propagation changed them. Totals only ever move up to meet
/// the picks; slack above the picks is preserved where the season length
/// allows, and tie slack is surrendered before a win or loss total is
/// forced below its picked count. The result always satisfies
/// `wins >= picked.wins && losses >= picked.losses && ties >= picked.ties`.
pub fn normalize_aggregates(
    schedule: &ScheduleGraph,
    team: &Team,
    record: &mut PredictionRecord,
) {
    let picked = record.picked_counts();

    record.ties = record.ties.max(picked.ties);
    record.wins = record.wins.max(picked.wins);
    if record.wins + record.ties > GAMES_PER_SEASON {
        record.ties = (GAMES_PER_SEASON - record.wins).max(picked.ties);
        record.wins = record.wins.min(GAMES_PER_SEASON - record.ties);
    }
    record.losses = GAMES_PER_SEASON - record.wins - record.ties;
    if record.losses < picked.losses {
        let deficit = picked.losses - record.losses;
        let slack = record.ties - picked.ties;
        record.ties -= deficit.min(slack);
        record.losses = picked.losses;
        record.wins = GAMES_PER_SEASON - record.losses - record.ties;
    }

    let division_picked_wins = record
        .game_results
        .iter()
        .filter(|(&idx, &outcome)| {
            outcome == GameOutcome::Win && schedule.is_divisional_game(team, idx as usize)
        })
        .count() as u8;
    record.division_wins = record
        .division_wins
        .max(division_picked_wins)
        .min(DIVISION_GAMES)
        .min(record.wins);
}

// ---------------------------------------------------------------------------
// Post-commit balance checks
// ---------------------------------------------------------------------------

fn validate_division_balance(
    schedule: &ScheduleGraph,
    store: &PredictionStore,
    team: &Team,
) -> Result<(), SaveError> {
    let mut total: u16 = 0;
    let mut unrecorded: u16 = 0;
    for member in schedule.teams_in_division(team.division) {
        match store.get(&member.id) {
            Some(record) => total += record.division_wins as u16,
            None => unrecorded += 1,
        }
    }

    let expected = DIVISION_WIN_POOL as u16;
    if total > expected {
        return Err(SaveError::DivisionOverflow {
            division: team.division,
            total,
            expected,
            fix: total - expected,
        });
    }
    if total + DIVISION_GAMES as u16 * unrecorded < expected {
        return Err(SaveError::DivisionUnreachable {
            division: team.division,
            total,
            expected,
            unrecorded,
        });
    }
    Ok(())
}

fn validate_league_totals(
    schedule: &ScheduleGraph,
    store: &PredictionStore,
) -> Result<(), SaveError> {
    let mut total_wins: u16 = 0;
    let mut total_losses: u16 = 0;
    let mut total_ties: u16 = 0;
    let mut unrecorded: u16 = 0;
    for team in schedule.teams() {
        match store.get(&team.id) {
            Some(record) => {
                total_wins += record.wins as u16;
                total_losses += record.losses as u16;
                total_ties += record.ties as u16;
            }
            None => unrecorded += 1,
        }
    }

    // Each tied game removes one from both the win and loss targets, and
    // unrecorded teams can still lower the target by up to MAX_TIES/2
    // games each.
    let expected = TOTAL_LEAGUE_WINS - total_ties / 2;
    let floor = expected.saturating_sub(MAX_TIES as u16 / 2 * unrecorded);
    let slack = GAMES_PER_SEASON as u16 * unrecorded;
    for (stat, total) in [("win", total_wins), ("loss", total_losses)] {
        if total > expected {
            return Err(SaveError::LeagueOverflow {
                stat,
                total,
                expected,
                fix: total - expected,
            });
        }
        if total + slack < floor {
            return Err(SaveError::LeagueUnreachable {
                stat,
                total,
                expected,
                unrecorded,
            });
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::test_league;

    fn update(wins: u8, losses: u8, ties: u8, division_wins: u8) -> RecordUpdate {
        RecordUpdate {
            wins,
            losses,
            ties,
            division_wins,
            game_results: BTreeMap::new(),
        }
    }

    fn first_meeting(league: &crate::schedule::ScheduleGraph, a: &str, b: &str) -> (u8, u8) {
        let idx = league
            .team(a)
            .unwrap()
            .opponents
            .iter()
            .position(|o| o == b)
            .unwrap();
        let mirror = league.corresponding_index(a, idx, b).unwrap();
        (idx as u8, mirror as u8)
    }

    #[test]
    fn save_inserts_a_new_record() {
        let league = test_league();
        let store = PredictionStore::new();
        let next = apply_team_record(&league, &store, "KC", update(14, 3, 0, 5)).unwrap();
        assert_eq!(next.get("KC").unwrap().summary(), "14-3");
        // Copy-on-write: the original store is untouched.
        assert!(store.is_empty());
    }

    #[test]
    fn save_rejects_unknown_team() {
        let league = test_league();
        let store = PredictionStore::new();
        let err = apply_team_record(&league, &store, "ZZZ", update(9, 8, 0, 3)).unwrap_err();
        assert!(matches!(err, SaveError::UnknownTeam { .. }));
    }

    #[test]
    fn save_rejects_bad_record_sum() {
        let league = test_league();
        let store = PredictionStore::new();
        let err = apply_team_record(&league, &store, "KC", update(14, 4, 0, 5)).unwrap_err();
        assert!(matches!(err, SaveError::InvalidRecordSum { .. }));
    }

    #[test]
    fn save_rejects_division_wins_above_total_wins() {
        let league = test_league();
        let store = PredictionStore::new();
        let err = apply_team_record(&league, &store, "KC", update(3, 14, 0, 5)).unwrap_err();
        assert!(matches!(err, SaveError::DivisionWinsOutOfRange { .. }));
    }

    #[test]
    fn save_rejects_aggregates_below_picks() {
        let league = test_league();
        let store = PredictionStore::new();
        let mut u = update(1, 16, 0, 1);
        u.game_results.insert(0, GameOutcome::Win);
        u.game_results.insert(1, GameOutcome::Win);
        let err = apply_team_record(&league, &store, "KC", u).unwrap_err();
        assert_eq!(
            err,
            SaveError::AggregateBelowPicks {
                team: "KC".into(),
                stat: "win",
                total: 1,
                picked: 2,
            }
        );
    }

    #[test]
    fn save_rejects_division_overflow() {
        let league = test_league();
        let mut store = PredictionStore::new();
        store = apply_team_record(&league, &store, "KC", update(15, 2, 0, 6)).unwrap();
        store = apply_team_record(&league, &store, "LV", update(12, 5, 0, 6)).unwrap();
        let err = apply_team_record(&league, &store, "DEN", update(9, 8, 0, 1)).unwrap_err();
        assert_eq!(
            err,
            SaveError::DivisionOverflow {
                division: league.team("DEN").unwrap().division,
                total: 13,
                expected: 12,
                fix: 1,
            }
        );
    }

    #[test]
    fn save_rejects_unreachable_division_pool() {
        let league = test_league();
        let mut store = PredictionStore::new();
        store = apply_team_record(&league, &store, "KC", update(4, 13, 0, 0)).unwrap();
        store = apply_team_record(&league, &store, "LV", update(5, 12, 0, 0)).unwrap();
        // Two teams left can supply at most 12 combined, so 0 is still
        // reachable; a third low record makes 12 impossible.
        let err = apply_team_record(&league, &store, "LAC", update(5, 12, 0, 0)).unwrap_err();
        assert!(matches!(err, SaveError::DivisionUnreachable { .. }));
    }

    #[test]
    fn pick_mirrors_into_recorded_opponent() {
        let league = test_league();
        let (kc_idx, den_idx) = first_meeting(&league, "KC", "DEN");

        let mut store = PredictionStore::new();
        store = apply_team_record(&league, &store, "DEN", update(9, 8, 0, 3)).unwrap();

        let mut u = update(14, 3, 0, 5);
        u.game_results.insert(kc_idx, GameOutcome::Win);
        store = apply_team_record(&league, &store, "KC", u).unwrap();

        let den = store.get("DEN").unwrap();
        assert_eq!(den.game_results.get(&den_idx), Some(&GameOutcome::Loss));
    }

    #[test]
    fn tie_mirrors_as_tie() {
        let league = test_league();
        let (kc_idx, den_idx) = first_meeting(&league, "KC", "DEN");

        let mut store = PredictionStore::new();
        store = apply_team_record(&league, &store, "DEN", update(9, 8, 0, 3)).unwrap();

        let mut u = update(13, 3, 1, 5);
        u.game_results.insert(kc_idx, GameOutcome::Tie);
        store = apply_team_record(&league, &store, "KC", u).unwrap();

        let den = store.get("DEN").unwrap();
        assert_eq!(den.game_results.get(&den_idx), Some(&GameOutcome::Tie));
        // DEN's aggregates were normalized to cover the inferred tie.
        assert_eq!(den.ties, 1);
        assert_eq!(den.wins + den.losses + den.ties, GAMES_PER_SEASON);
    }

    #[test]
    fn pick_does_not_create_opponent_records() {
        let league = test_league();
        let (kc_idx, _) = first_meeting(&league, "KC", "DEN");

        let store = PredictionStore::new();
        let mut u = update(14, 3, 0, 5);
        u.game_results.insert(kc_idx, GameOutcome::Win);
        let next = apply_team_record(&league, &store, "KC", u).unwrap();

        assert!(next.get("DEN").is_none());
        assert_eq!(next.len(), 1);
    }

    #[test]
    fn changing_a_pick_moves_the_mirror() {
        let league = test_league();
        let (kc_idx, den_idx) = first_meeting(&league, "KC", "DEN");

        let mut store = PredictionStore::new();
        store = apply_team_record(&league, &store, "DEN", update(9, 8, 0, 3)).unwrap();
        let mut u = update(14, 3, 0, 5);
        u.game_results.insert(kc_idx, GameOutcome::Win);
        store = apply_team_record(&league, &store, "KC", u).unwrap();

        // KC flips the same game to a loss; DEN's mirror follows.
        let mut u = update(14, 3, 0, 5);
        u.game_results.insert(kc_idx, GameOutcome::Loss);
        store = apply_team_record(&league, &store, "KC", u).unwrap();
        assert_eq!(
            store.get("DEN").unwrap().game_results.get(&den_idx),
            Some(&GameOutcome::Win)
        );
    }

    #[test]
    fn clearing_a_pick_removes_the_mirror() {
        let league = test_league();
        let (kc_idx, den_idx) = first_meeting(&league, "KC", "DEN");

        let mut store = PredictionStore::new();
        store = apply_team_record(&league, &store, "DEN", update(9, 8, 0, 3)).unwrap();
        let mut u = update(14, 3, 0, 5);
        u.game_results.insert(kc_idx, GameOutcome::Win);
        store = apply_team_record(&league, &store, "KC", u).unwrap();
        assert!(store.get("DEN").unwrap().game_results.contains_key(&den_idx));

        // Re-save KC without the pick.
        store = apply_team_record(&league, &store, "KC", update(14, 3, 0, 5)).unwrap();
        assert!(!store.get("DEN").unwrap().game_results.contains_key(&den_idx));
    }

    #[test]
    fn clearing_a_pick_keeps_a_diverged_opponent_pick() {
        // Imported data can hold both sides of a fixture without the picks
        // agreeing. Clearing KC's pick must only remove a mirror that still
        // matches it, not DEN's own diverged pick.
        let league = test_league();
        let (kc_idx, den_idx) = first_meeting(&league, "KC", "DEN");

        let mut store = PredictionStore::new();
        let mut kc = PredictionRecord {
            wins: 14,
            losses: 3,
            ties: 0,
            division_wins: 5,
            game_results: BTreeMap::new(),
        };
        kc.game_results.insert(kc_idx, GameOutcome::Win);
        store.insert("KC".into(), kc);
        let mut den = PredictionRecord {
            wins: 9,
            losses: 8,
            ties: 0,
            division_wins: 3,
            game_results: BTreeMap::new(),
        };
        den.game_results.insert(den_idx, GameOutcome::Win);
        store.insert("DEN".into(), den);

        let store = apply_team_record(&league, &store, "KC", update(14, 3, 0, 5)).unwrap();
        assert_eq!(
            store.get("DEN").unwrap().game_results.get(&den_idx),
            Some(&GameOutcome::Win)
        );
    }

    #[test]
    fn normalization_raises_opponent_totals_to_cover_mirrors() {
        let league = test_league();
        let (kc_idx, den_idx) = first_meeting(&league, "KC", "DEN");

        let mut store = PredictionStore::new();
        // DEN recorded as a win-less season.
        store = apply_team_record(&league, &store, "DEN", update(0, 17, 0, 0)).unwrap();

        // KC picks a loss to DEN: the mirror is a DEN win, so DEN's totals
        // must rise to cover it, and it is a divisional win.
        let mut u = update(14, 3, 0, 5);
        u.game_results.insert(kc_idx, GameOutcome::Loss);
        store = apply_team_record(&league, &store, "KC", u).unwrap();

        let den = store.get("DEN").unwrap();
        assert_eq!(den.game_results.get(&den_idx), Some(&GameOutcome::Win));
        assert_eq!(den.wins, 1);
        assert_eq!(den.losses, 16);
        assert_eq!(den.division_wins, 1);
    }

    #[test]
    fn normalization_spends_tie_slack_before_wins() {
        let league = test_league();
        let (kc_idx, den_idx) = first_meeting(&league, "KC", "DEN");

        // DEN decides 15 games (10 wins, 5 losses), leaves both KC meetings
        // open, and carries the two open games as ties in the aggregate.
        let den = league.team("DEN").unwrap();
        let open: Vec<u8> = den
            .opponents
            .iter()
            .enumerate()
            .filter(|(_, o)| o.as_str() == "KC")
            .map(|(i, _)| i as u8)
            .collect();
        assert_eq!(open.len(), 2);
        let mut u = update(10, 5, 2, 6);
        let mut wins_left = 10;
        for idx in 0..GAMES_PER_SEASON {
            if open.contains(&idx) {
                continue;
            }
            let pick = if wins_left > 0 {
                wins_left -= 1;
                GameOutcome::Win
            } else {
                GameOutcome::Loss
            };
            u.game_results.insert(idx, pick);
        }
        let mut store = PredictionStore::new();
        store = apply_team_record(&league, &store, "DEN", u).unwrap();

        let mut u = update(14, 3, 0, 5);
        u.game_results.insert(kc_idx, GameOutcome::Win);
        store = apply_team_record(&league, &store, "KC", u).unwrap();

        // The mirrored loss is funded from DEN's tie slack, never from its
        // 10 picked wins.
        let den = store.get("DEN").unwrap();
        assert_eq!(den.game_results.get(&den_idx), Some(&GameOutcome::Loss));
        assert_eq!((den.wins, den.losses, den.ties), (10, 6, 1));
    }

    #[test]
    fn unresolvable_fixture_is_skipped_not_fatal() {
        let league = test_league();
        let (kc_idx, _) = first_meeting(&league, "KC", "DEN");

        // Corrupt DEN's schedule so the mirror cannot be resolved.
        let mut teams = league.teams().to_vec();
        let den_pos = teams.iter().position(|t| t.id == "DEN").unwrap();
        for opponent in &mut teams[den_pos].opponents {
            if opponent == "KC" {
                *opponent = "LV".to_string();
            }
        }
        let broken = crate::schedule::ScheduleGraph::new(league.season(), teams);

        let mut store = PredictionStore::new();
        store = apply_team_record(&broken, &store, "DEN", update(9, 8, 0, 3)).unwrap();
        let mut u = update(14, 3, 0, 5);
        u.game_results.insert(kc_idx, GameOutcome::Win);
        let next = apply_team_record(&broken, &store, "KC", u).unwrap();

        // KC's pick is kept, DEN is untouched.
        assert!(next.get("KC").unwrap().game_results.contains_key(&kc_idx));
        assert!(next.get("DEN").unwrap().game_results.is_empty());
    }

    #[test]
    fn save_rejects_league_overflow() {
        let league = test_league();
        let mut store = PredictionStore::new();
        // 30 teams at 9-8: 270 league wins, still reachable both ways with
        // two teams pending. Every division holds 3+3+3 with at most one
        // member unrecorded, so division balance stays legal throughout.
        let others: Vec<&str> = league
            .teams()
            .iter()
            .map(|t| t.id.as_str())
            .filter(|id| *id != "DEN")
            .collect();
        for id in &others[..30] {
            store = apply_team_record(&league, &store, id, update(9, 8, 0, 3)).unwrap();
        }
        assert_eq!(store.len(), 30);

        // A 31st team at 9 wins would push the league to 279.
        let err = apply_team_record(&league, &store, others[30], update(9, 8, 0, 3)).unwrap_err();
        assert_eq!(
            err,
            SaveError::LeagueOverflow {
                stat: "win",
                total: 279,
                expected: 272,
                fix: 7,
            }
        );
    }
}
