// Snapshot import/export: the whole prediction store as one JSON document,
// keyed by team id. Import is strict and all-or-nothing; a malformed file
// never partially loads.

use serde_json::Value;
use thiserror::Error;
use tracing::info;

use crate::prediction::{PredictionRecord, PredictionStore};
use crate::schedule::{ScheduleGraph, DIVISION_GAMES, GAMES_PER_SEASON};

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("snapshot root must be an object keyed by team id")]
    NotAnObject,

    #[error("entry for `{team}` is not an object")]
    RecordNotAnObject { team: String },

    #[error("entry for `{team}` is missing numeric field `{field}`")]
    MissingField { team: String, field: &'static str },

    #[error("snapshot references unknown team `{id}`")]
    UnknownTeam { id: String },

    #[error("record for `{team}` is invalid: {reason}")]
    InvalidRecord { team: String, reason: String },
}

/// Serialize the store to pretty-printed JSON, one entry per recorded team.
pub fn export_snapshot(store: &PredictionStore) -> serde_json::Result<String> {
    serde_json::to_string_pretty(store)
}

/// Parse and validate a snapshot against the schedule. Field checks run
/// before deserialization so a missing `wins` or `losses` is reported as
/// such rather than as a generic parse failure.
pub fn import_snapshot(
    text: &str,
    schedule: &ScheduleGraph,
) -> Result<PredictionStore, SnapshotError> {
    let root: Value = serde_json::from_str(text)?;
    let entries = root.as_object().ok_or(SnapshotError::NotAnObject)?;

    let mut store = PredictionStore::new();
    for (team_id, entry) in entries {
        let team = schedule
            .team(team_id)
            .ok_or_else(|| SnapshotError::UnknownTeam {
                id: team_id.clone(),
            })?;

        let fields = entry
            .as_object()
            .ok_or_else(|| SnapshotError::RecordNotAnObject {
                team: team_id.clone(),
            })?;
        for field in ["wins", "losses"] {
            if !fields.get(field).is_some_and(Value::is_u64) {
                return Err(SnapshotError::MissingField {
                    team: team_id.clone(),
                    field,
                });
            }
        }

        let record: PredictionRecord =
            serde_json::from_value(entry.clone()).map_err(|err| SnapshotError::InvalidRecord {
                team: team_id.clone(),
                reason: err.to_string(),
            })?;
        check_record(team_id, team, &record)?;
        store.insert(team_id.clone(), record);
    }

    info!(teams = store.len(), "snapshot imported");
    Ok(store)
}

fn check_record(
    team_id: &str,
    team: &crate::schedule::Team,
    record: &PredictionRecord,
) -> Result<(), SnapshotError> {
    let invalid = |reason: String| SnapshotError::InvalidRecord {
        team: team_id.to_string(),
        reason,
    };

    let total = record.wins as u16 + record.losses as u16 + record.ties as u16;
    if total != GAMES_PER_SEASON as u16 {
        return Err(invalid(format!(
            "{}-{}-{} does not sum to {GAMES_PER_SEASON}",
            record.wins, record.losses, record.ties
        )));
    }
    if record.division_wins > DIVISION_GAMES || record.division_wins > record.wins {
        return Err(invalid(format!(
            "{} division wins exceeds min({DIVISION_GAMES}, {} total wins)",
            record.division_wins, record.wins
        )));
    }
    if let Some(&index) = record
        .game_results
        .keys()
        .find(|&&idx| idx as usize >= team.opponents.len())
    {
        return Err(invalid(format!("game index {index} out of range")));
    }

    let picked = record.picked_counts();
    if record.wins < picked.wins || record.losses < picked.losses || record.ties < picked.ties {
        return Err(invalid(format!(
            "totals {}-{}-{} below per-game picks {}-{}-{}",
            record.wins, record.losses, record.ties, picked.wins, picked.losses, picked.ties
        )));
    }
    Ok(())
}

/// Default filename for an export, stamped with today's date.
pub fn default_export_name(season: u16) -> String {
    format!(
        "gridcast-{season}-predictions-{}.json",
        chrono::Local::now().format("%Y%m%d")
    )
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::prediction::GameOutcome;
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
    fn export_then_import_round_trips() {
        let league = test_league();
        let mut store = PredictionStore::new();
        let mut kc = record(14, 2, 1, 5);
        kc.game_results.insert(0, GameOutcome::Win);
        kc.game_results.insert(6, GameOutcome::Tie);
        store.insert("KC".into(), kc);
        store.insert("DEN".into(), record(9, 7, 1, 3));

        let text = export_snapshot(&store).unwrap();
        let restored = import_snapshot(&text, &league).unwrap();
        assert_eq!(restored.len(), 2);
        let kc = restored.get("KC").unwrap();
        assert_eq!(kc.wins, 14);
        assert_eq!(kc.game_results.get(&6), Some(&GameOutcome::Tie));
    }

    #[test]
    fn import_rejects_missing_losses() {
        let league = test_league();
        let text = r#"{"KC": {"wins": 14, "divisionWins": 5}}"#;
        let err = import_snapshot(text, &league).unwrap_err();
        assert!(matches!(
            err,
            SnapshotError::MissingField {
                field: "losses",
                ..
            }
        ));
    }

    #[test]
    fn import_rejects_non_numeric_wins() {
        let league = test_league();
        let text = r#"{"KC": {"wins": "fourteen", "losses": 3}}"#;
        let err = import_snapshot(text, &league).unwrap_err();
        assert!(matches!(
            err,
            SnapshotError::MissingField { field: "wins", .. }
        ));
    }

    #[test]
    fn import_rejects_unknown_team() {
        let league = test_league();
        let text = r#"{"XYZ": {"wins": 9, "losses": 8}}"#;
        let err = import_snapshot(text, &league).unwrap_err();
        assert!(matches!(err, SnapshotError::UnknownTeam { .. }));
    }

    #[test]
    fn import_rejects_bad_sum() {
        let league = test_league();
        let text = r#"{"KC": {"wins": 14, "losses": 2}}"#;
        let err = import_snapshot(text, &league).unwrap_err();
        assert!(matches!(err, SnapshotError::InvalidRecord { .. }));
    }

    #[test]
    fn import_rejects_out_of_range_game_index() {
        let league = test_league();
        let text = r#"{"KC": {"wins": 14, "losses": 3, "gameResults": {"17": "W"}}}"#;
        let err = import_snapshot(text, &league).unwrap_err();
        assert!(matches!(err, SnapshotError::InvalidRecord { .. }));
    }

    #[test]
    fn import_rejects_non_object_root() {
        let league = test_league();
        let err = import_snapshot("[1, 2, 3]", &league).unwrap_err();
        assert!(matches!(err, SnapshotError::NotAnObject));
    }

    #[test]
    fn default_name_carries_the_season() {
        let name = default_export_name(2026);
        assert!(name.starts_with("gridcast-2026-predictions-"));
        assert!(name.ends_with(".json"));
    }
}
