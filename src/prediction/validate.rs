// Whole-league consistency reports. These are read-only diagnostics over a
// completed (or partially completed) set of predictions; the save path in
// [`crate::prediction::sync`] enforces the hard rules, these summarize them
// for display.

use serde::Serialize;

use crate::prediction::record::PredictionStore;
use crate::schedule::{
    Division, ScheduleGraph, DIVISION_WIN_POOL, LEAGUE_SIZE, TOTAL_LEAGUE_WINS,
};

/// League-wide win/loss balance. In a fully predicted tie-free season both
/// totals equal 272; ties subtract from both sides equally.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct LeagueBalance {
    pub is_valid: bool,
    pub total_wins: u16,
    pub total_losses: u16,
    pub total_ties: u16,
    pub expected: u16,
}

/// Sum every recorded team's totals and compare against the league total.
/// Only meaningful once all 32 teams are recorded; with teams missing the
/// totals are reported as-is and `is_valid` is false.
pub fn validate_league_balance(
    schedule: &ScheduleGraph,
    store: &PredictionStore,
) -> LeagueBalance {
    let mut total_wins: u16 = 0;
    let mut total_losses: u16 = 0;
    let mut total_ties: u16 = 0;
    for team in schedule.teams() {
        if let Some(record) = store.get(&team.id) {
            total_wins += record.wins as u16;
            total_losses += record.losses as u16;
            total_ties += record.ties as u16;
        }
    }

    // Each tie removes half a win from both columns' theoretical totals.
    let expected = TOTAL_LEAGUE_WINS - total_ties / 2;
    LeagueBalance {
        is_valid: is_complete(store)
            && total_wins == expected
            && total_losses == expected
            && total_ties % 2 == 0,
        total_wins,
        total_losses,
        total_ties,
        expected,
    }
}

/// One division's distance from its 12-win pool.
#[derive(Debug, Clone, Serialize)]
pub struct DivisionImbalance {
    pub division: Division,
    pub total_wins: u16,
    pub expected: u16,
    /// Positive when over-allocated, negative when short.
    pub difference: i16,
}

/// Per-division division-win balance across the league.
#[derive(Debug, Clone, Serialize)]
pub struct DivisionBalanceReport {
    pub is_valid: bool,
    pub imbalances: Vec<DivisionImbalance>,
}

/// Check every division's recorded division-win total against the pool of
/// 12. Divisions with unrecorded members are skipped; only fully recorded
/// divisions can be out of balance.
pub fn validate_division_balance(
    schedule: &ScheduleGraph,
    store: &PredictionStore,
) -> DivisionBalanceReport {
    let mut imbalances = Vec::new();
    for division in Division::ALL {
        let mut total: u16 = 0;
        let mut recorded = 0usize;
        let mut members = 0usize;
        for team in schedule.teams_in_division(division) {
            members += 1;
            if let Some(record) = store.get(&team.id) {
                total += record.division_wins as u16;
                recorded += 1;
            }
        }
        if recorded < members {
            continue;
        }
        let expected = DIVISION_WIN_POOL as u16;
        if total != expected {
            imbalances.push(DivisionImbalance {
                division,
                total_wins: total,
                expected,
                difference: total as i16 - expected as i16,
            });
        }
    }
    DivisionBalanceReport {
        is_valid: imbalances.is_empty(),
        imbalances,
    }
}

/// True once every team in the league has a record.
pub fn is_complete(store: &PredictionStore) -> bool {
    store.len() == LEAGUE_SIZE
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
