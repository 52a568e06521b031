// Constraint solver: legal ranges for wins, ties, and division wins for one
// team, given the rest of the league. Four independent constraint sources
// are intersected; the tightest bounds win.
//
// The solver never fails: an empty intersection collapses to the lower
// bound and is reported as infeasible, so callers always get a usable
// value.

use crate::prediction::record::{merged_game_results, PickedCounts, PredictionStore};
use crate::schedule::{
    ScheduleGraph, Team, DIVISION_GAMES, DIVISION_WIN_POOL, GAMES_PER_SEASON, TOTAL_LEAGUE_WINS,
};

/// Maximum predicted ties per team. A product policy constant, not a league
/// rule: more than 4 ties in one season has never happened.
pub const MAX_TIES: u8 = 4;

/// Maximum combined division wins for two teams in the same division.
/// Their head-to-head pair yields at most 2 combined wins and each can at
/// most sweep the other two rivals for 4, so 2 + 4 + 4 = 10.
pub const PAIRWISE_DIVISION_CAP: u8 = 10;

// ---------------------------------------------------------------------------
// Range
// ---------------------------------------------------------------------------

/// An inclusive range produced by intersecting constraint sources.
///
/// When the intersection is empty the range collapses to the lower bound
/// (prefer under-committing) and `feasible` is false - a "locked" state the
/// caller can surface, never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub min: u8,
    pub max: u8,
    pub feasible: bool,
}

impl Range {
    fn from_bounds(min: i32, max: i32) -> Range {
        let feasible = min <= max;
        let min = min.clamp(0, GAMES_PER_SEASON as i32) as u8;
        let max = max.clamp(0, GAMES_PER_SEASON as i32) as u8;
        Range {
            min,
            max: max.max(min),
            feasible,
        }
    }

    /// True when only a single value remains.
    pub fn locked(&self) -> bool {
        self.min == self.max
    }

    pub fn clamp(&self, value: u8) -> u8 {
        value.clamp(self.min, self.max)
    }

    pub fn contains(&self, value: u8) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

// ---------------------------------------------------------------------------
// Division-win bounds
// ---------------------------------------------------------------------------

/// Legal division-win range for `team` before coupling to its overall
/// record, combining the division-total bound and the pairwise rival cap.
///
/// With `s` the summed division wins of recorded rivals and `k` the count
/// of unrecorded rivals: the division pool of 12 must remain exactly
/// reachable, so `min = max(0, 12 - s - 6k)` and `max = min(6, 12 - s)`.
/// Each recorded rival `r` additionally caps the pair at 10 combined.
pub fn division_win_bounds(
    schedule: &ScheduleGraph,
    store: &PredictionStore,
    team: &Team,
) -> Range {
    let mut recorded_sum: i32 = 0;
    let mut unrecorded: i32 = 0;
    let mut pairwise_max: i32 = DIVISION_GAMES as i32;

    for rival in schedule.division_rivals(team) {
        match store.get(&rival.id) {
            Some(record) => {
                recorded_sum += record.division_wins as i32;
                pairwise_max = pairwise_max
                    .min(PAIRWISE_DIVISION_CAP as i32 - record.division_wins as i32);
            }
            None => unrecorded += 1,
        }
    }

    let pool = DIVISION_WIN_POOL as i32;
    let min = (pool - recorded_sum - DIVISION_GAMES as i32 * unrecorded).max(0);
    let max = (pool - recorded_sum)
        .min(DIVISION_GAMES as i32)
        .min(pairwise_max);
    Range::from_bounds(min, max)
}

/// Tighten a raw division-win range against the team's overall record:
/// division wins cannot exceed total wins, and division losses cannot
/// exceed the non-win complement (`min >= wins + ties - 11`).
pub fn effective_division_bounds(raw: Range, wins: u8, ties: u8) -> Range {
    let min = (raw.min as i32).max(wins as i32 + ties as i32 - 11);
    let max = (raw.max as i32).min(wins as i32);
    let tightened = Range::from_bounds(min, max);
    Range {
        feasible: raw.feasible && tightened.feasible,
        ..tightened
    }
}

// ---------------------------------------------------------------------------
// Tie bounds
// ---------------------------------------------------------------------------

/// Legal tie range: at least the ties already picked (own or inferred),
/// at most the policy cap.
pub fn tie_bounds(schedule: &ScheduleGraph, store: &PredictionStore, team: &Team) -> Range {
    let merged = merged_game_results(schedule, store, &team.id);
    let picked = PickedCounts::tally(merged.values().map(|slot| slot.outcome));
    Range::from_bounds(picked.ties as i32, MAX_TIES as i32)
}

// ---------------------------------------------------------------------------
// Win bounds
// ---------------------------------------------------------------------------

/// Legal win range for `team` at the given tie count.
///
/// Intersects:
/// - the game-pick bound (picked wins stay locked in; undecided games are
///   free), over the team's own picks merged with on-the-fly inversions of
///   its opponents' picks;
/// - the league-balance bound in both directions (total wins and total
///   losses must each be able to reach exactly 272, with 17 games of slack
///   per unrecorded team);
/// - the tie complement (`wins <= 17 - ties`);
/// - the division coupling (`wins >= min_division_wins` and
///   `wins <= max_division_wins + 11 - ties`).
pub fn win_bounds(
    schedule: &ScheduleGraph,
    store: &PredictionStore,
    team: &Team,
    ties: u8,
) -> Range {
    let games = GAMES_PER_SEASON as i32;
    let total = TOTAL_LEAGUE_WINS as i32;
    let ties = ties as i32;

    // Game-pick bound.
    let merged = merged_game_results(schedule, store, &team.id);
    let picked = PickedCounts::tally(merged.values().map(|slot| slot.outcome));
    let undecided = games - merged.len() as i32;
    let mut min = picked.wins as i32;
    let mut max = picked.wins as i32 + undecided;

    // League-balance bound. Each tie takes one game out of the win and
    // loss columns league-wide, so the target both totals must reach is
    // 272 minus half the league's ties (two tie entries per tied game).
    let mut other_wins: i32 = 0;
    let mut other_losses: i32 = 0;
    let mut other_ties: i32 = 0;
    let mut unrecorded: i32 = 0;
    for other in schedule.teams() {
        if other.id == team.id {
            continue;
        }
        match store.get(&other.id) {
            Some(record) => {
                other_wins += record.wins as i32;
                other_losses += record.losses as i32;
                other_ties += record.ties as i32;
            }
            None => unrecorded += 1,
        }
    }
    let target = total - (other_ties + ties) / 2;
    min = min.max(target - other_wins - games * unrecorded);
    max = max.min(target - other_wins);

    // Symmetric bound through losses: losses = 17 - ties - wins.
    let min_losses = (target - other_losses - games * unrecorded).max(0);
    let max_losses = (target - other_losses).min(games);
    min = min.max(games - ties - max_losses);
    max = max.min(games - ties - min_losses);

    // Tie complement.
    max = max.min(games - ties);

    // Division coupling.
    let division = division_win_bounds(schedule, store, team);
    min = min.max(division.min as i32);
    max = max.min(division.max as i32 + 11 - ties);

    Range::from_bounds(min, max)
}

// ---------------------------------------------------------------------------
// Single-pass clamp
// ---------------------------------------------------------------------------

/// Raw slider values as proposed by the user, before clamping.
#[derive(Debug, Clone, Copy)]
pub struct RecordInput {
    pub wins: u8,
    pub ties: u8,
    pub division_wins: u8,
}

/// The fully-clamped `(wins, losses, ties, division_wins)` tuple plus the
/// ranges that produced it.
///
/// Computed in one pass (ties, then wins, then division wins) so callers
/// never observe half-clamped intermediate states; this replaces the
/// iterative re-clamping a reactive UI would otherwise do.
#[derive(Debug, Clone, Copy)]
pub struct ClampedRecord {
    pub wins: u8,
    pub losses: u8,
    pub ties: u8,
    pub division_wins: u8,
    pub win_range: Range,
    pub tie_range: Range,
    pub division_range: Range,
}

pub fn clamp_record(
    schedule: &ScheduleGraph,
    store: &PredictionStore,
    team: &Team,
    input: RecordInput,
) -> ClampedRecord {
    let tie_range = tie_bounds(schedule, store, team);
    let ties = tie_range.clamp(input.ties);

    let win_range = win_bounds(schedule, store, team, ties);
    let wins = win_range.clamp(input.wins);

    let raw_division = division_win_bounds(schedule, store, team);
    let division_range = effective_division_bounds(raw_division, wins, ties);
    let division_wins = division_range.clamp(input.division_wins);

    let losses = GAMES_PER_SEASON.saturating_sub(wins + ties);

    ClampedRecord {
        wins,
        losses,
        ties,
        division_wins,
        win_range,
        tie_range,
        division_range,
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
