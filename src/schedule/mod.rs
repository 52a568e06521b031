// Schedule graph: static team definitions, division/conference structure,
// and the fixture correspondence resolver. Loaded once at startup and
// treated as read-only for the session.

pub mod graph;
pub mod team;

pub use graph::{ScheduleError, ScheduleGraph};
pub use team::{Conference, Division, Team};

/// Regular-season games per team.
pub const GAMES_PER_SEASON: u8 = 17;

/// Total teams in the league.
pub const LEAGUE_SIZE: usize = 32;

/// Divisional games per team (3 rivals, home and away).
pub const DIVISION_GAMES: u8 = 6;

/// Total wins across the league in a tie-free season: 32 teams x 17 games / 2.
pub const TOTAL_LEAGUE_WINS: u16 = 272;

/// Total division wins available within one division: 4 teams x 6 games / 2.
pub const DIVISION_WIN_POOL: u8 = 12;

/// Bundled 2026 schedule, used as the fixture for unit tests across modules.
#[cfg(test)]
pub(crate) fn test_league() -> ScheduleGraph {
    ScheduleGraph::from_json(include_str!("../../data/schedule-2026.json"))
        .expect("bundled schedule is valid")
}
