// Gridcast entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file, not the terminal)
// 2. Load config (copying defaults on first run)
// 3. Open the database and load the persisted store
// 4. Load and validate the schedule feed
// 5. Dispatch the subcommand; mutations persist back before exit

use anyhow::{bail, Context};
use tracing::info;

use gridcast::config;
use gridcast::db::Database;
use gridcast::prediction::{
    self, apply_team_record, GameOutcome, PredictionStore, RecordUpdate,
};
use gridcast::schedule::{Conference, Division, ScheduleGraph, Team};
use gridcast::snapshot;
use gridcast::standings;

fn main() -> anyhow::Result<()> {
    init_tracing()?;
    info!("gridcast starting up");

    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: league={}, season={}",
        config.league.name, config.league.season
    );

    let db = Database::open(&config.db_path).context("failed to open database")?;
    let mut store = db.load_store().context("failed to load saved predictions")?;
    info!("Loaded {} saved prediction(s)", store.len());

    let schedule_text = std::fs::read_to_string(&config.league.schedule_path)
        .with_context(|| format!("failed to read schedule feed {}", config.league.schedule_path))?;
    let schedule = ScheduleGraph::from_json(&schedule_text)
        .context("schedule feed failed validation")?;
    if schedule.season() != config.league.season {
        bail!(
            "schedule feed is for season {}, config says {}",
            schedule.season(),
            config.league.season
        );
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    let args: Vec<&str> = args.iter().map(String::as_str).collect();

    match args.as_slice() {
        ["standings"] => cmd_standings(&schedule, &store),
        ["seeding"] => cmd_seeding(&schedule, &store),
        ["validate"] => cmd_validate(&schedule, &store),
        ["stats"] => cmd_stats(&schedule, &store),
        ["range", team_id] => cmd_range(&schedule, &store, team_id),
        ["set", team_id, rest @ ..] => {
            store = cmd_set(&schedule, &store, team_id, rest)?;
            db.save_store(&store).context("failed to persist predictions")?;
            db.set_meta("season", &config.league.season.to_string())?;
            Ok(())
        }
        ["game", team_id, index, outcome] => {
            store = cmd_game(&schedule, &store, team_id, index, outcome)?;
            db.save_store(&store).context("failed to persist predictions")?;
            Ok(())
        }
        ["export"] => cmd_export(&store, None, config.league.season),
        ["export", file] => cmd_export(&store, Some(file), config.league.season),
        ["import", file] => {
            store = cmd_import(&schedule, file)?;
            db.save_store(&store).context("failed to persist predictions")?;
            println!("Imported {} prediction(s)", store.len());
            Ok(())
        }
        ["reset"] => {
            db.clear().context("failed to reset session")?;
            println!("All predictions cleared");
            Ok(())
        }
        _ => {
            print_usage();
            Ok(())
        }
    }
}

fn print_usage() {
    println!("gridcast - NFL season prediction tracker");
    println!();
    println!("Usage:");
    println!("  gridcast standings                    division-by-division standings");
    println!("  gridcast seeding                      projected playoff fields");
    println!("  gridcast validate                     league and division balance checks");
    println!("  gridcast stats                        season talking points");
    println!("  gridcast range TEAM                   legal win/tie/division-win ranges");
    println!("  gridcast set TEAM WINS [TIES [DIVW]]  record a season prediction (clamped)");
    println!("  gridcast game TEAM INDEX W|L|T|clear  pick a single game");
    println!("  gridcast export [FILE]                write predictions as JSON");
    println!("  gridcast import FILE                  load predictions from JSON");
    println!("  gridcast reset                        clear all predictions");
}

// ---------------------------------------------------------------------------
// Read-only commands
// ---------------------------------------------------------------------------

fn record_line(store: &PredictionStore, team: &Team) -> String {
    match store.get(&team.id) {
        Some(record) => format!(
            "{:<4} {:<24} {:>7}  div {}-{}",
            team.id,
            team.name,
            record.summary(),
            record.division_wins,
            record.division_losses()
        ),
        None => format!("{:<4} {:<24}       -", team.id, team.name),
    }
}

fn cmd_standings(schedule: &ScheduleGraph, store: &PredictionStore) -> anyhow::Result<()> {
    for division in Division::ALL {
        println!("{division}");
        for team in standings::division_standings(schedule, store, division) {
            println!("  {}", record_line(store, team));
        }
        println!();
    }
    println!("Completion: {}%", store.completion_percent());
    Ok(())
}

fn cmd_seeding(schedule: &ScheduleGraph, store: &PredictionStore) -> anyhow::Result<()> {
    for conference in Conference::BOTH {
        let seeding = standings::conference_seeding(schedule, store, conference);
        println!("{conference}");
        for (seed, id) in seeding.division_winners.iter().enumerate() {
            let team = schedule.team(id).context("seeded team missing")?;
            println!("  {}. {}", seed + 1, record_line(store, team));
        }
        for (offset, id) in seeding.wild_cards.iter().enumerate() {
            let team = schedule.team(id).context("seeded team missing")?;
            let seed = seeding.division_winners.len() + offset + 1;
            println!("  {seed}. {} (WC)", record_line(store, team));
        }
        if !seeding.is_complete() {
            println!("  (field incomplete: some divisions lack predictions)");
        }
        println!();
    }
    Ok(())
}

fn cmd_validate(schedule: &ScheduleGraph, store: &PredictionStore) -> anyhow::Result<()> {
    let balance = prediction::validate::validate_league_balance(schedule, store);
    println!(
        "League: {} wins / {} losses / {} ties (expected {}) - {}",
        balance.total_wins,
        balance.total_losses,
        balance.total_ties,
        balance.expected,
        if balance.is_valid { "OK" } else { "out of balance" }
    );

    let report = prediction::validate::validate_division_balance(schedule, store);
    if report.is_valid {
        println!("Divisions: OK");
    } else {
        for imbalance in &report.imbalances {
            println!(
                "  {}: {} division wins (expected {}, off by {:+})",
                imbalance.division, imbalance.total_wins, imbalance.expected, imbalance.difference
            );
        }
    }
    Ok(())
}

fn cmd_stats(schedule: &ScheduleGraph, store: &PredictionStore) -> anyhow::Result<()> {
    let stats = standings::season_stats(schedule, store);
    if let Some(best) = &stats.best_team {
        println!("Best team:        {} ({})", best.name, best.record);
    }
    if let Some(worst) = &stats.worst_team {
        println!("Worst team:       {} ({})", worst.name, worst.record);
    }
    if let Some(toughest) = &stats.toughest_division {
        println!(
            "Toughest division: {} ({} combined wins)",
            toughest.division, toughest.combined_wins
        );
    }
    if let Some(afc) = &stats.afc_champion {
        println!("AFC champion:     {} ({})", afc.name, afc.record);
    }
    if let Some(nfc) = &stats.nfc_champion {
        println!("NFC champion:     {} ({})", nfc.name, nfc.record);
    }
    if !stats.bold_predictions.is_empty() {
        println!("Bold calls:");
        for line in &stats.bold_predictions {
            println!("  {} ({})", line.name, line.record);
        }
    }
    println!("Completion: {}%", stats.completion_percent);
    Ok(())
}

fn cmd_range(
    schedule: &ScheduleGraph,
    store: &PredictionStore,
    team_id: &str,
) -> anyhow::Result<()> {
    let team = schedule
        .team(team_id)
        .with_context(|| format!("unknown team `{team_id}`"))?;

    let ties = store.get(team_id).map(|r| r.ties).unwrap_or(0);
    let wins = prediction::constraints::win_bounds(schedule, store, team, ties);
    let tie_range = prediction::constraints::tie_bounds(schedule, store, team);
    let raw = prediction::constraints::division_win_bounds(schedule, store, team);

    println!("{} ({})", team.name, team.division);
    println!("  wins:          {}..={}{}", wins.min, wins.max, feasibility(wins));
    println!(
        "  ties:          {}..={}{}",
        tie_range.min,
        tie_range.max,
        feasibility(tie_range)
    );
    println!("  division wins: {}..={}{}", raw.min, raw.max, feasibility(raw));
    Ok(())
}

fn feasibility(range: prediction::Range) -> &'static str {
    if !range.feasible {
        " (no feasible value; showing fallback)"
    } else if range.locked() {
        " (locked)"
    } else {
        ""
    }
}

// ---------------------------------------------------------------------------
// Mutating commands
// ---------------------------------------------------------------------------

fn cmd_set(
    schedule: &ScheduleGraph,
    store: &PredictionStore,
    team_id: &str,
    rest: &[&str],
) -> anyhow::Result<PredictionStore> {
    let team = schedule
        .team(team_id)
        .with_context(|| format!("unknown team `{team_id}`"))?;

    let parse = |s: &str, what: &str| -> anyhow::Result<u8> {
        s.parse()
            .with_context(|| format!("invalid {what} `{s}`"))
    };
    let wins: u8 = match rest.first() {
        Some(s) => parse(s, "win total")?,
        None => bail!("usage: gridcast set TEAM WINS [TIES [DIVISION_WINS]]"),
    };
    let ties: u8 = match rest.get(1) {
        Some(s) => parse(s, "tie total")?,
        None => store.get(team_id).map(|r| r.ties).unwrap_or(0),
    };
    let division_wins: u8 = match rest.get(2) {
        Some(s) => parse(s, "division win total")?,
        None => store.get(team_id).map(|r| r.division_wins).unwrap_or(0),
    };

    // Clamp to the legal ranges first, then commit.
    let clamped = prediction::clamp_record(
        schedule,
        store,
        team,
        prediction::RecordInput {
            wins,
            ties,
            division_wins,
        },
    );
    if clamped.wins != wins || clamped.ties != ties || clamped.division_wins != division_wins {
        println!(
            "Adjusted to fit constraints: {}-{}-{}, {} division wins",
            clamped.wins, clamped.losses, clamped.ties, clamped.division_wins
        );
    }

    let game_results = store
        .get(team_id)
        .map(|r| r.game_results.clone())
        .unwrap_or_default();
    let update = RecordUpdate {
        wins: clamped.wins,
        losses: clamped.losses,
        ties: clamped.ties,
        division_wins: clamped.division_wins,
        game_results,
    };
    let next = apply_team_record(schedule, store, team_id, update)
        .map_err(|e| anyhow::anyhow!("{e}"))?;
    println!("{}", record_line(&next, team));
    Ok(next)
}

fn cmd_game(
    schedule: &ScheduleGraph,
    store: &PredictionStore,
    team_id: &str,
    index: &str,
    outcome: &str,
) -> anyhow::Result<PredictionStore> {
    let team = schedule
        .team(team_id)
        .with_context(|| format!("unknown team `{team_id}`"))?;
    let index: u8 = index
        .parse()
        .ok()
        .filter(|&i| (i as usize) < team.opponents.len())
        .with_context(|| format!("game index must be 0..{}", team.opponents.len()))?;

    let mut update = RecordUpdate::from_existing(store, team_id);
    match outcome {
        "clear" => {
            update.game_results.remove(&index);
        }
        pick => {
            let outcome: GameOutcome = pick
                .parse()
                .map_err(|e: String| anyhow::anyhow!(e))?;
            update.game_results.insert(index, outcome);
        }
    }

    // Re-clamp the aggregates so the new pick is always covered.
    update.normalize(schedule, team);

    let next = apply_team_record(schedule, store, team_id, update)
        .map_err(|e| anyhow::anyhow!("{e}"))?;
    let opponent = &team.opponents[index as usize];
    println!("{} game {} vs {}: {}", team.id, index, opponent, outcome);
    Ok(next)
}

// ---------------------------------------------------------------------------
// Import / export
// ---------------------------------------------------------------------------

fn cmd_export(store: &PredictionStore, file: Option<&str>, season: u16) -> anyhow::Result<()> {
    let text = snapshot::export_snapshot(store).context("failed to serialize predictions")?;
    let name = file
        .map(str::to_string)
        .unwrap_or_else(|| snapshot::default_export_name(season));
    std::fs::write(&name, text).with_context(|| format!("failed to write {name}"))?;
    println!("Exported {} prediction(s) to {name}", store.len());
    Ok(())
}

fn cmd_import(schedule: &ScheduleGraph, file: &str) -> anyhow::Result<PredictionStore> {
    let text =
        std::fs::read_to_string(file).with_context(|| format!("failed to read {file}"))?;
    snapshot::import_snapshot(&text, schedule).map_err(|e| anyhow::anyhow!("{e}"))
}

// ---------------------------------------------------------------------------
// Tracing
// ---------------------------------------------------------------------------

/// Initialize tracing to log to a file, keeping the terminal clean for
/// command output.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("gridcast.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("gridcast=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
