mod bootstrap;
mod report;

use anyhow::Result;
use pitwall_core::models::LapRecord;
use pitwall_core::settings::Settings;
use pitwall_core::PitwallError;
use pitwall_data::LapAggregator;
use pitwall_runtime::store::LapStore;
use report::OutputFormat;

fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;
    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;
    for warning in &settings.deferred_warnings {
        tracing::warn!("{}", warning);
    }

    tracing::info!("pitwall v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "View: {}, Race: {}, Format: {}",
        settings.view,
        settings.race.as_deref().unwrap_or("-"),
        settings.format
    );

    let data_path = settings
        .data
        .clone()
        .or_else(bootstrap::discover_data_path)
        .ok_or_else(|| {
            PitwallError::config("no lap table found; pass --data or set PITWALL_DATA")
        })?;

    let mut store = LapStore::new();
    let table = store.get(&data_path)?;

    let output = run_view(&settings, table.records())?;
    print!("{}", output);

    Ok(())
}

/// Run the analysis selected by `settings.view` and render it.
fn run_view(settings: &Settings, records: &[LapRecord]) -> Result<String> {
    let format = OutputFormat::parse(&settings.format);

    match settings.view.as_str() {
        "stints" => {
            let race = require_race(settings)?;
            let stints = LapAggregator::stints(records, race);
            report::render(&stints[..], format, report::stints_table)
        }
        "degradation" => {
            let race = require_race(settings)?;
            let curves: Vec<_> = require_drivers(settings)?
                .iter()
                .map(|driver| LapAggregator::degradation(records, race, driver))
                .collect();
            report::render(&curves[..], format, report::degradation_table)
        }
        "team-pace" => {
            let pace = match settings.race.as_deref() {
                Some(race) => LapAggregator::team_pace_for_race(records, race),
                None => LapAggregator::team_pace(records),
            };
            report::render(&pace[..], format, report::team_pace_table)
        }
        "team-season" => {
            let team = settings
                .team
                .as_deref()
                .ok_or_else(|| PitwallError::config("--team is required for the team-season view"))?;
            let season = LapAggregator::team_season_pace(records, team);
            report::render(&season[..], format, report::team_season_table)
        }
        "laps" => {
            let race = require_race(settings)?;
            let traces: Vec<_> = require_drivers(settings)?
                .iter()
                .map(|driver| LapAggregator::lap_trace(records, race, driver))
                .collect();
            report::render(&traces[..], format, report::lap_trace_table)
        }
        "pit-stops" => {
            let circuits = LapAggregator::circuit_pit_stops(records);
            report::render(&circuits[..], format, report::pit_stops_table)
        }
        "correlation" => {
            let matrix = LapAggregator::pit_stop_correlation(records);
            report::render(&matrix, format, report::correlation_table)
        }
        "races" => {
            let races = LapAggregator::races(records);
            report::render(&races[..], format, |r| report::names_table("Race", r))
        }
        "drivers" => {
            let race = require_race(settings)?;
            let drivers = LapAggregator::drivers(records, race);
            report::render(&drivers[..], format, |d| report::names_table("Driver", d))
        }
        "teams" => {
            let teams = LapAggregator::teams(records);
            report::render(&teams[..], format, |t| report::names_table("Team", t))
        }
        unknown => Err(PitwallError::config(format!("unknown view: {}", unknown)).into()),
    }
}

fn require_race(settings: &Settings) -> Result<&str, PitwallError> {
    settings.race.as_deref().ok_or_else(|| {
        PitwallError::config(format!("--race is required for the {} view", settings.view))
    })
}

fn require_drivers(settings: &Settings) -> Result<&[String], PitwallError> {
    if settings.drivers.is_empty() {
        return Err(PitwallError::config(format!(
            "--driver is required for the {} view",
            settings.view
        )));
    }
    Ok(&settings.drivers)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
