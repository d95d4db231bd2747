//! Text and JSON rendering of aggregation results.

use pitwall_core::formatting::{
    format_delta, format_lap_time, format_optional, format_optional_lap_time, render_table,
};
use pitwall_core::models::{
    CircuitPitStops, CorrelationMatrix, DegradationCurve, LapTrace, StintSummary, TeamPace,
    TeamRacePace,
};
use serde::Serialize;

/// How a report is written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

impl OutputFormat {
    /// Anything other than `"json"` renders as a table.
    pub fn parse(label: &str) -> Self {
        if label.eq_ignore_ascii_case("json") {
            OutputFormat::Json
        } else {
            OutputFormat::Table
        }
    }
}

/// Render `value` as pretty JSON or through the given table renderer.
pub fn render<T, F>(value: &T, format: OutputFormat, table: F) -> anyhow::Result<String>
where
    T: Serialize + ?Sized,
    F: FnOnce(&T) -> String,
{
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)? + "\n"),
        OutputFormat::Table => Ok(table(value)),
    }
}

// ── Table renderers ────────────────────────────────────────────────────────────

pub fn stints_table(stints: &[StintSummary]) -> String {
    let rows: Vec<Vec<String>> = stints
        .iter()
        .map(|s| {
            vec![
                s.driver.clone(),
                s.stint.to_string(),
                s.compound.to_string(),
                s.total_laps.to_string(),
                s.lap_rows.to_string(),
            ]
        })
        .collect();
    render_table(&["Driver", "Stint", "Compound", "Laps", "Rows"], &rows)
}

/// One row per lap; pit-in laps are flagged.
pub fn degradation_table(curves: &[DegradationCurve]) -> String {
    let mut rows = Vec::new();
    for curve in curves {
        for point in &curve.points {
            let pit = if curve.pit_laps.contains(&point.lap_number) {
                "PIT"
            } else {
                ""
            };
            rows.push(vec![
                curve.driver.clone(),
                point.lap_number.to_string(),
                format_delta(point.lap_delta),
                format_delta(point.cumulative),
                pit.to_string(),
            ]);
        }
    }
    render_table(&["Driver", "Lap", "Delta", "Cumulative", "Pit"], &rows)
}

pub fn team_pace_table(pace: &[TeamPace]) -> String {
    let rows: Vec<Vec<String>> = pace
        .iter()
        .enumerate()
        .map(|(i, p)| {
            vec![
                (i + 1).to_string(),
                p.team.clone(),
                format_lap_time(p.median_lap_time),
                p.laps.to_string(),
            ]
        })
        .collect();
    render_table(&["Pos", "Team", "Median", "Laps"], &rows)
}

pub fn team_season_table(season: &[TeamRacePace]) -> String {
    let rows: Vec<Vec<String>> = season
        .iter()
        .map(|r| {
            vec![
                r.round.map(|n| n.to_string()).unwrap_or_else(|| "-".to_string()),
                r.race.clone(),
                format_lap_time(r.min),
                format_lap_time(r.lower_quartile),
                format_lap_time(r.median),
                format_lap_time(r.upper_quartile),
                format_lap_time(r.max),
                r.laps.to_string(),
            ]
        })
        .collect();
    render_table(
        &["Round", "Race", "Min", "Q1", "Median", "Q3", "Max", "Laps"],
        &rows,
    )
}

pub fn lap_trace_table(traces: &[LapTrace]) -> String {
    let mut rows = Vec::new();
    for trace in traces {
        for point in &trace.points {
            rows.push(vec![
                trace.driver.clone(),
                point.lap_number.to_string(),
                format_optional_lap_time(point.lap_time),
                point
                    .compound
                    .as_ref()
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "-".to_string()),
                if point.pitted { "PIT" } else { "" }.to_string(),
            ]);
        }
    }
    render_table(&["Driver", "Lap", "Time", "Compound", "Pit"], &rows)
}

pub fn pit_stops_table(circuits: &[CircuitPitStops]) -> String {
    let rows: Vec<Vec<String>> = circuits
        .iter()
        .map(|c| vec![c.circuit.clone(), format!("{:.2}", c.mean_pit_stops)])
        .collect();
    render_table(&["Circuit", "Mean stops"], &rows)
}

pub fn correlation_table(matrix: &CorrelationMatrix) -> String {
    let mut headers: Vec<&str> = vec![""];
    headers.extend(matrix.labels.iter().map(String::as_str));
    let rows: Vec<Vec<String>> = matrix
        .labels
        .iter()
        .zip(matrix.values.iter())
        .map(|(label, values)| {
            let mut row = vec![label.clone()];
            row.extend(values.iter().map(|v| format_optional(*v, 2)));
            row
        })
        .collect();
    render_table(&headers, &rows)
}

/// A single-column listing of names (races, drivers, teams).
pub fn names_table(header: &str, names: &[String]) -> String {
    let rows: Vec<Vec<String>> = names.iter().map(|n| vec![n.clone()]).collect();
    render_table(&[header], &rows)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
