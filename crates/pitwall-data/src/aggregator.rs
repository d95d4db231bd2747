//! Lap aggregation pipeline: tire stints, degradation curves and team pace.
//!
//! Every operation takes the loaded lap table by reference, filters it by
//! race, driver or team, and returns a derived table. Filters that match no
//! rows produce empty results, never errors.

use std::collections::{BTreeMap, BTreeSet};

use pitwall_core::models::{
    CircuitPitStops, CorrelationMatrix, DegradationCurve, DegradationPoint, LapRecord, LapTrace,
    LapTracePoint, StintSummary, TeamPace, TeamRacePace, TireCompound, CORRELATION_LABELS,
};
use pitwall_core::stats;

// ── LapAggregator ─────────────────────────────────────────────────────────────

/// Stateless helper that derives summary tables from lap records.
pub struct LapAggregator;

impl LapAggregator {
    /// Summed stint length per (driver, stint, compound) for one race.
    ///
    /// Rows are ordered by total stint length descending; equal totals keep
    /// driver then stint order. Laps without a stint number or compound are
    /// left out of the grouping.
    pub fn stints(records: &[LapRecord], race: &str) -> Vec<StintSummary> {
        let mut groups: BTreeMap<(&str, u32, &TireCompound), (u64, usize)> = BTreeMap::new();

        for record in records.iter().filter(|r| r.race == race) {
            let (Some(stint), Some(compound)) = (record.stint, record.compound.as_ref()) else {
                continue;
            };
            let slot = groups
                .entry((record.driver.as_str(), stint, compound))
                .or_insert((0, 0));
            slot.0 += u64::from(record.stint_length.unwrap_or(0));
            slot.1 += 1;
        }

        let mut summaries: Vec<StintSummary> = groups
            .into_iter()
            .map(|((driver, stint, compound), (total_laps, lap_rows))| StintSummary {
                race: race.to_string(),
                driver: driver.to_string(),
                stint,
                compound: compound.clone(),
                total_laps,
                lap_rows,
            })
            .collect();

        // Stable sort keeps the BTreeMap key order for ties.
        summaries.sort_by(|a, b| b.total_laps.cmp(&a.total_laps));
        summaries
    }

    /// Cumulative lap-time change for `driver` over `race`.
    ///
    /// Laps are ordered by lap number. The first delta is 0, and so is any
    /// delta where either lap has no recorded time. Returns an empty curve
    /// when the driver has no laps in the race.
    pub fn degradation(records: &[LapRecord], race: &str, driver: &str) -> DegradationCurve {
        let laps = driver_laps(records, race, driver);
        if laps.is_empty() {
            return DegradationCurve::empty(race, driver);
        }

        let mut points = Vec::with_capacity(laps.len());
        let mut cumulative = 0.0;
        let mut previous: Option<Option<f64>> = None;

        for lap in &laps {
            let lap_delta = match (previous, lap.lap_time) {
                (Some(Some(prev)), Some(current)) => current - prev,
                _ => 0.0,
            };
            cumulative += lap_delta;
            points.push(DegradationPoint {
                lap_number: lap.lap_number,
                lap_delta,
                cumulative,
            });
            previous = Some(lap.lap_time);
        }

        DegradationCurve {
            race: race.to_string(),
            driver: driver.to_string(),
            points,
            pit_laps: laps
                .iter()
                .filter(|l| l.pitted())
                .map(|l| l.lap_number)
                .collect(),
        }
    }

    /// Median personal-best lap time per team across the whole table,
    /// fastest first.
    pub fn team_pace(records: &[LapRecord]) -> Vec<TeamPace> {
        pace_by_team(records.iter())
    }

    /// [`LapAggregator::team_pace`] restricted to one race.
    pub fn team_pace_for_race(records: &[LapRecord], race: &str) -> Vec<TeamPace> {
        pace_by_team(records.iter().filter(|r| r.race == race))
    }

    /// Per-race distribution of `team`'s personal-best laps, in round order.
    ///
    /// Races without a round number sort after numbered ones, by name.
    pub fn team_season_pace(records: &[LapRecord], team: &str) -> Vec<TeamRacePace> {
        let mut by_race: BTreeMap<&str, (Vec<f64>, Vec<f64>)> = BTreeMap::new();

        for record in records
            .iter()
            .filter(|r| r.team == team && r.is_personal_best)
        {
            let Some(time) = record.lap_time else {
                continue;
            };
            let (times, rounds) = by_race.entry(record.race.as_str()).or_default();
            times.push(time);
            if let Some(round) = record.round {
                rounds.push(f64::from(round));
            }
        }

        let mut rows: Vec<TeamRacePace> = by_race
            .into_iter()
            .filter_map(|(race, (times, rounds))| {
                let sorted = stats::sorted_copy(&times);
                Some(TeamRacePace {
                    race: race.to_string(),
                    round: stats::median(&rounds).map(|r| r.round() as u32),
                    min: *sorted.first()?,
                    lower_quartile: stats::percentile(&sorted, 25.0)?,
                    median: stats::percentile(&sorted, 50.0)?,
                    upper_quartile: stats::percentile(&sorted, 75.0)?,
                    max: *sorted.last()?,
                    laps: sorted.len(),
                })
            })
            .collect();

        rows.sort_by(|a, b| {
            (a.round.is_none(), a.round)
                .cmp(&(b.round.is_none(), b.round))
                .then_with(|| a.race.cmp(&b.race))
        });
        rows
    }

    /// Lap-time series for `driver` in `race`, ordered by lap number.
    pub fn lap_trace(records: &[LapRecord], race: &str, driver: &str) -> LapTrace {
        let laps = driver_laps(records, race, driver);
        LapTrace {
            race: race.to_string(),
            driver: driver.to_string(),
            team: laps.first().map(|l| l.team.clone()),
            points: laps
                .iter()
                .map(|l| LapTracePoint {
                    lap_number: l.lap_number,
                    lap_time: l.lap_time,
                    compound: l.compound.clone(),
                    pitted: l.pitted(),
                })
                .collect(),
        }
    }

    /// Lap numbers on which `driver` entered the pit lane in `race`.
    pub fn pit_laps(records: &[LapRecord], race: &str, driver: &str) -> Vec<u32> {
        driver_laps(records, race, driver)
            .into_iter()
            .filter(|l| l.pitted())
            .map(|l| l.lap_number)
            .collect()
    }

    /// Mean `TotalPitStops` per circuit, lowest first.
    ///
    /// Rows without a circuit or a pit-stop count are ignored; circuits left
    /// with no values are omitted.
    pub fn circuit_pit_stops(records: &[LapRecord]) -> Vec<CircuitPitStops> {
        let mut by_circuit: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
        for record in records {
            if let (Some(circuit), Some(stops)) = (record.circuit.as_deref(), record.total_pit_stops)
            {
                by_circuit.entry(circuit).or_default().push(stops);
            }
        }

        let mut rows: Vec<CircuitPitStops> = by_circuit
            .into_iter()
            .filter_map(|(circuit, stops)| {
                Some(CircuitPitStops {
                    circuit: circuit.to_string(),
                    mean_pit_stops: stats::mean(&stops)?,
                })
            })
            .collect();
        rows.sort_by(|a, b| a.mean_pit_stops.total_cmp(&b.mean_pit_stops));
        rows
    }

    /// Pearson correlation between air temperature, track temperature and
    /// total pit stops, rounded to two decimals. Each coefficient uses the
    /// rows where both of its variables are present.
    pub fn pit_stop_correlation(records: &[LapRecord]) -> CorrelationMatrix {
        let columns: [Vec<Option<f64>>; 3] = [
            records.iter().map(|r| r.air_temp_c).collect(),
            records.iter().map(|r| r.track_temp_c).collect(),
            records.iter().map(|r| r.total_pit_stops).collect(),
        ];

        let mut values = [[None; 3]; 3];
        for (i, row) in values.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                let pairs: Vec<(Option<f64>, Option<f64>)> = columns[i]
                    .iter()
                    .copied()
                    .zip(columns[j].iter().copied())
                    .collect();
                *cell = stats::pearson(&pairs).map(|r| stats::round_to(r, 2));
            }
        }

        CorrelationMatrix {
            labels: CORRELATION_LABELS.iter().map(|s| s.to_string()).collect(),
            values,
        }
    }

    /// Sorted unique race names.
    pub fn races(records: &[LapRecord]) -> Vec<String> {
        unique(records.iter().map(|r| r.race.as_str()))
    }

    /// Sorted unique drivers with at least one lap in `race`.
    pub fn drivers(records: &[LapRecord], race: &str) -> Vec<String> {
        unique(
            records
                .iter()
                .filter(|r| r.race == race)
                .map(|r| r.driver.as_str()),
        )
    }

    /// Sorted unique team names.
    pub fn teams(records: &[LapRecord]) -> Vec<String> {
        unique(records.iter().map(|r| r.team.as_str()))
    }
}

// ── Private helpers ───────────────────────────────────────────────────────────

/// Laps of one driver in one race, ordered by lap number.
fn driver_laps<'a>(records: &'a [LapRecord], race: &str, driver: &str) -> Vec<&'a LapRecord> {
    let mut laps: Vec<&LapRecord> = records
        .iter()
        .filter(|r| r.race == race && r.driver == driver)
        .collect();
    laps.sort_by_key(|l| l.lap_number);
    laps
}

/// Group timed personal-best laps by team and rank teams by median lap time.
fn pace_by_team<'a>(records: impl Iterator<Item = &'a LapRecord>) -> Vec<TeamPace> {
    let mut by_team: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for record in records.filter(|r| r.is_personal_best) {
        if let Some(time) = record.lap_time {
            by_team.entry(record.team.as_str()).or_default().push(time);
        }
    }

    let mut pace: Vec<TeamPace> = by_team
        .into_iter()
        .filter_map(|(team, times)| {
            Some(TeamPace {
                team: team.to_string(),
                median_lap_time: stats::median(&times)?,
                laps: times.len(),
            })
        })
        .collect();

    // Stable sort keeps team-name order for equal medians.
    pace.sort_by(|a, b| a.median_lap_time.total_cmp(&b.median_lap_time));
    pace
}

fn unique<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .collect::<BTreeSet<&str>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
