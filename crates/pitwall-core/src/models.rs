use chrono::Duration;
use serde::{Serialize, Serializer};
use std::fmt;

/// Tire compound fitted for a lap.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TireCompound {
    Soft,
    Medium,
    Hard,
    Intermediate,
    Wet,
    /// Any other label found in the data, e.g. `UNKNOWN` or `TEST_UNKNOWN`.
    Other(String),
}

impl TireCompound {
    /// Parse a compound label case-insensitively. Never fails: unrecognised
    /// labels become [`TireCompound::Other`] in uppercase.
    pub fn parse(label: &str) -> Self {
        let upper = label.trim().to_uppercase();
        match upper.as_str() {
            "SOFT" => TireCompound::Soft,
            "MEDIUM" => TireCompound::Medium,
            "HARD" => TireCompound::Hard,
            "INTERMEDIATE" => TireCompound::Intermediate,
            "WET" => TireCompound::Wet,
            _ => TireCompound::Other(upper),
        }
    }

    /// Uppercase label as written in the lap table.
    pub fn as_str(&self) -> &str {
        match self {
            TireCompound::Soft => "SOFT",
            TireCompound::Medium => "MEDIUM",
            TireCompound::Hard => "HARD",
            TireCompound::Intermediate => "INTERMEDIATE",
            TireCompound::Wet => "WET",
            TireCompound::Other(label) => label,
        }
    }
}

impl fmt::Display for TireCompound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for TireCompound {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A single lap row from the season lap table.
#[derive(Debug, Clone, PartialEq)]
pub struct LapRecord {
    /// Race identifier, e.g. `"Bahrain Grand Prix"`.
    pub race: String,
    /// Driver identifier (three-letter abbreviation in the cleaned data).
    pub driver: String,
    /// Team identifier.
    pub team: String,
    /// Lap number within the race, starting at 1.
    pub lap_number: u32,
    /// Lap time in seconds; `None` when the timing was not recorded.
    pub lap_time: Option<f64>,
    /// Compound fitted for this lap.
    pub compound: Option<TireCompound>,
    /// Stint number within the race.
    pub stint: Option<u32>,
    /// Stint length contribution of this row.
    pub stint_length: Option<u32>,
    /// Session time at which the car entered the pit lane on this lap.
    pub pit_in_time: Option<Duration>,
    /// Whether this lap was the driver's personal best at the time.
    pub is_personal_best: bool,
    /// Air temperature in °C.
    pub air_temp_c: Option<f64>,
    /// Track temperature in °C.
    pub track_temp_c: Option<f64>,
    /// Championship round, when the table carries it.
    pub round: Option<u32>,
    /// Circuit name, when the table carries it.
    pub circuit: Option<String>,
    /// Total pit stops made by the driver in this race, when present.
    pub total_pit_stops: Option<f64>,
}

impl LapRecord {
    /// `true` when the car entered the pit lane on this lap.
    pub fn pitted(&self) -> bool {
        self.pit_in_time.is_some()
    }
}

/// Laps run in one (driver, stint, compound) group of a race.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StintSummary {
    pub race: String,
    pub driver: String,
    pub stint: u32,
    pub compound: TireCompound,
    /// Summed stint length of the group.
    pub total_laps: u64,
    /// Number of lap rows that contributed to the group.
    pub lap_rows: usize,
}

/// One lap on a cumulative degradation curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DegradationPoint {
    pub lap_number: u32,
    /// Lap time minus the previous lap time (0 on the first lap or when
    /// either lap has no time).
    pub lap_delta: f64,
    /// Running sum of `lap_delta`.
    pub cumulative: f64,
}

/// Cumulative lap-time change over a driver's race.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DegradationCurve {
    pub race: String,
    pub driver: String,
    pub points: Vec<DegradationPoint>,
    /// Lap numbers on which the driver entered the pit lane.
    pub pit_laps: Vec<u32>,
}

impl DegradationCurve {
    /// An empty curve for a driver with no laps in the race.
    pub fn empty(race: impl Into<String>, driver: impl Into<String>) -> Self {
        Self {
            race: race.into(),
            driver: driver.into(),
            points: Vec::new(),
            pit_laps: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// The cumulative deltas in lap order.
    pub fn cumulative(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.cumulative).collect()
    }
}

/// Median personal-best pace of a team.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamPace {
    pub team: String,
    /// Median lap time in seconds.
    pub median_lap_time: f64,
    /// Number of timed personal-best laps used.
    pub laps: usize,
}

/// Distribution of a team's personal-best laps at one race.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamRacePace {
    pub race: String,
    pub round: Option<u32>,
    pub min: f64,
    pub lower_quartile: f64,
    pub median: f64,
    pub upper_quartile: f64,
    pub max: f64,
    pub laps: usize,
}

/// One lap on a driver's lap-time trace.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LapTracePoint {
    pub lap_number: u32,
    pub lap_time: Option<f64>,
    pub compound: Option<TireCompound>,
    pub pitted: bool,
}

/// Lap-time series for one driver in one race.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LapTrace {
    pub race: String,
    pub driver: String,
    pub team: Option<String>,
    pub points: Vec<LapTracePoint>,
}

/// Average total pit stops recorded at a circuit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CircuitPitStops {
    pub circuit: String,
    pub mean_pit_stops: f64,
}

/// Labels of the variables in [`CorrelationMatrix`], in row/column order.
pub const CORRELATION_LABELS: [&str; 3] = ["Air_Temp_C", "Track_Temp_C", "TotalPitStops"];

/// Pearson correlation between air temperature, track temperature and total
/// pit stops. `None` marks a coefficient that is undefined for the data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub labels: Vec<String>,
    pub values: [[Option<f64>; 3]; 3],
}
