//! CSV discovery and loading for the season lap table.
//!
//! Reads the pre-cleaned lap table (one file, or a directory of per-round
//! files) and converts each row into a [`LapRecord`].

use std::path::{Path, PathBuf};

use pitwall_core::error::{PitwallError, Result};
use pitwall_core::models::{LapRecord, TireCompound};
use pitwall_core::time_utils::parse_timedelta;
use tracing::{debug, warn};

use crate::validation::check_invariants;

// ── Column contract ───────────────────────────────────────────────────────────

/// Accepted header spellings per logical column, in lookup order.
const RACE: &[&str] = &["Race_Name"];
const DRIVER: &[&str] = &["Driver", "Abbreviation"];
const TEAM: &[&str] = &["Team"];
const LAP_NUMBER: &[&str] = &["LapNumber"];
const LAP_TIME: &[&str] = &["LapTimeSeconds"];
const COMPOUND: &[&str] = &["Compound", "Tire_Compound"];
const STINT: &[&str] = &["Stint"];
const STINT_LENGTH: &[&str] = &["Stint_Length"];
const PIT_IN_TIME: &[&str] = &["PitInTime"];
const PERSONAL_BEST: &[&str] = &["IsPersonalBest"];
const AIR_TEMP: &[&str] = &["Air_Temp_C"];
const TRACK_TEMP: &[&str] = &["Track_Temp_C"];
const ROUND: &[&str] = &["Round"];
const CIRCUIT: &[&str] = &["Circuit"];
const TOTAL_PIT_STOPS: &[&str] = &["TotalPitStops"];

/// Cell spellings pandas uses for missing values.
const MISSING_MARKERS: &[&str] = &["", "nan", "NaN", "NaT", "None", "null", "<NA>"];

// ── Public API ────────────────────────────────────────────────────────────────

/// Resolve `path` to the list of lap files to read.
///
/// A file is returned as-is. A directory is walked recursively for `.csv`
/// files, sorted by path. A missing path yields an empty list.
pub fn find_lap_files(path: &Path) -> Vec<PathBuf> {
    if !path.exists() {
        warn!("Lap data path does not exist: {}", path.display());
        return Vec::new();
    }
    if path.is_file() {
        return vec![path.to_path_buf()];
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(path)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_type().is_file()
                && entry
                    .path()
                    .extension()
                    .map(|ext| ext.eq_ignore_ascii_case("csv"))
                    .unwrap_or(false)
        })
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}

/// Load every lap record under `path`, preserving file and row order.
///
/// Fails with [`PitwallError::DataUnavailable`] when the path is missing or
/// holds no CSV file, and with [`PitwallError::SchemaMismatch`] when a file
/// lacks a required column or carries an unparseable typed cell.
pub fn load_laps(path: &Path) -> Result<Vec<LapRecord>> {
    if !path.exists() {
        return Err(PitwallError::unavailable(
            path,
            std::io::Error::new(std::io::ErrorKind::NotFound, "path does not exist"),
        ));
    }

    let files = find_lap_files(path);
    if files.is_empty() {
        return Err(PitwallError::unavailable(
            path,
            std::io::Error::new(std::io::ErrorKind::NotFound, "no CSV files found"),
        ));
    }

    let mut records = Vec::new();
    for file in &files {
        let file_records = read_lap_file(file)?;
        debug!("File {}: {} laps", file.display(), file_records.len());
        records.extend(file_records);
    }

    let violations = check_invariants(&records);
    if !violations.is_empty() {
        warn!(
            "{} ordering violation(s) in lap data at {}",
            violations.len(),
            path.display()
        );
        for violation in violations.iter().take(10) {
            warn!("{}", violation);
        }
    }

    debug!(
        "Loaded {} laps from {} file(s)",
        records.len(),
        files.len()
    );
    Ok(records)
}

/// Read a single CSV file into lap records.
pub fn read_lap_file(path: &Path) -> Result<Vec<LapRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| csv_error(path, e))?;

    let headers = reader.headers().map_err(|e| csv_error(path, e))?.clone();
    let schema = LapSchema::resolve(&headers, path)?;

    let mut records = Vec::new();
    let mut skipped = 0usize;
    for result in reader.records() {
        let row = result.map_err(|e| csv_error(path, e))?;
        match schema.parse_row(&row, path)? {
            Some(record) => records.push(record),
            None => skipped += 1,
        }
    }
    if skipped > 0 {
        warn!(
            "Skipped {} row(s) without race, driver or team in {}",
            skipped,
            path.display()
        );
    }
    Ok(records)
}

// ── Schema ────────────────────────────────────────────────────────────────────

/// Column positions resolved from a file's header row.
#[derive(Debug, Clone)]
struct LapSchema {
    race: usize,
    driver: usize,
    team: usize,
    lap_number: usize,
    lap_time: usize,
    compound: usize,
    stint: usize,
    stint_length: usize,
    pit_in_time: usize,
    personal_best: usize,
    air_temp: usize,
    track_temp: usize,
    round: Option<usize>,
    circuit: Option<usize>,
    total_pit_stops: Option<usize>,
}

impl LapSchema {
    fn resolve(headers: &csv::StringRecord, path: &Path) -> Result<Self> {
        let mut missing: Vec<&str> = Vec::new();
        let mut required = |names: &'static [&'static str]| -> usize {
            match find_column(headers, names) {
                Some(i) => i,
                None => {
                    missing.push(names[0]);
                    usize::MAX
                }
            }
        };

        let schema = LapSchema {
            race: required(RACE),
            driver: required(DRIVER),
            team: required(TEAM),
            lap_number: required(LAP_NUMBER),
            lap_time: required(LAP_TIME),
            compound: required(COMPOUND),
            stint: required(STINT),
            stint_length: required(STINT_LENGTH),
            pit_in_time: required(PIT_IN_TIME),
            personal_best: required(PERSONAL_BEST),
            air_temp: required(AIR_TEMP),
            track_temp: required(TRACK_TEMP),
            round: find_column(headers, ROUND),
            circuit: find_column(headers, CIRCUIT),
            total_pit_stops: find_column(headers, TOTAL_PIT_STOPS),
        };

        if !missing.is_empty() {
            return Err(PitwallError::schema(
                path,
                format!("missing columns: {}", missing.join(", ")),
            ));
        }
        Ok(schema)
    }

    /// Convert one row. Rows missing a race, driver or team yield `None`.
    fn parse_row(&self, row: &csv::StringRecord, path: &Path) -> Result<Option<LapRecord>> {
        let line = row.position().map(|p| p.line()).unwrap_or(0);
        let cells = Cells { row, path, line };

        let (Some(race), Some(driver), Some(team)) = (
            cells.text(self.race),
            cells.text(self.driver),
            cells.text(self.team),
        ) else {
            debug!("line {} of {}: no race, driver or team", line, path.display());
            return Ok(None);
        };

        let lap_time = cells.float(self.lap_time, LAP_TIME[0])?;
        if let Some(t) = lap_time {
            if t < 0.0 {
                return Err(cells.mismatch(LAP_TIME[0], "negative lap time"));
            }
        }

        Ok(Some(LapRecord {
            race,
            driver,
            team,
            lap_number: cells
                .count(self.lap_number, LAP_NUMBER[0])?
                .ok_or_else(|| cells.mismatch(LAP_NUMBER[0], "missing lap number"))?,
            lap_time,
            compound: cells.text(self.compound).map(|s| TireCompound::parse(&s)),
            stint: cells.count(self.stint, STINT[0])?,
            stint_length: cells.count(self.stint_length, STINT_LENGTH[0])?,
            pit_in_time: cells.duration(self.pit_in_time, PIT_IN_TIME[0])?,
            is_personal_best: cells.flag(self.personal_best, PERSONAL_BEST[0])?,
            air_temp_c: cells.float(self.air_temp, AIR_TEMP[0])?,
            track_temp_c: cells.float(self.track_temp, TRACK_TEMP[0])?,
            round: match self.round {
                Some(i) => cells.count(i, ROUND[0])?,
                None => None,
            },
            circuit: self.circuit.and_then(|i| cells.text(i)),
            total_pit_stops: match self.total_pit_stops {
                Some(i) => cells.float(i, TOTAL_PIT_STOPS[0])?,
                None => None,
            },
        }))
    }
}

/// Typed access to one row's cells, carrying context for error messages.
struct Cells<'a> {
    row: &'a csv::StringRecord,
    path: &'a Path,
    line: u64,
}

impl Cells<'_> {
    fn raw(&self, index: usize) -> Option<&str> {
        self.row
            .get(index)
            .filter(|cell| !MISSING_MARKERS.contains(cell))
    }

    fn mismatch(&self, column: &str, what: &str) -> PitwallError {
        PitwallError::schema(self.path, format!("line {}: {} ({})", self.line, what, column))
    }

    fn text(&self, index: usize) -> Option<String> {
        self.raw(index).map(str::to_string)
    }

    fn float(&self, index: usize, column: &str) -> Result<Option<f64>> {
        let Some(cell) = self.raw(index) else {
            return Ok(None);
        };
        cell.parse::<f64>()
            .map(Some)
            .map_err(|_| self.mismatch(column, &format!("expected a number, found {:?}", cell)))
    }

    /// Non-negative whole number, accepting pandas float spellings like `3.0`.
    fn count(&self, index: usize, column: &str) -> Result<Option<u32>> {
        let Some(value) = self.float(index, column)? else {
            return Ok(None);
        };
        if !value.is_finite() || value < 0.0 || value.fract() != 0.0 || value > u32::MAX as f64 {
            return Err(self.mismatch(column, &format!("expected a whole number, found {}", value)));
        }
        Ok(Some(value as u32))
    }

    fn flag(&self, index: usize, column: &str) -> Result<bool> {
        match self.raw(index) {
            None => Ok(false),
            Some("True" | "true" | "TRUE" | "1" | "1.0") => Ok(true),
            Some("False" | "false" | "FALSE" | "0" | "0.0") => Ok(false),
            Some(other) => {
                Err(self.mismatch(column, &format!("expected a boolean, found {:?}", other)))
            }
        }
    }

    fn duration(&self, index: usize, column: &str) -> Result<Option<chrono::Duration>> {
        let Some(cell) = self.raw(index) else {
            return Ok(None);
        };
        parse_timedelta(cell)
            .map(Some)
            .ok_or_else(|| self.mismatch(column, &format!("expected a timedelta, found {:?}", cell)))
    }
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn find_column(headers: &csv::StringRecord, names: &[&str]) -> Option<usize> {
    names
        .iter()
        .find_map(|name| headers.iter().position(|h| h == *name))
}

/// Map a csv error to the pitwall error space: I/O failures mean the data is
/// unavailable, everything else is a malformed table.
fn csv_error(path: &Path, err: csv::Error) -> PitwallError {
    let detail = err.to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(io_err) => PitwallError::unavailable(path, io_err),
        _ => PitwallError::schema(path, detail),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    const HEADER: &str = "Race_Name,Driver,Team,LapNumber,LapTimeSeconds,Compound,Stint,\
Stint_Length,PitInTime,IsPersonalBest,Air_Temp_C,Track_Temp_C";

    fn write_csv(dir: &Path, name: &str, lines: &[&str]) -> PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        path
    }

    fn sample_row(driver: &str, lap: u32, time: &str) -> String {
        format!(
            "Bahrain Grand Prix,{},Red Bull Racing,{},{},SOFT,1.0,1,,False,26.1,31.4",
            driver, lap, time
        )
    }

    // ── find_lap_files ────────────────────────────────────────────────────────

    #[test]
    fn test_find_lap_files_single_file() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(dir.path(), "laps.csv", &[HEADER]);
        assert_eq!(find_lap_files(&path), vec![path]);
    }

    #[test]
    fn test_find_lap_files_recursive_and_sorted() {
        let dir = TempDir::new().unwrap();
        let sub = dir.path().join("2024");
        std::fs::create_dir_all(&sub).unwrap();
        write_csv(&sub, "laps_round2.csv", &[HEADER]);
        write_csv(&sub, "laps_round1.csv", &[HEADER]);
        write_csv(dir.path(), "notes.txt", &["ignored"]);

        let files = find_lap_files(dir.path());
        let names: Vec<&str> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["laps_round1.csv", "laps_round2.csv"]);
    }

    #[test]
    fn test_find_lap_files_nonexistent_path() {
        let files = find_lap_files(Path::new("/tmp/does-not-exist-pitwall-test-xyz"));
        assert!(files.is_empty());
    }

    // ── load_laps ─────────────────────────────────────────────────────────────

    #[test]
    fn test_load_laps_basic() {
        let dir = TempDir::new().unwrap();
        let r1 = sample_row("VER", 1, "96.5");
        let r2 = sample_row("VER", 2, "95.25");
        let path = write_csv(dir.path(), "laps.csv", &[HEADER, &r1, &r2]);

        let laps = load_laps(&path).unwrap();
        assert_eq!(laps.len(), 2);
        assert_eq!(laps[0].race, "Bahrain Grand Prix");
        assert_eq!(laps[0].driver, "VER");
        assert_eq!(laps[0].lap_number, 1);
        assert_eq!(laps[1].lap_time, Some(95.25));
        assert_eq!(laps[0].compound, Some(TireCompound::Soft));
        assert_eq!(laps[0].stint, Some(1));
        assert_eq!(laps[0].stint_length, Some(1));
        assert!(laps[0].pit_in_time.is_none());
        assert!(!laps[0].is_personal_best);
        assert_eq!(laps[0].air_temp_c, Some(26.1));
        assert!(laps[0].round.is_none());
    }

    #[test]
    fn test_load_laps_missing_file_is_unavailable() {
        let err = load_laps(Path::new("/tmp/does-not-exist-pitwall.csv")).unwrap_err();
        assert!(matches!(err, PitwallError::DataUnavailable { .. }));
    }

    #[test]
    fn test_load_laps_empty_directory_is_unavailable() {
        let dir = TempDir::new().unwrap();
        let err = load_laps(dir.path()).unwrap_err();
        assert!(matches!(err, PitwallError::DataUnavailable { .. }));
    }

    #[test]
    fn test_load_laps_missing_column_is_schema_mismatch() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            dir.path(),
            "laps.csv",
            &["Race_Name,Driver,LapNumber", "Bahrain Grand Prix,VER,1"],
        );

        let err = load_laps(&path).unwrap_err();
        match err {
            PitwallError::SchemaMismatch { detail, .. } => {
                assert!(detail.contains("Team"), "detail = {detail}");
                assert!(detail.contains("Stint_Length"), "detail = {detail}");
                assert!(!detail.contains("Driver"), "detail = {detail}");
            }
            other => panic!("expected SchemaMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_load_laps_unparseable_cell_is_schema_mismatch() {
        let dir = TempDir::new().unwrap();
        let row = sample_row("VER", 1, "fast");
        let path = write_csv(dir.path(), "laps.csv", &[HEADER, &row]);

        let err = load_laps(&path).unwrap_err();
        match err {
            PitwallError::SchemaMismatch { detail, .. } => {
                assert!(detail.contains("LapTimeSeconds"), "detail = {detail}");
                assert!(detail.contains("line 2"), "detail = {detail}");
            }
            other => panic!("expected SchemaMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_load_laps_negative_lap_time_rejected() {
        let dir = TempDir::new().unwrap();
        let row = sample_row("VER", 1, "-3.0");
        let path = write_csv(dir.path(), "laps.csv", &[HEADER, &row]);
        assert!(matches!(
            load_laps(&path),
            Err(PitwallError::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn test_load_laps_ragged_row_is_schema_mismatch() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(dir.path(), "laps.csv", &[HEADER, "Bahrain Grand Prix,VER"]);
        assert!(matches!(
            load_laps(&path),
            Err(PitwallError::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn test_load_laps_pandas_missing_values() {
        let dir = TempDir::new().unwrap();
        let row = "Bahrain Grand Prix,VER,Red Bull Racing,1.0,NaN,nan,,,NaT,,nan,";
        let path = write_csv(dir.path(), "laps.csv", &[HEADER, row]);

        let laps = load_laps(&path).unwrap();
        let lap = &laps[0];
        assert_eq!(lap.lap_number, 1);
        assert!(lap.lap_time.is_none());
        assert!(lap.compound.is_none());
        assert!(lap.stint.is_none());
        assert!(lap.stint_length.is_none());
        assert!(lap.pit_in_time.is_none());
        assert!(!lap.is_personal_best);
        assert!(lap.air_temp_c.is_none());
        assert!(lap.track_temp_c.is_none());
    }

    #[test]
    fn test_load_laps_aliases_and_optional_columns() {
        let dir = TempDir::new().unwrap();
        let header = "Unnamed: 0,Race_Name,Abbreviation,Team,LapNumber,LapTimeSeconds,\
Tire_Compound,Stint,Stint_Length,PitInTime,IsPersonalBest,Air_Temp_C,Track_Temp_C,\
Round,Circuit,TotalPitStops";
        let row = "0,Monaco Grand Prix,LEC,Ferrari,12,74.9,hard,2.0,1,0 days 00:41:12.250000,\
True,21.0,44.5,8,Monaco,1.0";
        let path = write_csv(dir.path(), "laps.csv", &[header, row]);

        let laps = load_laps(&path).unwrap();
        let lap = &laps[0];
        assert_eq!(lap.driver, "LEC");
        assert_eq!(lap.compound, Some(TireCompound::Hard));
        assert_eq!(lap.stint, Some(2));
        assert!(lap.is_personal_best);
        assert_eq!(
            lap.pit_in_time.map(|d| d.num_milliseconds()),
            Some(41 * 60_000 + 12_250)
        );
        assert_eq!(lap.round, Some(8));
        assert_eq!(lap.circuit.as_deref(), Some("Monaco"));
        assert_eq!(lap.total_pit_stops, Some(1.0));
    }

    #[test]
    fn test_load_laps_concatenates_directory_in_path_order() {
        let dir = TempDir::new().unwrap();
        let a = sample_row("VER", 1, "90.0");
        let b = sample_row("PER", 1, "91.0");
        write_csv(dir.path(), "b.csv", &[HEADER, &b]);
        write_csv(dir.path(), "a.csv", &[HEADER, &a]);

        let laps = load_laps(dir.path()).unwrap();
        let drivers: Vec<&str> = laps.iter().map(|l| l.driver.as_str()).collect();
        assert_eq!(drivers, vec!["VER", "PER"]);
    }

    #[test]
    fn test_load_laps_oversized_pit_in_time_is_schema_mismatch() {
        let dir = TempDir::new().unwrap();
        let row = "Bahrain Grand Prix,VER,Red Bull Racing,1,95.0,SOFT,1,1,\
9999999999999 days 00:00:00,False,26.1,31.4";
        let path = write_csv(dir.path(), "laps.csv", &[HEADER, row]);

        match load_laps(&path).unwrap_err() {
            PitwallError::SchemaMismatch { detail, .. } => {
                assert!(detail.contains("PitInTime"), "detail = {detail}");
            }
            other => panic!("expected SchemaMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_load_laps_skips_rows_without_identity() {
        let dir = TempDir::new().unwrap();
        let kept = sample_row("VER", 1, "95.0");
        let no_driver = "Bahrain Grand Prix,,Red Bull Racing,2,95.0,SOFT,1,1,,False,26.1,31.4";
        let no_team = "Bahrain Grand Prix,PER,nan,1,96.0,SOFT,1,1,,False,26.1,31.4";
        let path = write_csv(dir.path(), "laps.csv", &[HEADER, &kept, no_driver, no_team]);

        let laps = load_laps(&path).unwrap();
        assert_eq!(laps.len(), 1);
        assert_eq!(laps[0].driver, "VER");
    }

    #[test]
    fn test_load_laps_header_only_is_empty_not_error() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(dir.path(), "laps.csv", &[HEADER]);
        assert!(load_laps(&path).unwrap().is_empty());
    }
}
