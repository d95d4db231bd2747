use clap::{CommandFactory, Parser};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Lap, tire-strategy and team-pace analysis for a season of race data
#[derive(Parser, Debug, Clone)]
#[command(
    name = "pitwall",
    about = "Lap, tire-strategy and team-pace analysis for a season of race data",
    version
)]
pub struct Settings {
    /// Lap table: a CSV file or a directory of CSV files
    #[arg(long, env = "PITWALL_DATA")]
    pub data: Option<PathBuf>,

    /// Analysis to run
    #[arg(long, default_value = "stints", value_parser = [
        "stints", "degradation", "team-pace", "team-season", "laps",
        "pit-stops", "correlation", "races", "drivers", "teams",
    ])]
    pub view: String,

    /// Race name filter, e.g. "Bahrain Grand Prix"
    #[arg(long)]
    pub race: Option<String>,

    /// Driver filter (repeat for several drivers)
    #[arg(long = "driver")]
    pub drivers: Vec<String>,

    /// Team filter
    #[arg(long)]
    pub team: Option<String>,

    /// Output format
    #[arg(long, default_value = "table", value_parser = ["table", "json"])]
    pub format: String,

    /// Logging level
    #[arg(long, default_value = "WARNING", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Clear saved configuration
    #[arg(long)]
    pub clear: bool,

    /// Problems met while loading or saving last-used params, held until
    /// logging is up.
    #[arg(skip)]
    pub deferred_warnings: Vec<String>,
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Persisted last-used parameters saved to `~/.pitwall/last_used.json`.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub race: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl LastUsedParams {
    /// Return the default path to the persisted config file.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Return the config path rooted at `base_dir`.
    pub fn config_path_in(base_dir: &std::path::Path) -> PathBuf {
        base_dir.join(".pitwall").join("last_used.json")
    }

    /// Load persisted params from an explicit path.
    /// Returns `Default` when the file is absent or cannot be parsed.
    pub fn load_from(path: &std::path::Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_default()
    }

    /// Atomically write params to an explicit path.
    pub fn save_to(&self, path: &std::path::Path) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self)?;

        // Write to a temp file then rename.
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    /// Delete the config file at an explicit path if it exists.
    pub fn clear_at(path: &std::path::Path) -> crate::error::Result<()> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse CLI arguments, merge with last-used params where no explicit CLI
    /// value was provided, and persist the result.
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &LastUsedParams::config_path(),
        )
    }

    /// Accepts args and an explicit config path so that tests can redirect
    /// to a temporary directory.
    pub fn load_with_last_used_impl(
        args: Vec<std::ffi::OsString>,
        config_path: &std::path::Path,
    ) -> Self {
        let matches = Settings::command().get_matches_from(args.clone());
        let mut settings = Settings::parse_from(args);

        if settings.clear {
            if let Err(e) = LastUsedParams::clear_at(config_path) {
                settings
                    .deferred_warnings
                    .push(format!("failed to clear saved configuration: {}", e));
            }
            return Self::apply_debug(settings);
        }

        let last = LastUsedParams::load_from(config_path);
        let remembered_race = last.race.clone();

        // CLI always wins; the environment also wins for the data path.
        if settings.data.is_none() {
            settings.data = last.data;
        }
        if !is_arg_explicitly_set(&matches, "view") {
            if let Some(v) = last.view {
                settings.view = v;
            }
        }
        // A remembered race only fills views that cannot run without one;
        // season-wide views stay season-wide.
        if !is_arg_explicitly_set(&matches, "race")
            && settings.race.is_none()
            && view_requires_race(&settings.view)
        {
            settings.race = last.race;
        }
        if !is_arg_explicitly_set(&matches, "format") {
            if let Some(v) = last.format {
                settings.format = v;
            }
        }

        settings = Self::apply_debug(settings);

        let mut params = LastUsedParams::from(&settings);
        if params.race.is_none() {
            params.race = remembered_race;
        }
        if let Err(e) = params.save_to(config_path) {
            settings
                .deferred_warnings
                .push(format!("failed to persist last-used settings: {}", e));
        }

        settings
    }

    /// `--debug` overrides the log level.
    fn apply_debug(mut settings: Settings) -> Settings {
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────────

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        LastUsedParams {
            data: s.data.clone(),
            view: Some(s.view.clone()),
            race: s.race.clone(),
            format: Some(s.format.clone()),
        }
    }
}

/// Views that need a `--race` filter.
const RACE_VIEWS: &[&str] = &["stints", "degradation", "laps", "drivers"];

/// Returns `true` when `view` cannot run without a race filter.
pub fn view_requires_race(view: &str) -> bool {
    RACE_VIEWS.contains(&view)
}

/// Returns `true` when `name` was supplied explicitly on the command line
/// (not via default value or environment variable).
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
