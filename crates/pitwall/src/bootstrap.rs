use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// ── Directory bootstrap ────────────────────────────────────────────────────────

/// Ensure the `~/.pitwall/` directory hierarchy exists.
///
/// Creates `~/.pitwall/` and `~/.pitwall/logs/` if absent.
pub fn ensure_directories() -> anyhow::Result<()> {
    let pitwall_dir = home_dir().join(".pitwall");
    std::fs::create_dir_all(&pitwall_dir)?;
    std::fs::create_dir_all(pitwall_dir.join("logs"))?;
    Ok(())
}

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Map a CLI level name onto an `EnvFilter` directive.
fn filter_directive(log_level: &str) -> &'static str {
    match log_level.to_uppercase().as_str() {
        "DEBUG" => "debug",
        "INFO" => "info",
        "ERROR" => "error",
        _ => "warn",
    }
}

/// Initialise the global `tracing` subscriber.
///
/// With `log_file` set, events are appended to that file without ANSI
/// colours; otherwise they go to stderr so that report output on stdout stays
/// clean.
pub fn setup_logging(log_level: &str, log_file: Option<&PathBuf>) -> anyhow::Result<()> {
    let filter = EnvFilter::new(filter_directive(log_level));
    let registry = tracing_subscriber::registry().with(filter);

    match log_file {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            registry
                .with(
                    fmt::layer()
                        .with_target(false)
                        .with_ansi(false)
                        .with_writer(Mutex::new(file)),
                )
                .try_init()?;
        }
        None => {
            registry
                .with(
                    fmt::layer()
                        .with_target(false)
                        .with_writer(std::io::stderr),
                )
                .try_init()?;
        }
    }

    Ok(())
}

// ── Data-path discovery ────────────────────────────────────────────────────────

/// Locate a lap table when none was given on the command line.
///
/// Checks, in order, and returns the first that exists:
/// 1. `./data/processed/laps_2024_cleaned.csv`
/// 2. `./data/processed/2024/laps_2024.csv`
/// 3. `~/.pitwall/data/`
pub fn discover_data_path() -> Option<PathBuf> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    discover_data_path_in(&cwd, &home_dir())
}

/// Discovery rooted at explicit working and home directories.
pub fn discover_data_path_in(cwd: &Path, home: &Path) -> Option<PathBuf> {
    let processed = cwd.join("data").join("processed");
    let candidates = [
        processed.join("laps_2024_cleaned.csv"),
        processed.join("2024").join("laps_2024.csv"),
        home.join(".pitwall").join("data"),
    ];
    candidates.into_iter().find(|p| p.exists())
}

fn home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_ensure_directories() {
        let tmp = TempDir::new().expect("tempdir");

        // Override HOME so that dirs::home_dir() resolves to our temp dir.
        let original_home = std::env::var_os("HOME");
        std::env::set_var("HOME", tmp.path());

        let result = ensure_directories();

        match original_home {
            Some(v) => std::env::set_var("HOME", v),
            None => std::env::remove_var("HOME"),
        }

        result.expect("ensure_directories should succeed");

        let pitwall_dir = tmp.path().join(".pitwall");
        assert!(pitwall_dir.is_dir(), ".pitwall dir must exist");
        assert!(pitwall_dir.join("logs").is_dir(), "logs subdir must exist");
    }

    #[test]
    fn test_filter_directive_mapping() {
        assert_eq!(filter_directive("DEBUG"), "debug");
        assert_eq!(filter_directive("info"), "info");
        assert_eq!(filter_directive("WARNING"), "warn");
        assert_eq!(filter_directive("ERROR"), "error");
        assert_eq!(filter_directive("verbose"), "warn");
    }

    #[test]
    fn test_discover_data_path_returns_none_when_absent() {
        let cwd = TempDir::new().expect("tempdir");
        let home = TempDir::new().expect("tempdir");
        assert!(discover_data_path_in(cwd.path(), home.path()).is_none());
    }

    #[test]
    fn test_discover_data_path_prefers_cleaned_table() {
        let cwd = TempDir::new().expect("tempdir");
        let home = TempDir::new().expect("tempdir");
        let processed = cwd.path().join("data").join("processed");
        std::fs::create_dir_all(processed.join("2024")).unwrap();
        std::fs::write(processed.join("laps_2024_cleaned.csv"), "").unwrap();
        std::fs::write(processed.join("2024").join("laps_2024.csv"), "").unwrap();

        assert_eq!(
            discover_data_path_in(cwd.path(), home.path()),
            Some(processed.join("laps_2024_cleaned.csv"))
        );
    }

    #[test]
    fn test_discover_data_path_falls_back_to_raw_table() {
        let cwd = TempDir::new().expect("tempdir");
        let home = TempDir::new().expect("tempdir");
        let season = cwd.path().join("data").join("processed").join("2024");
        std::fs::create_dir_all(&season).unwrap();
        std::fs::write(season.join("laps_2024.csv"), "").unwrap();

        assert_eq!(
            discover_data_path_in(cwd.path(), home.path()),
            Some(season.join("laps_2024.csv"))
        );
    }

    #[test]
    fn test_discover_data_path_finds_home_data_dir() {
        let cwd = TempDir::new().expect("tempdir");
        let home = TempDir::new().expect("tempdir");
        let data = home.path().join(".pitwall").join("data");
        std::fs::create_dir_all(&data).unwrap();

        assert_eq!(discover_data_path_in(cwd.path(), home.path()), Some(data));
    }
}
