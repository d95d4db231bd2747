use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by pitwall.
#[derive(Error, Debug)]
pub enum PitwallError {
    /// The lap data file or directory is missing or could not be read.
    #[error("Lap data unavailable at {path}: {source}")]
    DataUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The lap table does not carry the expected columns, or a typed cell
    /// could not be parsed.
    #[error("Schema mismatch in {path}: {detail}")]
    SchemaMismatch { path: PathBuf, detail: String },

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A JSON document could not be parsed or written.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl PitwallError {
    /// Build a [`PitwallError::DataUnavailable`] for `path`.
    pub fn unavailable(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PitwallError::DataUnavailable {
            path: path.into(),
            source,
        }
    }

    /// Build a [`PitwallError::SchemaMismatch`] for `path`.
    pub fn schema(path: impl Into<PathBuf>, detail: impl Into<String>) -> Self {
        PitwallError::SchemaMismatch {
            path: path.into(),
            detail: detail.into(),
        }
    }

    /// Build a [`PitwallError::Config`].
    pub fn config(msg: impl Into<String>) -> Self {
        PitwallError::Config(msg.into())
    }
}

/// Convenience alias used throughout the pitwall crates.
pub type Result<T> = std::result::Result<T, PitwallError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_data_unavailable() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = PitwallError::unavailable("/data/laps_2024.csv", io_err);
        let msg = err.to_string();
        assert!(msg.contains("Lap data unavailable"));
        assert!(msg.contains("/data/laps_2024.csv"));
        assert!(msg.contains("no such file"));
    }

    #[test]
    fn test_error_display_schema_mismatch() {
        let err = PitwallError::schema("laps.csv", "missing columns: Stint, Team");
        assert_eq!(
            err.to_string(),
            "Schema mismatch in laps.csv: missing columns: Stint, Team"
        );
    }

    #[test]
    fn test_error_display_config() {
        let err = PitwallError::config("--race is required");
        assert_eq!(err.to_string(), "Configuration error: --race is required");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: PitwallError = io_err.into();
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn test_error_from_serde_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{invalid}").unwrap_err();
        let err: PitwallError = json_err.into();
        assert!(err.to_string().contains("Failed to parse JSON"));
    }

    #[test]
    fn test_data_unavailable_exposes_source() {
        use std::error::Error as _;
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = PitwallError::unavailable("x.csv", io_err);
        assert!(err.source().is_some());
    }
}
