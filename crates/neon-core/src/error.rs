//! Error types for Neon

use thiserror::Error;

/// The main error type for Neon operations
#[derive(Debug, Error)]
pub enum NeonError {
    #[error("Command stream is empty")]
    EmptyCommandStream,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Value out of range: {field} must be between {min} and {max}, got {value}")]
    ValueOutOfRange {
        field: String,
        min: f64,
        max: f64,
        value: f64,
    },

    #[error("Leaderboard error: {0}")]
    LeaderboardError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(String),

    #[error("TOML serialization error: {0}")]
    TomlSerError(String),
}

/// Result type alias for Neon operations
pub type Result<T> = std::result::Result<T, NeonError>;

impl From<toml::de::Error> for NeonError {
    fn from(err: toml::de::Error) -> Self {
        NeonError::TomlParseError(err.to_string())
    }
}

impl From<toml::ser::Error> for NeonError {
    fn from(err: toml::ser::Error) -> Self {
        NeonError::TomlSerError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_errors_convert() {
        let err: NeonError = toml::from_str::<toml::Value>("= broken").unwrap_err().into();
        assert!(matches!(err, NeonError::TomlParseError(_)));
    }

    #[test]
    fn display_includes_detail() {
        let err = NeonError::InvalidConfig("gap too large".into());
        assert_eq!(err.to_string(), "Invalid configuration: gap too large");
    }
}
