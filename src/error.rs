//! Error types for scout.
//!
//! Two families live here. [`ScoutError`] is fatal and only produced outside
//! composition (parsing, CLI input, configuration). [`ComposeWarning`] is the
//! recoverable kind: the composer reports it and keeps going.

use thiserror::Error;

use crate::ast::FieldKind;

/// The main error type for scout operations.
#[derive(Debug, Error)]
pub enum ScoutError {
    /// Failed to parse an operator query string.
    #[error("Parse error at position {position}: {message}")]
    Parse { position: usize, message: String },

    /// A date that is not `YYYY-MM-DD`.
    #[error("Invalid date: '{0}'. Expected YYYY-MM-DD")]
    InvalidDate(String),

    /// A preset input that is not `key=value`.
    #[error("Invalid input: '{0}'. Expected key=value")]
    InvalidInput(String),

    /// No preset registered under this id.
    #[error("Unknown preset: '{0}'. Run `scout presets` to list them")]
    UnknownPreset(String),

    /// The preset has no input slot with this key.
    #[error("Preset '{preset}' has no input '{key}'")]
    UnknownInput { preset: String, key: String },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// TOML error.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScoutError {
    /// Create a parse error at the given position.
    pub fn parse(position: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            position,
            message: message.into(),
        }
    }
}

/// Result type alias for scout operations.
pub type ScoutResult<T> = Result<T, ScoutError>;

/// A recoverable problem found while composing a query.
///
/// The offending field is left out of the query; everything else still goes in.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ComposeWarning {
    /// A domain-like field does not look like a hostname.
    #[error("{field} value '{value}' is not a valid domain; field skipped")]
    InvalidDomainFormat { field: FieldKind, value: String },

    /// A two-term operator with only one term filled in.
    #[error("{operator} needs both terms; only '{present}' was given")]
    IncompleteOperatorPair {
        operator: &'static str,
        present: String,
    },

    /// A numeric range whose lower bound is not below its upper bound.
    #[error("Invalid range {min}..{max}: minimum must be below maximum")]
    InvalidNumericRange { min: f64, max: f64 },

    /// A preset was used without one of its required inputs.
    #[error("Preset '{preset}' needs a value for '{input}'")]
    MissingInput {
        preset: &'static str,
        input: &'static str,
    },

    /// Nothing made it into the query.
    #[error("Query is empty; nothing to search")]
    EmptyQuery,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ScoutError::parse(5, "unbalanced quote");
        assert_eq!(err.to_string(), "Parse error at position 5: unbalanced quote");
    }

    #[test]
    fn test_warning_display() {
        let warning = ComposeWarning::InvalidDomainFormat {
            field: FieldKind::Site,
            value: "not a domain!!".to_string(),
        };
        assert_eq!(
            warning.to_string(),
            "site value 'not a domain!!' is not a valid domain; field skipped"
        );

        let warning = ComposeWarning::InvalidNumericRange {
            min: 100.0,
            max: 10.0,
        };
        assert_eq!(
            warning.to_string(),
            "Invalid range 100..10: minimum must be below maximum"
        );
    }
}
