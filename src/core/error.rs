//! Error handling and error types for the objective function core.
//!
//! Three failure families matter to callers of this crate and are kept
//! distinct so they can be told apart:
//!
//! - [`LightGBMError::Config`]: a live configuration cannot produce an objective
//!   (unknown type name, out-of-range or contradictory parameter).
//! - [`LightGBMError::Data`]: training metadata violates an objective's domain
//!   at initialization time.
//! - [`LightGBMError::Parse`]: a persisted objective description is corrupt.

use std::io;
use thiserror::Error;

/// Main error type for the objective function core.
#[derive(Error, Debug)]
pub enum LightGBMError {
    /// Configuration and validation errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Training metadata rejected by an objective
    #[error("Data error: {message}")]
    Data { message: String },

    /// Malformed persisted objective description
    #[error("Parse error: {message}")]
    Parse { message: String },

    /// Invalid input parameters
    #[error("Invalid parameter: {parameter} = {value}, {reason}")]
    InvalidParameter {
        parameter: String,
        value: String,
        reason: String,
    },

    /// Dimension mismatch errors
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: String, actual: String },

    /// File I/O errors
    #[error("I/O error: {source}")]
    IO {
        #[from]
        source: io::Error,
    },

    /// JSON serialization errors
    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },

    /// TOML deserialization errors
    #[error("TOML error: {source}")]
    Toml {
        #[from]
        source: toml::de::Error,
    },

    /// TOML serialization errors
    #[error("TOML serialization error: {source}")]
    TomlSer {
        #[from]
        source: toml::ser::Error,
    },
}

/// Type alias for Results using LightGBMError
pub type Result<T> = std::result::Result<T, LightGBMError>;

impl LightGBMError {
    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        LightGBMError::Config {
            message: message.into(),
        }
    }

    /// Create a data error
    pub fn data<S: Into<String>>(message: S) -> Self {
        LightGBMError::Data {
            message: message.into(),
        }
    }

    /// Create a parse error
    pub fn parse<S: Into<String>>(message: S) -> Self {
        LightGBMError::Parse {
            message: message.into(),
        }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter<P, V, R>(parameter: P, value: V, reason: R) -> Self
    where
        P: Into<String>,
        V: Into<String>,
        R: Into<String>,
    {
        LightGBMError::InvalidParameter {
            parameter: parameter.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a dimension mismatch error
    pub fn dimension_mismatch<E, A>(expected: E, actual: A) -> Self
    where
        E: Into<String>,
        A: Into<String>,
    {
        LightGBMError::DimensionMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Whether this error stems from configuration, including parameter range checks.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            LightGBMError::Config { .. } | LightGBMError::InvalidParameter { .. }
        )
    }

    /// Whether this error stems from training metadata.
    pub fn is_data_error(&self) -> bool {
        matches!(self, LightGBMError::Data { .. })
    }

    /// Whether this error stems from a corrupt persisted description.
    pub fn is_parse_error(&self) -> bool {
        matches!(self, LightGBMError::Parse { .. })
    }

    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            LightGBMError::Config { .. } => false,
            LightGBMError::Data { .. } => false,
            LightGBMError::Parse { .. } => false,
            LightGBMError::InvalidParameter { .. } => false,
            LightGBMError::DimensionMismatch { .. } => true,
            LightGBMError::IO { .. } => true,
            LightGBMError::Json { .. } => false,
            LightGBMError::Toml { .. } => false,
            LightGBMError::TomlSer { .. } => false,
        }
    }

    /// Get error category for logging and metrics
    pub fn category(&self) -> &'static str {
        match self {
            LightGBMError::Config { .. } => "config",
            LightGBMError::Data { .. } => "data",
            LightGBMError::Parse { .. } => "parse",
            LightGBMError::InvalidParameter { .. } => "invalid_parameter",
            LightGBMError::DimensionMismatch { .. } => "dimension_mismatch",
            LightGBMError::IO { .. } => "io",
            LightGBMError::Json { .. } => "json",
            LightGBMError::Toml { .. } => "toml",
            LightGBMError::TomlSer { .. } => "toml",
        }
    }
}

/// Convenience macros for error creation
#[macro_export]
macro_rules! config_error {
    ($msg:expr) => {
        $crate::core::error::LightGBMError::config($msg)
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::core::error::LightGBMError::config(format!($fmt, $($arg)*))
    };
}

#[macro_export]
macro_rules! data_error {
    ($msg:expr) => {
        $crate::core::error::LightGBMError::data($msg)
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::core::error::LightGBMError::data(format!($fmt, $($arg)*))
    };
}

#[macro_export]
macro_rules! parse_error {
    ($msg:expr) => {
        $crate::core::error::LightGBMError::parse($msg)
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::core::error::LightGBMError::parse(format!($fmt, $($arg)*))
    };
}

#[macro_export]
macro_rules! ensure {
    ($cond:expr, $err:expr) => {
        if !($cond) {
            return Err($err.into());
        }
    };
}
