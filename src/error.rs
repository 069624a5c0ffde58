//! Error types for the Metabolic Tracker
//!
//! Provides structured error handling with:
//! - Numeric error codes for machine parsing
//! - User-friendly messages with suggestions
//! - Exit codes for CLI
//!
//! The health log itself never fails: missing data is modelled as `None`.
//! Everything here belongs to the surfaces around it (config, files,
//! CSV decoding and form input).

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for tracker operations
pub type Result<T> = std::result::Result<T, Error>;

/// Numeric error codes for machine parsing and documentation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ErrorCode {
    // Configuration errors (1xx)
    ConfigNotFound = 100,
    ConfigParseError = 101,
    ConfigValidation = 102,

    // IO errors (2xx)
    IoRead = 200,
    IoWrite = 201,
    IoPermission = 202,
    IoNotFound = 203,

    // Data errors (3xx)
    CsvParse = 300,
    UnknownMetric = 302,
    UnknownUser = 303,

    // Entry input errors (4xx)
    InvalidEntry = 400,
    InvalidCommand = 401,

    // Internal errors (9xx)
    InternalError = 900,
}

impl ErrorCode {
    /// Get the string code (e.g., "E100")
    pub fn as_str(&self) -> String {
        format!("E{}", *self as u16)
    }

    /// Get the exit code for CLI (maps to 1-125 range)
    pub fn exit_code(&self) -> i32 {
        match *self as u16 {
            100..=199 => 10, // Config errors
            200..=299 => 20, // IO errors
            300..=399 => 30, // Data errors
            400..=499 => 40, // Input errors
            900..=999 => 90, // Internal errors
            _ => 1,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Main error type for the tracker
#[derive(Error, Debug)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Configuration parse error
    #[error("Failed to parse configuration: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<toml::de::Error>,
    },

    /// Configuration validation error
    #[error("Configuration validation failed: {message}")]
    ConfigValidation { message: String, field: Option<String> },

    /// Generic configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    // ─────────────────────────────────────────────────────────────
    // IO Errors
    // ─────────────────────────────────────────────────────────────

    /// File read error
    #[error("Failed to read file: {path}")]
    IoRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File write error
    #[error("Failed to write file: {path}")]
    IoWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    Toml(#[from] toml::ser::Error),

    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // ─────────────────────────────────────────────────────────────
    // Data Errors
    // ─────────────────────────────────────────────────────────────

    /// A CSV record could not be decoded into an observation
    #[error("Invalid data in record {record}, column '{column}': {message}")]
    CsvParse {
        record: u64,
        column: String,
        message: String,
    },

    /// Low-level CSV reader/writer failure
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Metric name not recognised
    #[error("Unknown metric '{name}'. Must be one of: weight, glucose, ketones, ratio")]
    UnknownMetric { name: String },

    /// No observations recorded for the selected user
    #[error("Unknown user '{user}'")]
    UnknownUser { user: String },

    // ─────────────────────────────────────────────────────────────
    // Entry Input Errors
    // ─────────────────────────────────────────────────────────────

    /// A form field failed its input constraint
    #[error("Invalid {field}: {message}")]
    InvalidEntry { field: &'static str, message: String },

    /// A shell command could not be parsed
    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    // ─────────────────────────────────────────────────────────────
    // Internal Errors
    // ─────────────────────────────────────────────────────────────

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    // ─────────────────────────────────────────────────────────────
    // Error Classification
    // ─────────────────────────────────────────────────────────────

    /// Get the numeric error code
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::ConfigNotFound { .. } => ErrorCode::ConfigNotFound,
            Error::ConfigParse { .. } => ErrorCode::ConfigParseError,
            Error::ConfigValidation { .. } => ErrorCode::ConfigValidation,
            Error::Config(_) => ErrorCode::ConfigValidation,

            Error::IoRead { .. } => ErrorCode::IoRead,
            Error::IoWrite { .. } => ErrorCode::IoWrite,
            Error::Io(e) => match e.kind() {
                std::io::ErrorKind::NotFound => ErrorCode::IoNotFound,
                std::io::ErrorKind::PermissionDenied => ErrorCode::IoPermission,
                _ => ErrorCode::IoRead,
            },
            Error::Toml(_) => ErrorCode::ConfigParseError,
            Error::Json(_) => ErrorCode::InternalError,

            Error::CsvParse { .. } => ErrorCode::CsvParse,
            Error::Csv(e) => {
                if e.is_io_error() {
                    ErrorCode::IoRead
                } else {
                    ErrorCode::CsvParse
                }
            }
            Error::UnknownMetric { .. } => ErrorCode::UnknownMetric,
            Error::UnknownUser { .. } => ErrorCode::UnknownUser,

            Error::InvalidEntry { .. } => ErrorCode::InvalidEntry,
            Error::InvalidCommand(_) => ErrorCode::InvalidCommand,

            Error::Internal(_) => ErrorCode::InternalError,
        }
    }

    /// Check if the error should end an interactive session
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::ConfigNotFound { .. }
                | Error::ConfigParse { .. }
                | Error::ConfigValidation { .. }
                | Error::Internal(_)
        )
    }

    /// Get the exit code for CLI
    pub fn exit_code(&self) -> i32 {
        self.code().exit_code()
    }

    // ─────────────────────────────────────────────────────────────
    // User-Friendly Messages
    // ─────────────────────────────────────────────────────────────

    /// Get a user-friendly suggestion for how to fix this error
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Error::ConfigNotFound { .. } => Some(
                "Run 'metabolic-tracker config init' to create a default configuration file."
            ),
            Error::ConfigParse { .. } => Some(
                "Check your configuration file syntax. Run 'metabolic-tracker config validate' to see details."
            ),
            Error::ConfigValidation { .. } => Some(
                "Review the configuration file and fix the invalid values."
            ),
            Error::CsvParse { .. } => Some(
                "Numeric columns must be blank or numbers, and State must be Fasted or Fed."
            ),
            Error::UnknownMetric { .. } => Some(
                "Use one of: weight, glucose, ketones, ratio."
            ),
            Error::UnknownUser { .. } => Some(
                "Run 'users' to list the users with recorded observations."
            ),
            Error::InvalidEntry { .. } => Some(
                "Dates are YYYY-MM-DD or MM/DD/YY, times are HH:MM or h:mm AM/PM, measurements must be >= 0."
            ),
            Error::InvalidCommand(_) => Some(
                "Type 'help' to list the available commands."
            ),
            _ => None,
        }
    }

    /// Format the error for terminal display with colors
    pub fn format_for_terminal(&self) -> String {
        let code = self.code();
        let suggestion = self.suggestion();

        let mut output = format!(
            "\x1b[31mError [{}]\x1b[0m: {}\n",
            code.as_str(),
            self
        );

        if let Some(hint) = suggestion {
            output.push_str(&format!("\n\x1b[33mHint\x1b[0m: {}\n", hint));
        }

        output
    }

    /// Format the error for logging (no colors)
    pub fn format_for_log(&self) -> String {
        let code = self.code();
        format!("[{}] {}", code.as_str(), self)
    }
}

// ─────────────────────────────────────────────────────────────────
// Error Constructors (for ergonomic error creation)
// ─────────────────────────────────────────────────────────────────

impl Error {
    /// Create a config not found error
    pub fn config_not_found(path: impl Into<PathBuf>) -> Self {
        Error::ConfigNotFound { path: path.into() }
    }

    /// Create a config validation error with field name
    pub fn config_field_invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::ConfigValidation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create an entry validation error
    pub fn invalid_entry(field: &'static str, message: impl Into<String>) -> Self {
        Error::InvalidEntry {
            field,
            message: message.into(),
        }
    }

    /// Create a CSV decode error
    pub fn csv_parse(record: u64, column: impl Into<String>, message: impl Into<String>) -> Self {
        Error::CsvParse {
            record,
            column: column.into(),
            message: message.into(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
