//! Error types for the twtvt application.

use thiserror::Error;

/// Main error type for the application.
#[derive(Error, Debug)]
pub enum Error {
    // Input errors
    #[error("Invalid target: {0}")]
    Validation(String),

    #[error("Missing credentials: {0}")]
    Credential(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration value for '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // Link extraction errors
    #[error("Link extraction failed: {0}")]
    Extraction(String),

    // Backup errors
    #[error("Failed to write link backup {path}: {source}")]
    BackupIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Validation(_)
            | Error::Credential(_)
            | Error::Config(_)
            | Error::ConfigValidation { .. }
            | Error::TomlParse(_) => exit_codes::CONFIG_ERROR,
            Error::Extraction(_) => exit_codes::EXTRACTION_ERROR,
            Error::BackupIo { .. } | Error::Io(_) => exit_codes::IO_ERROR,
        }
    }
}

/// Process exit codes. Per-link download failures never change the exit code.
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const EXTRACTION_ERROR: i32 = 2;
    pub const CONFIG_ERROR: i32 = 3;
    pub const IO_ERROR: i32 = 4;
}
