//! CLI error types with miette diagnostics.
//!
//! Maps core, config and API failures into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use docwallet_config::ConfigError;
use docwallet_core::CoreError;

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("The sharing service is unreachable: {reason}")]
    #[diagnostic(
        code(docwallet::offline),
        help("Check your connection and the configured API URL, then retry.")
    )]
    Offline { reason: String },

    #[error("The registry could not issue a code: {message}")]
    #[diagnostic(code(docwallet::registry), help("This is usually temporary. Retry in a moment."))]
    Registry { message: String },

    // ── Authentication ───────────────────────────────────────────────

    #[error("No API token configured")]
    #[diagnostic(
        code(docwallet::no_token),
        help(
            "Pass --token, set DOCWALLET_TOKEN, or store one with:\n\
             docwallet config set-token <TOKEN>"
        )
    )]
    NoToken,

    // ── Documents ────────────────────────────────────────────────────

    #[error("Could not read documents file {path}")]
    #[diagnostic(
        code(docwallet::documents_file),
        help("The file must be JSON with \"types\" and \"records\" keys.")
    )]
    DocumentsFile {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(code(docwallet::not_found), help("Run: docwallet list --documents <FILE>"))]
    NotFound {
        resource_type: String,
        identifier: String,
    },

    #[error("Document '{id}' cannot show a verification code")]
    #[diagnostic(
        code(docwallet::no_code),
        help("Documents in an error state have no code. Run `docwallet list` for details.")
    )]
    NoCode { id: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(docwallet::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Configuration file already exists at {path}")]
    #[diagnostic(code(docwallet::config_exists), help("Use --force to overwrite it."))]
    ConfigExists { path: String },

    #[error(transparent)]
    #[diagnostic(code(docwallet::config))]
    Config(#[from] ConfigError),

    // ── IO / Serialization ───────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    #[diagnostic(code(docwallet::json))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Offline { .. } => exit_code::CONNECTION,
            Self::NoToken => exit_code::AUTH,
            Self::NotFound { .. } | Self::NoCode { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } | Self::ConfigExists { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }

    pub fn documents_file(
        path: &std::path::Path,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::DocumentsFile {
            path: path.display().to_string(),
            source: source.into(),
        }
    }
}

// ── Upstream error mapping ───────────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Offline { reason } => Self::Offline { reason },
            CoreError::Registry { message, .. } => Self::Registry { message },
            CoreError::Config { message } => Self::Validation {
                field: "config".into(),
                reason: message,
            },
            CoreError::Unsupported { operation } => Self::Validation {
                field: "operation".into(),
                reason: format!("'{operation}' is not supported"),
            },
            CoreError::Internal(message) => Self::Registry { message },
        }
    }
}

impl From<docwallet_api::Error> for CliError {
    fn from(err: docwallet_api::Error) -> Self {
        CoreError::from(err).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offline_failures_exit_with_connection_code() {
        let err = CliError::from(docwallet_api::Error::Status {
            status: 403,
            message: "forbidden".into(),
        });
        assert_eq!(err.exit_code(), exit_code::CONNECTION);
    }

    #[test]
    fn server_failures_are_registry_errors() {
        let err = CliError::from(docwallet_api::Error::Status {
            status: 503,
            message: "down".into(),
        });
        assert!(matches!(err, CliError::Registry { .. }));
        assert_eq!(err.exit_code(), exit_code::GENERAL);
    }
}
