// ── Core error types ──
//
// User-facing errors from docwallet-core. Consumers never branch on HTTP
// status codes directly: the `From<docwallet_api::Error>` impl folds
// transport failures into the two outcomes a verification session cares
// about, offline and registry failure.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connectivity ─────────────────────────────────────────────────
    /// The device is offline or the server rejected the request as a
    /// client error. Shown as the offline state with a retry affordance.
    #[error("Offline: {reason}")]
    Offline { reason: String },

    // ── Registry / API ───────────────────────────────────────────────
    /// Any other sharing failure. Shown as the generic registry error.
    #[error("Registry error: {message}")]
    Registry {
        message: String,
        /// HTTP status code (if the server answered).
        status: Option<u16>,
    },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Operation not supported: {operation}")]
    Unsupported { operation: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Returns `true` when the failure should surface as the offline state.
    pub fn is_offline(&self) -> bool {
        matches!(self, Self::Offline { .. })
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<docwallet_api::Error> for CoreError {
    fn from(err: docwallet_api::Error) -> Self {
        if err.is_connectivity() || err.is_client_status() {
            return CoreError::Offline {
                reason: err.to_string(),
            };
        }

        match err {
            docwallet_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            docwallet_api::Error::InvalidToken { message } => CoreError::Config { message },
            docwallet_api::Error::Tls(msg) => CoreError::Config {
                message: format!("TLS error: {msg}"),
            },
            docwallet_api::Error::Deserialization { message, body: _ } => CoreError::Registry {
                message: format!("Unexpected payload: {message}"),
                status: None,
            },
            other => CoreError::Registry {
                status: other.status(),
                message: other.to_string(),
            },
        }
    }
}
