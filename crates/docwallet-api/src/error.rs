use thiserror::Error;

/// Lowest HTTP status treated as a client error.
const CLIENT_ERROR_FLOOR: u16 = 400;
/// Lowest HTTP status treated as a server error.
const SERVER_ERROR_FLOOR: u16 = 500;

/// Top-level error type for the `docwallet-api` crate.
///
/// Covers every failure mode of the sharing endpoints: transport,
/// non-success HTTP status, and payload decoding. `docwallet-core`
/// classifies these into offline vs. registry failures.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// The bearer token could not be turned into a header value.
    #[error("Invalid access token: {message}")]
    InvalidToken { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── API ─────────────────────────────────────────────────────────
    /// Non-success HTTP status with the server's message, if any.
    #[error("API error (HTTP {status}): {message}")]
    Status { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// HTTP status carried by this error, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Returns `true` when the request never reached the server.
    pub fn is_connectivity(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_connect() || e.is_timeout(),
            _ => false,
        }
    }

    /// Returns `true` for statuses in the client-error range below
    /// internal server error.
    pub fn is_client_status(&self) -> bool {
        self.status()
            .is_some_and(|s| (CLIENT_ERROR_FLOOR..SERVER_ERROR_FLOOR).contains(&s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_status_range_excludes_server_errors() {
        let not_found = Error::Status {
            status: 404,
            message: "missing".into(),
        };
        let internal = Error::Status {
            status: 500,
            message: "boom".into(),
        };
        assert!(not_found.is_client_status());
        assert!(!internal.is_client_status());
        assert!(!internal.is_connectivity());
    }

    #[test]
    fn decode_failure_is_neither_connectivity_nor_client() {
        let err = Error::Deserialization {
            message: "expected value".into(),
            body: "<html>".into(),
        };
        assert!(!err.is_connectivity());
        assert!(!err.is_client_status());
        assert_eq!(err.status(), None);
    }
}
