use std::io;
use std::net::SocketAddr;

use axum::http::header::{CONTENT_TYPE, X_CONTENT_TYPE_OPTIONS};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Errors raised while constructing the gateway or loading its configuration.
///
/// Request-time failures never surface as `GatewayError`; they are turned into
/// a [`Rejection`] and answered inside the middleware.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Failed to resolve log collector address {addr}: {source}")]
    CollectorResolve {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("Log collector address {0} resolved to no socket address")]
    CollectorUnresolved(String),

    #[error("Failed to open log transport to {addr}: {source}")]
    TransportOpen {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("Failed to build authorization client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Convenience type alias for Results with GatewayError.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Terminal outcome of a request that was not forwarded.
///
/// The response body is a short fixed phrase. Denials and transport failures
/// share [`Rejection::Unauthorized`] so an unauthenticated caller cannot tell
/// them apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// `X-Api-Key` was absent or empty.
    MissingCode,
    /// The authorization endpoint refused the code or could not be reached.
    Unauthorized,
    /// The outbound authorization request could not be built.
    Internal,
}

impl Rejection {
    pub fn status(self) -> StatusCode {
        match self {
            Rejection::MissingCode | Rejection::Unauthorized => StatusCode::UNAUTHORIZED,
            Rejection::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn reason(self) -> &'static str {
        match self {
            Rejection::MissingCode => "Unauthorized: missing code",
            Rejection::Unauthorized => "Unauthorized",
            Rejection::Internal => "Internal Server Error",
        }
    }
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        (
            self.status(),
            [
                (CONTENT_TYPE, "text/plain; charset=utf-8"),
                (X_CONTENT_TYPE_OPTIONS, "nosniff"),
            ],
            format!("{}\n", self.reason()),
        )
            .into_response()
    }
}
