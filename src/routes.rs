//! Router of the `net-gateway` binary.
//!
//! ```text
//! Request
//!    │
//!    ▼
//! ┌──────────────────┐
//! │     Tracing      │ ← HTTP request/response logging
//! └────────┬─────────┘
//!          │
//!    ┌─────┴──────────────────┐
//!    ▼                        ▼
//! /health              ┌──────────────────┐
//!                      │   GatewayAuth    │ ← 401/500 unless the code exchanges
//!                      └────────┬─────────┘
//!                               ▼
//!                          echo (fallback)
//! ```

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware::GatewayAuth;

/// Build the router: `/health` is public, every other path is gated.
pub fn build_router(gateway: GatewayAuth) -> Router {
    let protected = Router::new().fallback(handlers::echo).layer(gateway);

    Router::new()
        .route("/health", get(handlers::health_check))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
}
