//! # net_gateway
//!
//! HTTP gatekeeper middleware for Axum/Tower. Every request must carry an
//! authorization code in `X-Api-Key`; the gateway exchanges it with an
//! OAuth-style token endpoint and forwards the request only on `200 OK`.
//! Each decision is mirrored as a JSON audit event to a UDP log collector.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  GatewayAuth layer                                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Credential extraction (X-Api-Key)                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  AuthExchanger ── POST form ──▶ authorization endpoint (5s) │
//! ├─────────────────────────────────────────────────────────────┤
//! │  AuditLogger ── queue ──▶ writer task ──▶ UDP collector     │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Downstream service (untouched request)                     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use axum::{Router, routing::get};
//! use net_gateway::{GatewayAuth, GatewayConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = GatewayConfig {
//!         auth_url: "https://auth.example.com/oauth/token".to_string(),
//!         client_id: "edge".to_string(),
//!         log_host: "collector.internal".to_string(),
//!         ..GatewayConfig::default()
//!     };
//!     let gateway = GatewayAuth::new(config).await?;
//!
//!     let app = Router::new()
//!         .route("/orders", get(|| async { "orders" }))
//!         .layer(gateway);
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//!     axum::serve(
//!         listener,
//!         app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
//!     )
//!     .await?;
//!     Ok(())
//! }
//! ```

pub mod audit;
pub mod config;
pub mod error;
pub mod exchange;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod utils;

pub use audit::{AuditEvent, AuditLogger, AuditOutcome, DatagramSink, Level};
pub use config::{Config, GatewayConfig};
pub use error::{GatewayError, GatewayResult, Rejection};
pub use exchange::{AUTH_EXCHANGE_TIMEOUT, AuthExchanger, ExchangeOutcome};
pub use middleware::{GatewayAuth, GatewayAuthService};
pub use routes::build_router;
