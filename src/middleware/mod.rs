//! HTTP middleware enforcing the authorization-code exchange.
//!
//! # Architecture
//!
//! ```text
//! Request → GatewayAuth → inner service → Response
//!              ↓
//!        401 / 500 (audited)
//! ```
//!
//! The caller IP sent to the authorization endpoint always comes from the
//! connection itself (see [`ip`]), never from forwarding headers.

pub mod auth;
pub mod ip;

pub use auth::{API_KEY_HEADER, GatewayAuth, GatewayAuthService};
pub use ip::{RemoteAddr, UNKNOWN_IP, client_ip, remote_ip, split_host_port};
