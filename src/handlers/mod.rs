//! Handlers served by the `net-gateway` binary.
//!
//! `/health` sits outside the gateway; everything else reaches [`echo`] only
//! after a successful authorization exchange.

mod echo;
mod health;

pub use echo::{EchoResponse, echo};
pub use health::{HealthResponse, health_check};
