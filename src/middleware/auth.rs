//! Authorization-code gatekeeper middleware.
//!
//! # Request Flow
//!
//! ```text
//! X-Api-Key ──missing──▶ audit ERROR ──▶ 401 "Unauthorized: missing code"
//!     │
//!     ▼
//! POST auth_url (5s) ──build error──▶ audit ERROR ──▶ 500
//!     │        └──────non-200 / error──▶ audit WARN ──▶ 401 "Unauthorized"
//!     ▼
//!    200 ──▶ audit INFO ──▶ inner service (request untouched)
//! ```
//!
//! Every request is re-authorized; nothing is cached between requests. The
//! audit event for a decision is queued before the response is produced.
//!
//! # Usage
//!
//! ```rust,no_run
//! use axum::Router;
//! use net_gateway::{GatewayAuth, GatewayConfig};
//!
//! # async fn run() -> net_gateway::GatewayResult<()> {
//! let gateway = GatewayAuth::new(GatewayConfig::from_env()?).await?;
//! let app: Router = Router::new().layer(gateway);
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::http::{Request, Response};
use axum::response::IntoResponse;
use tower::{Layer, Service};
use tracing::{debug, error, warn};

use super::ip::client_ip;
use crate::audit::{AuditLogger, Level, session_id};
use crate::config::GatewayConfig;
use crate::error::{GatewayResult, Rejection};
use crate::exchange::{AuthExchanger, ExchangeOutcome};
use crate::metrics;

/// Header carrying the authorization code.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Gatekeeper layer; cheap to clone, all clones share one audit transport.
#[derive(Clone)]
pub struct GatewayAuth {
    gate: Arc<Gatekeeper>,
}

impl GatewayAuth {
    /// Open the audit transport and build the exchange client.
    ///
    /// # Errors
    ///
    /// Fails when the collector address does not resolve, the UDP socket
    /// cannot be opened, or the HTTP client cannot be built. Nothing is left
    /// half-initialized.
    pub async fn new(config: GatewayConfig) -> GatewayResult<Self> {
        let audit = AuditLogger::connect(&config).await?;
        Self::with_audit(config, audit)
    }

    /// Build the gateway around an existing audit logger.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::HttpClient` if the HTTP client cannot be built.
    pub fn with_audit(config: GatewayConfig, audit: AuditLogger) -> GatewayResult<Self> {
        let exchanger = AuthExchanger::new(Arc::new(config))?;
        Ok(Self {
            gate: Arc::new(Gatekeeper { exchanger, audit }),
        })
    }

    pub fn config(&self) -> &GatewayConfig {
        self.gate.exchanger.config()
    }
}

impl<S> Layer<S> for GatewayAuth {
    type Service = GatewayAuthService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        GatewayAuthService {
            inner,
            gate: self.gate.clone(),
        }
    }
}

/// Gatekeeper service wrapper.
#[derive(Clone)]
pub struct GatewayAuthService<S> {
    inner: S,
    gate: Arc<Gatekeeper>,
}

impl<S> Service<Request<Body>> for GatewayAuthService<S>
where
    S: Service<Request<Body>, Response = Response<Body>> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response<Body>;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let gate = self.gate.clone();
        // Hand the readied service to the future, keep a fresh clone here.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            let context = RequestContext::from_request(&req);
            match gate.authorize(context).await {
                Ok(()) => inner.call(req).await,
                Err(rejection) => Ok(rejection.into_response()),
            }
        })
    }
}

/// Everything the decision needs, detached from the request so the body is
/// never borrowed across the exchange.
#[derive(Debug)]
struct RequestContext {
    code: Option<String>,
    client_ip: String,
    session_id: String,
    path: String,
}

impl RequestContext {
    fn from_request<B>(req: &Request<B>) -> Self {
        Self {
            code: extract_code(req).map(str::to_owned),
            client_ip: client_ip(req).into_owned(),
            session_id: session_id(req),
            path: req.uri().path().to_string(),
        }
    }
}

struct Gatekeeper {
    exchanger: AuthExchanger,
    audit: AuditLogger,
}

impl Gatekeeper {
    async fn authorize(&self, context: RequestContext) -> Result<(), Rejection> {
        let RequestContext {
            code,
            client_ip,
            session_id,
            path,
        } = context;

        let Some(code) = code else {
            self.audit
                .log(Level::Error, "Missing 'code' in request", &session_id);
            warn!(%path, %client_ip, "Missing API key");
            metrics::record_auth_decision("missing_code");
            return Err(Rejection::MissingCode);
        };

        match self.exchanger.exchange(&code, &client_ip).await {
            Ok(ExchangeOutcome::Granted) => {
                self.audit
                    .log(Level::Info, "Authentication success", &session_id);
                debug!(%path, %client_ip, "Authorization granted");
                metrics::record_auth_decision("granted");
                Ok(())
            }
            Ok(ExchangeOutcome::Denied(status)) => {
                self.audit.log(
                    Level::Warn,
                    &format!("Authentication failed: status={}", status.as_u16()),
                    &session_id,
                );
                warn!(%path, %client_ip, status = status.as_u16(), "Authorization denied");
                metrics::record_auth_decision("denied");
                Err(Rejection::Unauthorized)
            }
            Ok(ExchangeOutcome::Failed(e)) => {
                let reason = if e.is_timeout() { "timeout" } else { "no response" };
                self.audit.log(
                    Level::Warn,
                    &format!("Authentication failed: {reason}: {e}"),
                    &session_id,
                );
                warn!(%path, %client_ip, error = %e, "Authorization endpoint unreachable");
                metrics::record_auth_decision("failed");
                Err(Rejection::Unauthorized)
            }
            Err(e) => {
                self.audit.log(
                    Level::Error,
                    &format!("Failed to create auth request: {e}"),
                    &session_id,
                );
                error!(%path, error = %e, "Failed to create auth request");
                metrics::record_auth_decision("internal");
                Err(Rejection::Internal)
            }
        }
    }
}

/// Authorization code from `X-Api-Key`; empty or non-text values count as absent.
fn extract_code<B>(req: &Request<B>) -> Option<&str> {
    req.headers()
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
}
