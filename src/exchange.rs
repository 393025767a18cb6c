//! Authorization-code exchange against the configured token endpoint.
//!
//! One form-encoded `POST` per request; exactly `200 OK` grants access. The
//! response body is never read.

use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::{Client, StatusCode};
use serde::Serialize;
use thiserror::Error;

use crate::config::GatewayConfig;
use crate::error::GatewayResult;
use crate::metrics;

/// Hard ceiling for one exchange, connect through response headers.
pub const AUTH_EXCHANGE_TIMEOUT: Duration = Duration::from_secs(5);

pub const GRANT_TYPE: &str = "authorization_code";

/// Form body sent to the authorization endpoint.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ExchangeForm<'a> {
    pub client_id: &'a str,
    pub client_secret: &'a str,
    pub grant_type: &'static str,
    pub code: &'a str,
    pub redirect_uri: &'a str,
    pub scope: &'a str,
    pub ipaddress: &'a str,
}

/// Result of a completed exchange attempt.
///
/// A transport failure carries no status: there is no response to inspect.
#[derive(Debug)]
pub enum ExchangeOutcome {
    Granted,
    Denied(StatusCode),
    Failed(reqwest::Error),
}

impl ExchangeOutcome {
    fn label(&self) -> &'static str {
        match self {
            ExchangeOutcome::Granted => "granted",
            ExchangeOutcome::Denied(_) => "denied",
            ExchangeOutcome::Failed(_) => "failed",
        }
    }
}

#[derive(Error, Debug)]
pub enum ExchangeError {
    #[error("{0}")]
    Build(#[source] reqwest::Error),
}

/// Sends authorization-code grants on behalf of the gateway.
#[derive(Debug, Clone)]
pub struct AuthExchanger {
    client: Client,
    config: Arc<GatewayConfig>,
}

impl AuthExchanger {
    /// # Errors
    ///
    /// Returns `GatewayError::HttpClient` if the TLS backend cannot be
    /// initialized.
    pub fn new(config: Arc<GatewayConfig>) -> GatewayResult<Self> {
        let client = Client::builder().timeout(AUTH_EXCHANGE_TIMEOUT).build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn form<'a>(&'a self, code: &'a str, client_ip: &'a str) -> ExchangeForm<'a> {
        ExchangeForm {
            client_id: &self.config.client_id,
            client_secret: &self.config.client_secret,
            grant_type: GRANT_TYPE,
            code,
            redirect_uri: &self.config.redirect_uri,
            scope: &self.config.scope,
            ipaddress: client_ip,
        }
    }

    /// Build the outbound `POST` without sending it.
    ///
    /// `form` sets `Content-Type: application/x-www-form-urlencoded`.
    pub fn build_request(
        &self,
        code: &str,
        client_ip: &str,
    ) -> Result<reqwest::Request, ExchangeError> {
        self.client
            .post(self.config.auth_url.as_str())
            .form(&self.form(code, client_ip))
            .build()
            .map_err(ExchangeError::Build)
    }

    /// Exchange `code` for an accept/deny decision.
    ///
    /// Dropping the returned future abandons the call.
    ///
    /// # Errors
    ///
    /// Returns `ExchangeError::Build` if the request cannot be constructed
    /// (for example an unparseable `auth_url`). Network failures and non-200
    /// answers are outcomes, not errors.
    pub async fn exchange(
        &self,
        code: &str,
        client_ip: &str,
    ) -> Result<ExchangeOutcome, ExchangeError> {
        let request = self.build_request(code, client_ip)?;

        let started = Instant::now();
        let outcome = match self.client.execute(request).await {
            Ok(response) if response.status() == StatusCode::OK => ExchangeOutcome::Granted,
            Ok(response) => ExchangeOutcome::Denied(response.status()),
            Err(e) => ExchangeOutcome::Failed(e),
        };
        metrics::record_exchange_duration(outcome.label(), started.elapsed().as_secs_f64());

        Ok(outcome)
    }
}
