//! Best-effort audit events shipped to a remote collector over UDP.
//!
//! Every authorization decision produces one [`AuditEvent`], serialized as a
//! single JSON object and sent as one datagram.
//!
//! # Delivery Model
//!
//! ```text
//! request task ──try_send──▶ bounded queue ──▶ writer task ──▶ UdpSocket
//!      │                          │
//!   never awaits             full → event dropped
//! ```
//!
//! The socket is owned by a single writer task, so concurrent requests never
//! contend on it. Request handlers only serialize the event and push bytes
//! into the queue; when the queue is full the newest event is discarded.
//! Failures anywhere on this path are reported through `tracing` and never
//! reach the request.
//!
//! # Lifetime
//!
//! The writer task exits once the last [`AuditLogger`] handle is dropped and
//! the queue has drained, which closes the socket.

use std::fmt;
use std::future::Future;
use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};

use axum::http::Request;
use chrono::{Local, SecondsFormat};
use serde::{Deserialize, Serialize};
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::GatewayConfig;
use crate::error::{GatewayError, GatewayResult};
use crate::metrics;

/// Header carrying the caller's correlation id.
pub const SESSION_ID_HEADER: &str = "x-session-id";

/// Product tag prepended to every audit message.
pub const MESSAGE_TAG: &str = "[traefik-net-gateway]";

/// Fixed channel label expected by the collector.
pub const SESSION_NAME: &str = "logger";

/// Events buffered between request handlers and the writer task.
pub const AUDIT_QUEUE_CAPACITY: usize = 1024;

/// Severity of an audit event, serialized in the collector's `LEVEL_` namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Level {
    #[serde(rename = "LEVEL_ERROR")]
    Error,
    #[serde(rename = "LEVEL_WARN")]
    Warn,
    #[serde(rename = "LEVEL_INFO")]
    Info,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Error => "LEVEL_ERROR",
            Level::Warn => "LEVEL_WARN",
            Level::Info => "LEVEL_INFO",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One audit record as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// RFC3339 processing time
    #[serde(rename = "@timestamp")]
    pub timestamp: String,
    /// Host name of the gateway
    pub source: String,
    pub session_name: String,
    pub retention: String,
    pub program: String,
    pub service: String,
    pub level: Level,
    pub message: String,
    pub session_id: String,
}

/// What happened to an event handed to [`AuditLogger::log`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditOutcome {
    Queued,
    /// Queue full or writer gone.
    Dropped,
    SerializeFailed,
    /// No transport attached.
    Disabled,
}

/// Destination for serialized audit events.
///
/// Only the writer task calls this, one datagram at a time.
pub trait DatagramSink: Send + 'static {
    fn send_datagram(&mut self, payload: &[u8]) -> impl Future<Output = io::Result<usize>> + Send;
}

impl DatagramSink for UdpSocket {
    async fn send_datagram(&mut self, payload: &[u8]) -> io::Result<usize> {
        self.send(payload).await
    }
}

/// Labels copied into every event, fixed at construction.
#[derive(Debug, Clone)]
struct EventLabels {
    source: String,
    retention: String,
    program: String,
    service: String,
}

impl EventLabels {
    fn from_config(config: &GatewayConfig) -> Self {
        Self {
            source: local_hostname(),
            retention: config.log_retention.clone(),
            program: config.log_program.clone(),
            service: config.log_service.clone(),
        }
    }
}

/// Handle used by request handlers to emit audit events.
#[derive(Debug)]
pub struct AuditLogger {
    tx: Option<mpsc::Sender<Vec<u8>>>,
    labels: EventLabels,
}

impl AuditLogger {
    /// Resolve the collector address and open a UDP socket connected to it.
    ///
    /// Must be called inside a Tokio runtime; the writer task is spawned here.
    ///
    /// # Errors
    ///
    /// Returns `CollectorResolve`/`CollectorUnresolved` when the address does
    /// not resolve and `TransportOpen` when the socket cannot be bound or
    /// connected.
    pub async fn connect(config: &GatewayConfig) -> GatewayResult<Self> {
        let target = config.collector_addr();
        let addr = tokio::net::lookup_host(target.as_str())
            .await
            .map_err(|source| GatewayError::CollectorResolve {
                addr: target.clone(),
                source,
            })?
            .next()
            .ok_or_else(|| GatewayError::CollectorUnresolved(target.clone()))?;

        let local: SocketAddr = if addr.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };
        let socket = UdpSocket::bind(local)
            .await
            .map_err(|source| GatewayError::TransportOpen { addr, source })?;
        socket
            .connect(addr)
            .await
            .map_err(|source| GatewayError::TransportOpen { addr, source })?;

        info!(collector = %addr, "Audit log transport opened");
        Ok(Self::with_sink(socket, config))
    }

    /// Attach an arbitrary sink (must be called inside a Tokio runtime).
    pub fn with_sink<S: DatagramSink>(sink: S, config: &GatewayConfig) -> Self {
        Self::with_sink_and_capacity(sink, config, AUDIT_QUEUE_CAPACITY)
    }

    pub fn with_sink_and_capacity<S: DatagramSink>(
        sink: S,
        config: &GatewayConfig,
        capacity: usize,
    ) -> Self {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        tokio::spawn(run_writer(sink, rx));

        Self {
            tx: Some(tx),
            labels: EventLabels::from_config(config),
        }
    }

    /// A logger with no transport; every call is a no-op.
    pub fn disabled(config: &GatewayConfig) -> Self {
        Self {
            tx: None,
            labels: EventLabels::from_config(config),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.tx.is_some()
    }

    /// Build the record for one decision, stamped with the current time.
    pub fn event(&self, level: Level, message: &str, session_id: &str) -> AuditEvent {
        AuditEvent {
            timestamp: Local::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            source: self.labels.source.clone(),
            session_name: SESSION_NAME.to_string(),
            retention: self.labels.retention.clone(),
            program: self.labels.program.clone(),
            service: self.labels.service.clone(),
            level,
            message: format!("{MESSAGE_TAG} {message}"),
            session_id: session_id.to_string(),
        }
    }

    /// Queue one event for delivery. Never blocks and never fails the caller.
    pub fn log(&self, level: Level, message: &str, session_id: &str) -> AuditOutcome {
        let Some(tx) = &self.tx else {
            return AuditOutcome::Disabled;
        };

        let event = self.event(level, message, session_id);
        let payload = match serde_json::to_vec(&event) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, %level, "Failed to serialize audit event");
                metrics::record_audit_event("serialize_failed");
                return AuditOutcome::SerializeFailed;
            }
        };

        match tx.try_send(payload) {
            Ok(()) => {
                metrics::record_audit_event("queued");
                AuditOutcome::Queued
            }
            Err(TrySendError::Full(_)) => {
                warn!(%level, "Audit queue full, dropping event");
                metrics::record_audit_event("dropped");
                AuditOutcome::Dropped
            }
            Err(TrySendError::Closed(_)) => {
                warn!(%level, "Audit writer stopped, dropping event");
                metrics::record_audit_event("dropped");
                AuditOutcome::Dropped
            }
        }
    }
}

/// Session id for the audit trail: `X-Session-Id` when supplied, otherwise a
/// fresh UUIDv4 so uninstrumented requests never share an id.
pub fn session_id<B>(req: &Request<B>) -> String {
    req.headers()
        .get(SESSION_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

fn local_hostname() -> String {
    nix::unistd::gethostname()
        .ok()
        .and_then(|name| name.into_string().ok())
        .unwrap_or_default()
}

async fn run_writer<S: DatagramSink>(mut sink: S, mut rx: mpsc::Receiver<Vec<u8>>) {
    while let Some(payload) = rx.recv().await {
        if let Err(e) = sink.send_datagram(&payload).await {
            warn!(error = %e, bytes = payload.len(), "Failed to send audit event");
            metrics::record_audit_event("send_failed");
        }
    }
    debug!("Audit writer stopped");
}
