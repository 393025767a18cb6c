//! Fuzz target for peer address parsing and audit event encoding.
//!
//! ```bash
//! cargo +nightly fuzz run fuzz_remote_addr -- -max_total_time=60
//! ```
//!
//! Checks that, for any input:
//!
//! - `split_host_port` never panics and returns a substring of the input
//! - `remote_ip` falls back to the raw input when it cannot split
//! - an audit event carrying the input as message and session id always
//!   serializes to JSON that parses back to the same event

#![no_main]

use libfuzzer_sys::fuzz_target;
use net_gateway::middleware::{remote_ip, split_host_port};
use net_gateway::{AuditEvent, AuditLogger, GatewayConfig, Level};

fuzz_target!(|data: &[u8]| {
    let Ok(raw) = std::str::from_utf8(data) else {
        return;
    };

    match split_host_port(raw) {
        Some(host) => {
            assert!(raw.contains(host));
            assert_eq!(remote_ip(raw), host);
        }
        None => assert_eq!(remote_ip(raw), raw),
    }

    let logger = AuditLogger::disabled(&GatewayConfig::default());
    let event = logger.event(Level::Warn, raw, raw);
    let payload = serde_json::to_vec(&event).expect("audit events always serialize");
    let decoded: AuditEvent = serde_json::from_slice(&payload).expect("payload is valid JSON");
    assert_eq!(decoded, event);
});
