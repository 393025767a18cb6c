//! Caller IP resolution for the authorization exchange.
//!
//! The IP forwarded as `ipaddress` is the peer address of the connection,
//! never a client-supplied header:
//!
//! 1. `ConnectInfo<SocketAddr>` (set by `into_make_service_with_connect_info`)
//! 2. [`RemoteAddr`], a raw `host:port` string inserted by hosts that track
//!    the peer themselves; when it does not split, the raw string is used
//! 3. [`UNKNOWN_IP`]

use std::borrow::Cow;
use std::net::SocketAddr;

use axum::extract::ConnectInfo;
use axum::http::Request;

/// Fallback IP value when the request carries no peer address.
pub const UNKNOWN_IP: &str = "unknown";

/// Raw peer address as reported by the host, e.g. `"10.1.2.3:51234"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteAddr(pub String);

/// Split `host:port` into its host part.
///
/// Accepts bracketed IPv6 (`[::1]:8080`). Returns `None` when there is no
/// port separator or the host part is itself ambiguous (`::1`).
pub fn split_host_port(raw: &str) -> Option<&str> {
    if let Some(rest) = raw.strip_prefix('[') {
        let (host, tail) = rest.split_once(']')?;
        return tail.starts_with(':').then_some(host);
    }

    let (host, _port) = raw.rsplit_once(':')?;
    if host.contains(':') {
        return None;
    }
    Some(host)
}

/// Host part of a raw remote address, or the raw string when it does not split.
#[inline]
pub fn remote_ip(raw: &str) -> &str {
    split_host_port(raw).unwrap_or(raw)
}

/// Extract the caller IP for a request.
///
/// # Returns
///
/// `Cow<'static, str>` - Borrowed for [`UNKNOWN_IP`], owned otherwise.
#[inline]
pub fn client_ip<B>(req: &Request<B>) -> Cow<'static, str> {
    if let Some(ConnectInfo(addr)) = req.extensions().get::<ConnectInfo<SocketAddr>>() {
        return Cow::Owned(addr.ip().to_string());
    }

    if let Some(RemoteAddr(raw)) = req.extensions().get::<RemoteAddr>() {
        return Cow::Owned(remote_ip(raw).to_string());
    }

    Cow::Borrowed(UNKNOWN_IP)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn test_split_ipv4() {
        assert_eq!(split_host_port("192.168.1.1:51234"), Some("192.168.1.1"));
    }

    #[test]
    fn test_split_bracketed_ipv6() {
        assert_eq!(split_host_port("[2001:db8::1]:443"), Some("2001:db8::1"));
    }

    #[test]
    fn test_split_hostname() {
        assert_eq!(split_host_port("gateway.local:8080"), Some("gateway.local"));
    }

    #[test]
    fn test_split_rejects_missing_port() {
        assert_eq!(split_host_port("192.168.1.1"), None);
        assert_eq!(split_host_port("[::1]"), None);
    }

    #[test]
    fn test_split_rejects_bare_ipv6() {
        assert_eq!(split_host_port("2001:db8::1"), None);
    }

    #[test]
    fn test_remote_ip_falls_back_to_raw() {
        assert_eq!(remote_ip("10.0.0.1:80"), "10.0.0.1");
        assert_eq!(remote_ip("not-an-address"), "not-an-address");
        assert_eq!(remote_ip("2001:db8::1"), "2001:db8::1");
    }

    #[test]
    fn test_client_ip_from_connect_info() {
        let mut req = Request::builder().body(Body::empty()).unwrap();
        let addr: SocketAddr = "203.0.113.50:40000".parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));

        assert_eq!(client_ip(&req), "203.0.113.50");
    }

    #[test]
    fn test_client_ip_ignores_forwarded_headers() {
        let mut req = Request::builder()
            .header("x-forwarded-for", "1.2.3.4")
            .body(Body::empty())
            .unwrap();
        let addr: SocketAddr = "[::1]:40000".parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));

        assert_eq!(client_ip(&req), "::1");
    }

    #[test]
    fn test_client_ip_from_raw_remote_addr() {
        let mut req = Request::builder().body(Body::empty()).unwrap();
        req.extensions_mut()
            .insert(RemoteAddr("unix-socket-peer".to_string()));

        assert_eq!(client_ip(&req), "unix-socket-peer");
    }

    #[test]
    fn test_client_ip_unknown_is_borrowed() {
        let req = Request::builder().body(Body::empty()).unwrap();

        let ip = client_ip(&req);
        assert_eq!(ip, "unknown");
        assert!(matches!(ip, Cow::Borrowed(_)));
    }
}
