//! Demonstration downstream handler.
//!
//! Describes the request it received, which shows that authorized requests
//! arrive with method, path and headers unchanged.

use axum::Json;
use axum::http::{HeaderMap, Method, Uri};
use serde::{Deserialize, Serialize};

use crate::audit::SESSION_ID_HEADER;

#[derive(Debug, Serialize, Deserialize)]
pub struct EchoResponse {
    pub method: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

pub async fn echo(method: Method, uri: Uri, headers: HeaderMap) -> Json<EchoResponse> {
    Json(EchoResponse {
        method: method.to_string(),
        path: uri.path().to_string(),
        session_id: headers
            .get(SESSION_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[tokio::test]
    async fn test_echo_reflects_request() {
        let mut headers = HeaderMap::new();
        headers.insert(SESSION_ID_HEADER, HeaderValue::from_static("sess-7"));

        let Json(body) = echo(Method::PUT, "/orders/42?x=1".parse().unwrap(), headers).await;

        assert_eq!(body.method, "PUT");
        assert_eq!(body.path, "/orders/42");
        assert_eq!(body.session_id.as_deref(), Some("sess-7"));
    }
}
