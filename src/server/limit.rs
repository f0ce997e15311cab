//! Rate-limit middleware for the analyze endpoints.

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use super::{ApiError, AppState};

/// Reject the request with 429 once the client has used up its window.
pub async fn enforce(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let client = client_key(
        request.headers(),
        request.extensions().get::<ConnectInfo<SocketAddr>>(),
        state.trust_proxy,
    );

    match state.limiter.check(&client).await {
        Ok(()) => next.run(request).await,
        Err(exceeded) => ApiError::RateLimited {
            retry_after: exceeded.retry_after_secs(),
        }
        .into_response(),
    }
}

/// Client identity: the peer address, or the first `X-Forwarded-For` hop
/// when a trusted proxy sets that header.
fn client_key(
    headers: &HeaderMap,
    peer: Option<&ConnectInfo<SocketAddr>>,
    trust_proxy: bool,
) -> String {
    let forwarded = trust_proxy
        .then(|| headers.get("x-forwarded-for"))
        .flatten()
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    match (forwarded, peer) {
        (Some(ip), _) => ip.to_string(),
        (None, Some(ConnectInfo(addr))) => addr.ip().to_string(),
        (None, None) => "unknown".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn forwarded(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_forwarded_header_ignored_by_default() {
        let peer = ConnectInfo(SocketAddr::from(([10, 0, 0, 1], 5000)));
        let headers = forwarded("203.0.113.7, 10.0.0.1");
        assert_eq!(client_key(&headers, Some(&peer), false), "10.0.0.1");
        assert_eq!(client_key(&headers, None, false), "unknown");
    }

    #[test]
    fn test_forwarded_header_used_behind_proxy() {
        let peer = ConnectInfo(SocketAddr::from(([10, 0, 0, 1], 5000)));
        let headers = forwarded("203.0.113.7, 10.0.0.1");
        assert_eq!(client_key(&headers, Some(&peer), true), "203.0.113.7");
    }

    #[test]
    fn test_peer_address_fallback() {
        let peer = ConnectInfo(SocketAddr::from(([192, 168, 1, 20], 5000)));
        assert_eq!(client_key(&HeaderMap::new(), Some(&peer), true), "192.168.1.20");
        assert_eq!(client_key(&HeaderMap::new(), None, true), "unknown");
    }
}
