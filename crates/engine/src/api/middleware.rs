//! Request middleware for the editor API.
//!
//! # Usage
//!
//! ```rust,ignore
//! use axum::{middleware, Router};
//!
//! let app = Router::new()
//!     .route("/boards", post(create_board))
//!     .layer(middleware::from_fn(csrf_middleware))
//!     .layer(middleware::from_fn_with_state(whitelist, ip_whitelist_middleware));
//! ```

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

/// Header browsers only send from same-origin script.
pub const REQUESTED_WITH_HEADER: &str = "x-requested-with";

const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "Not found").into_response()
}

/// Rejects state-changing requests that lack `X-Requested-With: XMLHttpRequest`.
///
/// Cross-origin requests cannot set that header without a preflight, so
/// plain form posts from other sites never reach a handler.
pub async fn csrf_middleware(request: Request, next: Next) -> Response {
    let mutating = matches!(
        *request.method(),
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    );
    if mutating {
        let requested_with = request
            .headers()
            .get(REQUESTED_WITH_HEADER)
            .and_then(|v| v.to_str().ok());
        if requested_with != Some("XMLHttpRequest") {
            tracing::info!(
                method = %request.method(),
                path = %request.uri().path(),
                "Aborting due to CSRF mitigation"
            );
            return not_found();
        }
    }

    next.run(request).await
}

/// Client addresses allowed to use the API. An empty list allows everyone.
#[derive(Debug, Clone, Default)]
pub struct IpWhitelist {
    allowed: Vec<IpAddr>,
}

impl IpWhitelist {
    pub fn new(allowed: Vec<IpAddr>) -> Self {
        Self { allowed }
    }

    pub fn is_enabled(&self) -> bool {
        !self.allowed.is_empty()
    }

    pub fn allows(&self, ip: Option<IpAddr>) -> bool {
        if !self.is_enabled() {
            return true;
        }
        ip.is_some_and(|ip| self.allowed.contains(&ip))
    }
}

/// Client address: first `X-Forwarded-For` entry when present, else the peer.
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> Option<IpAddr> {
    if let Some(forwarded) = headers.get(FORWARDED_FOR_HEADER) {
        return forwarded
            .to_str()
            .ok()
            .and_then(|value| value.split(',').next())
            .and_then(|first| first.trim().parse().ok());
    }
    peer.map(|addr| addr.ip())
}

/// Answers 404 to clients outside the whitelist.
pub async fn ip_whitelist_middleware(
    State(whitelist): State<Arc<IpWhitelist>>,
    request: Request,
    next: Next,
) -> Response {
    if !whitelist.is_enabled() {
        return next.run(request).await;
    }

    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let ip = client_ip(request.headers(), peer);

    if whitelist.allows(ip) {
        next.run(request).await
    } else {
        tracing::warn!(ip = ?ip, "IP not found in whitelist");
        not_found()
    }
}

/// Marks responses uncacheable unless the handler chose its own policy.
pub async fn no_cache_middleware(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;

    let headers = response.headers_mut();
    if !headers.contains_key(header::CACHE_CONTROL) {
        headers.insert(
            header::CACHE_CONTROL,
            HeaderValue::from_static("max-age=0, no-cache, no-store, must-revalidate"),
        );
        headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
        headers.insert(header::EXPIRES, HeaderValue::from_static("0"));
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::Request as HttpRequest,
        middleware,
        routing::get,
        Router,
    };
    use tower::ServiceExt;

    async fn ok_handler() -> &'static str {
        "ok"
    }

    async fn cached_handler() -> impl IntoResponse {
        ([(header::CACHE_CONTROL, "max-age=60")], "cached")
    }

    fn csrf_app() -> Router {
        Router::new()
            .route("/", get(ok_handler).post(ok_handler).delete(ok_handler))
            .layer(middleware::from_fn(csrf_middleware))
    }

    fn whitelist_app(allowed: &[&str]) -> Router {
        let whitelist = IpWhitelist::new(
            allowed
                .iter()
                .map(|ip| ip.parse().expect("ip"))
                .collect(),
        );
        Router::new()
            .route("/", get(ok_handler))
            .layer(middleware::from_fn_with_state(
                Arc::new(whitelist),
                ip_whitelist_middleware,
            ))
    }

    #[tokio::test]
    async fn reads_pass_without_requested_with() {
        let request = HttpRequest::builder().uri("/").body(Body::empty()).unwrap();

        let response = csrf_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn writes_without_requested_with_are_not_found() {
        for method in [Method::POST, Method::DELETE] {
            let request = HttpRequest::builder()
                .method(method)
                .uri("/")
                .body(Body::empty())
                .unwrap();

            let response = csrf_app().oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::NOT_FOUND);
        }
    }

    #[tokio::test]
    async fn writes_with_requested_with_pass() {
        let request = HttpRequest::builder()
            .method(Method::POST)
            .uri("/")
            .header("X-Requested-With", "XMLHttpRequest")
            .body(Body::empty())
            .unwrap();

        let response = csrf_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn whitelist_uses_forwarded_for_first() {
        let request = HttpRequest::builder()
            .uri("/")
            .header("X-Forwarded-For", "10.0.0.7, 192.168.1.1")
            .body(Body::empty())
            .unwrap();

        let response = whitelist_app(&["10.0.0.7"]).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn whitelist_falls_back_to_peer_address() {
        let mut request = HttpRequest::builder().uri("/").body(Body::empty()).unwrap();
        request
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([127, 0, 0, 1], 50_000))));

        let response = whitelist_app(&["127.0.0.1"]).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn unknown_or_unlisted_clients_are_not_found() {
        let unknown = HttpRequest::builder().uri("/").body(Body::empty()).unwrap();
        let response = whitelist_app(&["127.0.0.1"]).oneshot(unknown).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let unlisted = HttpRequest::builder()
            .uri("/")
            .header("X-Forwarded-For", "203.0.113.9")
            .body(Body::empty())
            .unwrap();
        let response = whitelist_app(&["127.0.0.1"]).oneshot(unlisted).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn empty_whitelist_allows_everyone() {
        let request = HttpRequest::builder().uri("/").body(Body::empty()).unwrap();

        let response = whitelist_app(&[]).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn no_cache_headers_respect_handler_policy() {
        let app = Router::new()
            .route("/", get(ok_handler))
            .route("/cached", get(cached_handler))
            .layer(middleware::from_fn(no_cache_middleware));

        let request = HttpRequest::builder().uri("/").body(Body::empty()).unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL).unwrap(),
            "max-age=0, no-cache, no-store, must-revalidate"
        );
        assert_eq!(response.headers().get(header::PRAGMA).unwrap(), "no-cache");
        assert_eq!(response.headers().get(header::EXPIRES).unwrap(), "0");

        let request = HttpRequest::builder()
            .uri("/cached")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL).unwrap(),
            "max-age=60"
        );
        assert!(response.headers().get(header::PRAGMA).is_none());
    }
}
