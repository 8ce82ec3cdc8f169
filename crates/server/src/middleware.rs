use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request, State},
    http::{header, Method, StatusCode},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use common::metrics::record_request;

use crate::state::ServerState;

pub const AUTH_COOKIE: &str = "auth_token";

/// Count requests and observe latency per matched route template.
pub async fn track_metrics(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());
    let resp = next.run(req).await;
    record_request(&method, &route, resp.status().as_u16(), start.elapsed().as_secs_f64());
    resp
}

/// Registration and login routes, all POST.
const OPEN_POSTS: &[&str] = &[
    "/api/customers",
    "/api/customers/login",
    "/api/providers",
    "/api/providers/register",
    "/api/providers/login",
    "/providers/register",
    "/providers/login",
];

fn is_public(method: &Method, path: &str) -> bool {
    method == Method::OPTIONS
        || path == "/health"
        || path == "/metrics"
        || path.starts_with("/api-docs/")
        || (method == Method::POST && OPEN_POSTS.contains(&path))
}

fn extract_token(req: &Request) -> Option<String> {
    if let Some(h) = req.headers().get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        return h.strip_prefix("Bearer ").map(|t| t.trim().to_string());
    }
    // 回退：从 Cookie 中解析 auth_token
    let cookies = req.headers().get(header::COOKIE).and_then(|v| v.to_str().ok())?;
    cookies
        .split(';')
        .filter_map(|kv| kv.trim().strip_prefix("auth_token="))
        .map(str::to_string)
        .find(|t| !t.is_empty())
}

/// Bearer token check, active only when `auth.require_token` is set.
/// Registration, login and ops endpoints stay open.
pub async fn require_bearer_token(State(state): State<ServerState>, req: Request, next: Next) -> Result<Response, StatusCode> {
    if !state.require_token || is_public(req.method(), req.uri().path()) {
        return Ok(next.run(req).await);
    }
    let path = req.uri().path().to_string();
    let Some(token) = extract_token(&req) else {
        warn!(path = %path, "missing bearer token");
        return Err(StatusCode::UNAUTHORIZED);
    };
    match state.auth.verify_token(&token) {
        Ok(claims) => {
            let mut req = req;
            req.extensions_mut().insert(claims);
            Ok(next.run(req).await)
        }
        Err(e) => {
            warn!(path = %path, err = %e, "token validation failed");
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn public_paths() {
        assert!(is_public(&Method::GET, "/health"));
        assert!(is_public(&Method::POST, "/api/customers/login"));
        assert!(is_public(&Method::POST, "/providers/register"));
        assert!(is_public(&Method::POST, "/api/customers"));
        assert!(!is_public(&Method::GET, "/api/customers"));
        assert!(!is_public(&Method::DELETE, "/api/reviews/1"));
    }

    #[test]
    fn login_suffix_is_not_public() {
        assert!(is_public(&Method::POST, "/api/providers"));
        assert!(!is_public(&Method::GET, "/api/customers/email/login"));
        assert!(!is_public(&Method::GET, "/api/customers/email/register"));
        assert!(!is_public(&Method::GET, "/api/customers/login"));
        assert!(!is_public(&Method::GET, "/api/providers"));
    }

    #[test]
    fn token_from_header_or_cookie() {
        let req = Request::builder().header(header::AUTHORIZATION, "Bearer abc").body(Body::empty()).unwrap();
        assert_eq!(extract_token(&req).as_deref(), Some("abc"));
        let req = Request::builder().header(header::COOKIE, "theme=dark; auth_token=xyz").body(Body::empty()).unwrap();
        assert_eq!(extract_token(&req).as_deref(), Some("xyz"));
        let req = Request::builder().header(header::AUTHORIZATION, "Basic abc").body(Body::empty()).unwrap();
        assert!(extract_token(&req).is_none());
    }
}
