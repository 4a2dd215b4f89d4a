use axum::{
    body::Body,
    http::{HeaderMap, HeaderName, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use services::uuid::random_uuid;

pub static REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Caller-supplied id if non-blank, otherwise a fresh `req-{uuid}`.
fn ensure_request_id(headers: &HeaderMap) -> HeaderValue {
    if let Some(v) = headers.get(&REQUEST_ID_HEADER) {
        if v.to_str().map(|s| !s.trim().is_empty()).unwrap_or(false) {
            return v.clone();
        }
    }
    let id = format!("req-{}", random_uuid().simple());
    HeaderValue::from_str(&id).unwrap_or_else(|_| HeaderValue::from_static("req-unknown"))
}

/// Tags every request and its response with `X-Request-Id`.
pub async fn propagate_request_id(mut req: Request<Body>, next: Next) -> Response {
    let id = ensure_request_id(req.headers());
    req.headers_mut().insert(REQUEST_ID_HEADER.clone(), id.clone());

    let mut res = next.run(req).await;
    res.headers_mut().insert(REQUEST_ID_HEADER.clone(), id);
    res
}
