use crate::server::Server;
use axum::{
    body::Body,
    extract::{Request, State},
    http::{HeaderMap, HeaderValue, Method, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::time::Instant;
use tracing::info;

/// Request origin when it matches the configured dashboard origin
fn allowed_origin(headers: &HeaderMap, allowed: &str) -> Option<HeaderValue> {
    let origin = headers.get(header::ORIGIN)?;
    let origin = origin.to_str().ok()?.trim();
    if origin.eq_ignore_ascii_case(allowed) {
        HeaderValue::from_str(origin).ok()
    } else {
        None
    }
}

/// Single-origin CORS: preflights are answered here with 204, other
/// responses gain `access-control-allow-origin` for the allowed origin.
pub async fn cors_middleware(
    State(server): State<Server>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let origin = allowed_origin(req.headers(), &server.config.cors.allowed_origin);

    if req.method() == Method::OPTIONS {
        let mut resp = StatusCode::NO_CONTENT.into_response();
        if let Some(origin) = origin {
            let headers = resp.headers_mut();
            headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin);
            headers.insert(
                header::ACCESS_CONTROL_ALLOW_METHODS,
                HeaderValue::from_static("GET,OPTIONS"),
            );
            headers.insert(
                header::ACCESS_CONTROL_ALLOW_HEADERS,
                HeaderValue::from_static("content-type"),
            );
            headers.insert(header::VARY, HeaderValue::from_static("Origin"));
        }
        return resp;
    }

    let mut resp = next.run(req).await;
    if let Some(origin) = origin {
        resp.headers_mut()
            .insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin);
        resp.headers_mut()
            .insert(header::VARY, HeaderValue::from_static("Origin"));
    }
    resp
}

/// Request/response logging for API routes
pub async fn request_response_logger(req: Request<Body>, next: Next) -> Response {
    let method = req.method().to_string();
    let path = req.uri().path().to_string();

    if !path.starts_with("/api") {
        return next.run(req).await;
    }

    let query = req.uri().query().unwrap_or_default().to_string();
    info!(method = %method, path = %path, query = %query, "API request");

    let start = Instant::now();
    let response = next.run(req).await;

    info!(
        method = %method,
        path = %path,
        status = %response.status().as_u16(),
        latency_ms = %start.elapsed().as_millis(),
        "API response"
    );

    response
}
