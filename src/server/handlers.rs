use super::AppState;
use super::cors::{ cors_headers, PREFLIGHT_MAX_AGE };
use super::error::GatewayError;
use crate::models::chat::parse_chat_request;
use axum::body::{ Body, Bytes };
use axum::extract::State;
use axum::http::{ header, HeaderMap, HeaderValue, Method, StatusCode };
use axum::response::{ IntoResponse, Response };
use log::{ error, info, warn };
use serde_json::json;
use uuid::Uuid;

/// Single entry point for the `/` route. CORS headers are computed up front
/// so every outcome, including errors, carries them.
pub async fn dispatch(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    body: Bytes
) -> Response {
    let origin = headers
        .get(header::ORIGIN)
        .and_then(|v| v.to_str().ok());
    let cors = cors_headers(origin, &state.allowed_origin);

    if method == Method::OPTIONS {
        return preflight(cors);
    }

    match chat(&state, method, &headers, &body).await {
        Ok(upstream) => relay(upstream, cors),
        Err(e) => error_response(e, cors),
    }
}

fn preflight(cors: HeaderMap) -> Response {
    let mut resp = StatusCode::NO_CONTENT.into_response();
    resp.headers_mut().extend(cors);
    resp.headers_mut().insert(
        header::ACCESS_CONTROL_MAX_AGE,
        HeaderValue::from_static(PREFLIGHT_MAX_AGE)
    );
    resp
}

async fn chat(
    state: &AppState,
    method: Method,
    headers: &HeaderMap,
    body: &[u8]
) -> Result<reqwest::Response, GatewayError> {
    if method != Method::POST {
        return Err(GatewayError::MethodNotAllowed);
    }

    let request_id = Uuid::new_v4();
    let client_key = client_key(headers, &state.client_ip_header);

    if !state.limiter.allow(&client_key).await {
        warn!("[{}] rate limit exceeded for {}", request_id, client_key);
        return Err(GatewayError::RateLimited);
    }

    let messages = parse_chat_request(body)?;
    info!("[{}] {} message(s) from {}", request_id, messages.len(), client_key);

    let resp = state.upstream
        .stream_messages(&state.system_prompt, &messages).await
        .map_err(|e| {
            error!("[{}] upstream request failed: {}", request_id, e);
            GatewayError::Internal(e.to_string())
        })?;

    let status = resp.status();
    if !status.is_success() {
        let detail = resp
            .text().await
            .unwrap_or_else(|e| format!("<unreadable body: {}>", e));
        error!("[{}] upstream error {}: {}", request_id, status, detail);
        return Err(GatewayError::Upstream {
            status: StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::BAD_GATEWAY),
        });
    }

    Ok(resp)
}

/// First value of the configured forwarded-IP header, or the "unknown"
/// sentinel so clients behind a misconfigured proxy still share one bucket.
fn client_key(headers: &HeaderMap, header_name: &str) -> String {
    headers
        .get(header_name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or("unknown")
        .to_string()
}

/// Relays the upstream SSE body byte for byte.
fn relay(upstream: reqwest::Response, cors: HeaderMap) -> Response {
    let mut resp = Response::new(Body::from_stream(upstream.bytes_stream()));
    resp.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/event-stream")
    );
    resp.headers_mut().insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    resp.headers_mut().extend(cors);
    resp
}

fn error_response(err: GatewayError, cors: HeaderMap) -> Response {
    let status = err.status();
    let mut resp = (status, axum::Json(json!({ "error": err.client_message() }))).into_response();
    resp.headers_mut().extend(cors);
    resp
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_key_takes_the_first_forwarded_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.7, 10.0.0.1, 10.0.0.2")
        );
        assert_eq!(client_key(&headers, "x-forwarded-for"), "203.0.113.7");
    }

    #[test]
    fn client_key_falls_back_to_unknown() {
        let headers = HeaderMap::new();
        assert_eq!(client_key(&headers, "x-forwarded-for"), "unknown");

        let mut empty = HeaderMap::new();
        empty.insert("x-forwarded-for", HeaderValue::from_static("  "));
        assert_eq!(client_key(&empty, "x-forwarded-for"), "unknown");
    }
}
