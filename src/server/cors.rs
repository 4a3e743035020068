use axum::http::{ header, HeaderMap, HeaderValue };
use url::Url;

/// Lifetime browsers may cache a preflight result for, in seconds.
pub const PREFLIGHT_MAX_AGE: &str = "86400";

fn is_loopback_origin(origin: &str) -> bool {
    match Url::parse(origin) {
        Ok(url) => matches!(url.host_str(), Some("localhost") | Some("127.0.0.1")),
        Err(_) => false,
    }
}

/// Computes the CORS headers for one request.
///
/// An origin is allowed on exact match with the configured value, when the
/// configuration is the `*` wildcard, or when it points at loopback so local
/// development works against a deployed gateway. A disallowed origin gets the
/// configured value back instead of an echo, which browsers then refuse to
/// match.
pub fn cors_headers(origin: Option<&str>, allowed_origin: &str) -> HeaderMap {
    let allowed =
        allowed_origin == "*" ||
        origin == Some(allowed_origin) ||
        origin.map(is_loopback_origin).unwrap_or(false);

    let allow_origin = if allowed {
        origin.unwrap_or(allowed_origin)
    } else {
        allowed_origin
    };

    let mut headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(allow_origin) {
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, value);
    }
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("POST, OPTIONS")
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type")
    );
    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allow_origin(headers: &HeaderMap) -> &str {
        headers
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap()
            .to_str()
            .unwrap()
    }

    #[test]
    fn echoes_an_exactly_matching_origin() {
        let headers = cors_headers(Some("https://example.com"), "https://example.com");
        assert_eq!(allow_origin(&headers), "https://example.com");
    }

    #[test]
    fn wildcard_configuration_echoes_any_origin() {
        let headers = cors_headers(Some("https://anywhere.dev"), "*");
        assert_eq!(allow_origin(&headers), "https://anywhere.dev");
    }

    #[test]
    fn loopback_origins_are_allowed_during_development() {
        let headers = cors_headers(Some("http://localhost:3000"), "https://example.com");
        assert_eq!(allow_origin(&headers), "http://localhost:3000");

        let headers = cors_headers(Some("http://127.0.0.1:8080"), "https://example.com");
        assert_eq!(allow_origin(&headers), "http://127.0.0.1:8080");
    }

    #[test]
    fn disallowed_origins_get_the_configured_value() {
        let headers = cors_headers(Some("https://evil.example"), "https://example.com");
        assert_eq!(allow_origin(&headers), "https://example.com");
    }

    #[test]
    fn absent_origin_gets_the_configured_value() {
        let headers = cors_headers(None, "https://example.com");
        assert_eq!(allow_origin(&headers), "https://example.com");
        assert!(headers.get(header::ACCESS_CONTROL_ALLOW_METHODS).is_some());
        assert!(headers.get(header::ACCESS_CONTROL_ALLOW_HEADERS).is_some());
    }
}
