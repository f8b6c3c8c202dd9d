//! Cookie header plumbing.
//!
//! The wire contract uses two cookies: the signed access token
//! (`HttpOnly`) and the opaque refresh credential. Values are JWTs and
//! UUIDs, both cookie-safe, so no encoding layer is needed; `Set-Cookie`
//! strings are built by hand and the `Cookie` header is parsed directly.

use axum::http::{header, HeaderMap, HeaderValue};

pub const ACCESS_COOKIE_NAME: &str = "access-token";
pub const REFRESH_COOKIE_NAME: &str = "refresh-token";

#[derive(Debug, Clone)]
pub struct CookieOptions {
    pub path: &'static str,
    pub http_only: bool,
    pub max_age_seconds: Option<i64>,
}

impl Default for CookieOptions {
    fn default() -> Self {
        Self {
            path: "/",
            http_only: false,
            max_age_seconds: None,
        }
    }
}

/// Render a `Set-Cookie` header value.
pub fn build_set_cookie(name: &str, value: &str, options: &CookieOptions) -> String {
    let mut cookie = format!("{name}={value}");

    if let Some(max_age) = options.max_age_seconds {
        cookie.push_str(&format!("; Max-Age={max_age}"));
    }

    cookie.push_str(&format!("; Path={}", options.path));

    if options.http_only {
        cookie.push_str("; HttpOnly");
    }

    cookie
}

/// Render a `Set-Cookie` header value that removes the cookie.
///
/// Path and HttpOnly must match the original cookie or browsers keep the
/// old one alive.
pub fn build_clear_cookie(name: &str, options: &CookieOptions) -> String {
    let mut cookie = format!("{name}=; Max-Age=0; Path={}", options.path);

    if options.http_only {
        cookie.push_str("; HttpOnly");
    }

    cookie
}

/// `Set-Cookie` for a freshly issued access token.
pub fn access_cookie(token: &str, max_age_seconds: i64) -> String {
    build_set_cookie(
        ACCESS_COOKIE_NAME,
        token,
        &CookieOptions {
            http_only: true,
            max_age_seconds: Some(max_age_seconds),
            ..CookieOptions::default()
        },
    )
}

/// `Set-Cookie` for a freshly rotated refresh credential.
pub fn refresh_cookie(value: &str) -> String {
    build_set_cookie(REFRESH_COOKIE_NAME, value, &CookieOptions::default())
}

pub fn clear_access_cookie() -> String {
    build_clear_cookie(
        ACCESS_COOKIE_NAME,
        &CookieOptions {
            http_only: true,
            ..CookieOptions::default()
        },
    )
}

pub fn clear_refresh_cookie() -> String {
    build_clear_cookie(REFRESH_COOKIE_NAME, &CookieOptions::default())
}

/// Append a `Set-Cookie` header to a response header map.
///
/// Values that fail header encoding are logged and skipped.
pub fn append_set_cookie(headers: &mut HeaderMap, cookie: &str) {
    match HeaderValue::from_str(cookie) {
        Ok(value) => {
            headers.append(header::SET_COOKIE, value);
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode Set-Cookie header");
        }
    }
}

/// Pull a cookie value out of the request's `Cookie` header(s).
///
/// First match wins; values keep any embedded `=` intact.
pub fn get_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    for header in headers.get_all(header::COOKIE) {
        let Ok(raw) = header.to_str() else {
            continue;
        };

        for pair in raw.split(';') {
            if let Some((key, value)) = pair.trim().split_once('=') {
                if key.trim() == name {
                    return Some(value.to_string());
                }
            }
        }
    }

    None
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_access_cookie_shape() {
        let cookie = access_cookie("header.payload.sig", 3000);
        assert_eq!(
            cookie,
            "access-token=header.payload.sig; Max-Age=3000; Path=/; HttpOnly"
        );
    }

    #[test]
    fn test_refresh_cookie_shape() {
        let cookie = refresh_cookie("550e8400-e29b-41d4-a716-446655440000");
        assert_eq!(
            cookie,
            "refresh-token=550e8400-e29b-41d4-a716-446655440000; Path=/"
        );
    }

    #[test]
    fn test_clear_cookies_expire_immediately() {
        assert_eq!(
            clear_access_cookie(),
            "access-token=; Max-Age=0; Path=/; HttpOnly"
        );
        assert_eq!(clear_refresh_cookie(), "refresh-token=; Max-Age=0; Path=/");
    }

    #[test]
    fn test_get_cookie_single_pair() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("access-token=abc123"),
        );

        assert_eq!(
            get_cookie(&headers, ACCESS_COOKIE_NAME),
            Some("abc123".to_string())
        );
    }

    #[test]
    fn test_get_cookie_among_many_pairs() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; access-token=abc123; refresh-token=r-1"),
        );

        assert_eq!(
            get_cookie(&headers, ACCESS_COOKIE_NAME),
            Some("abc123".to_string())
        );
        assert_eq!(
            get_cookie(&headers, REFRESH_COOKIE_NAME),
            Some("r-1".to_string())
        );
    }

    #[test]
    fn test_get_cookie_tolerates_whitespace() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark;  access-token=abc123"),
        );

        assert_eq!(
            get_cookie(&headers, ACCESS_COOKIE_NAME),
            Some("abc123".to_string())
        );
    }

    #[test]
    fn test_get_cookie_across_multiple_headers() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("theme=dark"));
        headers.append(
            header::COOKIE,
            HeaderValue::from_static("refresh-token=r-2"),
        );

        assert_eq!(
            get_cookie(&headers, REFRESH_COOKIE_NAME),
            Some("r-2".to_string())
        );
    }

    #[test]
    fn test_get_cookie_missing() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark"));

        assert_eq!(get_cookie(&headers, ACCESS_COOKIE_NAME), None);
        assert_eq!(get_cookie(&HeaderMap::new(), ACCESS_COOKIE_NAME), None);
    }

    #[test]
    fn test_get_cookie_value_keeps_embedded_equals() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("access-token=a=b=c"),
        );

        assert_eq!(
            get_cookie(&headers, ACCESS_COOKIE_NAME),
            Some("a=b=c".to_string())
        );
    }

    #[test]
    fn test_get_cookie_first_match_wins() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("access-token=first; access-token=second"),
        );

        assert_eq!(
            get_cookie(&headers, ACCESS_COOKIE_NAME),
            Some("first".to_string())
        );
    }

    #[test]
    fn test_append_set_cookie_stacks_headers() {
        let mut headers = HeaderMap::new();
        append_set_cookie(&mut headers, &access_cookie("tok", 3000));
        append_set_cookie(&mut headers, &refresh_cookie("r-1"));

        let values: Vec<&str> = headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect();
        assert_eq!(values.len(), 2);
        assert!(values.first().unwrap().starts_with("access-token=tok"));
        assert!(values.get(1).unwrap().starts_with("refresh-token=r-1"));
    }

    #[test]
    fn test_append_set_cookie_skips_unencodable_values() {
        let mut headers = HeaderMap::new();
        append_set_cookie(&mut headers, "bad=\u{7f}value");

        assert!(headers.get(header::SET_COOKIE).is_none());
    }
}
