//! Helpers for reading gate responses in integration tests.

use serde_json::Value;

/// Read the body as the standard envelope, asserting its error code.
pub async fn read_envelope(response: reqwest::Response, expected_code: i64) -> Value {
    let body: Value = response.json().await.expect("body should be JSON");
    assert_eq!(
        body["error_code"], expected_code,
        "unexpected envelope code in {body}"
    );
    body
}

/// All `Set-Cookie` header values on a response, in order.
pub fn set_cookie_values(response: &reqwest::Response) -> Vec<String> {
    response
        .headers()
        .get_all(reqwest::header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .map(str::to_string)
        .collect()
}

/// Pull the value of `name` out of a list of `Set-Cookie` strings.
pub fn cookie_value(cookies: &[String], name: &str) -> Option<String> {
    cookies.iter().find_map(|cookie| {
        let (pair, _) = cookie.split_once(';').unwrap_or((cookie.as_str(), ""));
        let (key, value) = pair.split_once('=')?;
        (key == name).then(|| value.to_string())
    })
}

/// Build a request `Cookie` header value from name/value pairs.
pub fn cookie_header(pairs: &[(&str, &str)]) -> String {
    pairs
        .iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join("; ")
}
