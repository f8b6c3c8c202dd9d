//! Server-to-server token verification tests over a running gate.

// Test code is allowed to use expect/unwrap for assertions
#![allow(clippy::unwrap_used, clippy::expect_used)]

use ag_test_utils::{cookie_header, read_envelope, roles, TestGate};
use anyhow::Result;

/// Test that a valid bearer token verifies and returns its claims.
#[tokio::test]
async fn test_valid_token_verifies() -> Result<()> {
    let gate = TestGate::spawn().await?;
    let token = gate.valid_token("peer@example.com", "peer", roles("services", &[]));

    let client = reqwest::Client::new();
    let response = client
        .get(format!("{}/verify-server-token", gate.url()))
        .header(reqwest::header::AUTHORIZATION, format!("Bearer {token}"))
        .send()
        .await?;

    assert_eq!(response.status(), 200);
    let body = read_envelope(response, 0).await;
    assert_eq!(body["data"]["email"], "peer@example.com");
    assert_eq!(body["data"]["group_with_roles"]["name"], "services");

    Ok(())
}

/// Test that an expired token is refused with 433.
#[tokio::test]
async fn test_expired_token_is_433() -> Result<()> {
    let gate = TestGate::spawn().await?;
    let token = gate.expired_token("peer@example.com", "peer", roles("services", &[]));

    let client = reqwest::Client::new();
    let response = client
        .get(format!("{}/verify-server-token", gate.url()))
        .header(reqwest::header::AUTHORIZATION, format!("Bearer {token}"))
        .send()
        .await?;

    assert_eq!(response.status().as_u16(), 433);
    let body = read_envelope(response, -1).await;
    assert!(body["data"].is_null());

    Ok(())
}

/// Test that a token signed elsewhere is refused with 433.
#[tokio::test]
async fn test_foreign_token_is_433() -> Result<()> {
    let gate = TestGate::spawn().await?;
    let token = gate.foreign_token("peer@example.com", "peer", roles("services", &[]));

    let client = reqwest::Client::new();
    let response = client
        .get(format!("{}/verify-server-token", gate.url()))
        .header(reqwest::header::AUTHORIZATION, format!("Bearer {token}"))
        .send()
        .await?;

    assert_eq!(response.status().as_u16(), 433);

    Ok(())
}

/// Test that no token at all answers 402.
#[tokio::test]
async fn test_missing_token_is_402() -> Result<()> {
    let gate = TestGate::spawn().await?;

    let client = reqwest::Client::new();
    let response = client
        .get(format!("{}/verify-server-token", gate.url()))
        .send()
        .await?;

    assert_eq!(response.status(), 402);
    let body = read_envelope(response, -1).await;
    assert!(body["data"].is_null());

    Ok(())
}

/// Test that the endpoint reads the header only; a token offered as a
/// cookie does not count.
#[tokio::test]
async fn test_cookie_token_does_not_count() -> Result<()> {
    let gate = TestGate::spawn().await?;
    let token = gate.valid_token("peer@example.com", "peer", roles("services", &[]));

    let client = reqwest::Client::new();
    let response = client
        .get(format!("{}/verify-server-token", gate.url()))
        .header(
            reqwest::header::COOKIE,
            cookie_header(&[("access-token", token.as_str())]),
        )
        .send()
        .await?;

    assert_eq!(response.status(), 402);

    Ok(())
}

/// Test that other authorization schemes are treated as missing.
#[tokio::test]
async fn test_non_bearer_scheme_is_402() -> Result<()> {
    let gate = TestGate::spawn().await?;

    let client = reqwest::Client::new();
    for value in ["Basic dXNlcjpwYXNz", "bearer lowercase-scheme"] {
        let response = client
            .get(format!("{}/verify-server-token", gate.url()))
            .header(reqwest::header::AUTHORIZATION, value)
            .send()
            .await?;

        assert_eq!(response.status(), 402, "scheme '{value}'");
    }

    Ok(())
}
