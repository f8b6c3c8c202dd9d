//! End-to-end session tests: login, logout and registration against a
//! running gate.

// Test code is allowed to use expect/unwrap for assertions
#![allow(clippy::unwrap_used, clippy::expect_used)]

use ag_test_utils::{cookie_header, cookie_value, read_envelope, set_cookie_values, TestGate};
use anyhow::Result;
use serde_json::json;

/// Test that login sets both cookies and returns the session payload.
#[tokio::test]
async fn test_login_sets_cookies_and_returns_session() -> Result<()> {
    let gate = TestGate::spawn().await?;
    gate.seed_user("alice@example.com", "alice", "hunter2hunter2", "dev");
    gate.grant_roles("dev", &["/users"]);

    let client = reqwest::Client::new();
    let response = client
        .post(format!("{}/login", gate.url()))
        .json(&json!({
            "email": "alice@example.com",
            "password": "hunter2hunter2",
        }))
        .send()
        .await?;

    assert_eq!(response.status(), 200);

    let cookies = set_cookie_values(&response);
    let access = cookie_value(&cookies, "access-token").expect("access cookie should be set");
    let refresh = cookie_value(&cookies, "refresh-token").expect("refresh cookie should be set");
    assert!(!access.is_empty());
    assert!(!refresh.is_empty());

    let body = read_envelope(response, 0).await;
    assert_eq!(body["data"]["email"], "alice@example.com");
    assert_eq!(body["data"]["username"], "alice");
    assert_eq!(body["data"]["group_with_roles"]["name"], "dev");
    assert_eq!(body["data"]["access_token"], access.as_str());

    Ok(())
}

/// Test that a wrong password and an unknown email get the same answer.
#[tokio::test]
async fn test_login_rejects_bad_credentials_uniformly() -> Result<()> {
    let gate = TestGate::spawn().await?;
    gate.seed_user("alice@example.com", "alice", "hunter2hunter2", "dev");

    let client = reqwest::Client::new();
    let mut messages = Vec::new();

    for (email, password) in [
        ("alice@example.com", "wrong-password"),
        ("nobody@example.com", "hunter2hunter2"),
    ] {
        let response = client
            .post(format!("{}/login", gate.url()))
            .json(&json!({"email": email, "password": password}))
            .send()
            .await?;

        assert_eq!(response.status(), 401, "credentials {email}/{password}");
        assert!(set_cookie_values(&response).is_empty());

        let body = read_envelope(response, -1).await;
        messages.push(body["message"].clone());
    }

    assert_eq!(messages.first(), messages.get(1));

    Ok(())
}

/// Test that the cookies from login open a protected path.
#[tokio::test]
async fn test_login_cookie_opens_protected_path() -> Result<()> {
    let gate = TestGate::spawn().await?;
    gate.seed_user("alice@example.com", "alice", "hunter2hunter2", "dev");
    gate.grant_roles("dev", &["/users"]);

    let client = reqwest::Client::new();
    let login = client
        .post(format!("{}/login", gate.url()))
        .json(&json!({
            "email": "alice@example.com",
            "password": "hunter2hunter2",
        }))
        .send()
        .await?;

    let cookies = set_cookie_values(&login);
    let access = cookie_value(&cookies, "access-token").expect("access cookie should be set");

    let response = client
        .get(format!("{}/users", gate.url()))
        .header(
            reqwest::header::COOKIE,
            cookie_header(&[("access-token", access.as_str())]),
        )
        .send()
        .await?;

    assert_eq!(response.status(), 200);
    let body = read_envelope(response, 0).await;
    assert_eq!(body["data"][0]["email"], "alice@example.com");

    Ok(())
}

/// Test that registration creates a member-group user who can then log
/// in and reach the self-service path.
#[tokio::test]
async fn test_register_then_login() -> Result<()> {
    let gate = TestGate::spawn().await?;
    let client = reqwest::Client::new();

    let register = client
        .post(format!("{}/register", gate.url()))
        .json(&json!({
            "email": "bob@example.com",
            "username": "bob",
            "password": "longenough",
        }))
        .send()
        .await?;

    assert_eq!(register.status(), 200);
    let body = read_envelope(register, 0).await;
    assert_eq!(body["data"]["email"], "bob@example.com");
    assert_eq!(body["data"]["group_name"], "member");
    assert!(body["data"]["user_id"].is_string());

    let login = client
        .post(format!("{}/login", gate.url()))
        .json(&json!({"email": "bob@example.com", "password": "longenough"}))
        .send()
        .await?;

    assert_eq!(login.status(), 200);
    let cookies = set_cookie_values(&login);
    let access = cookie_value(&cookies, "access-token").expect("access cookie should be set");

    // The member group holds no grants, but /account is exempt.
    let account = client
        .get(format!("{}/account", gate.url()))
        .header(
            reqwest::header::COOKIE,
            cookie_header(&[("access-token", access.as_str())]),
        )
        .send()
        .await?;

    assert_eq!(account.status(), 200);
    let body = read_envelope(account, 0).await;
    assert_eq!(body["data"]["claims"]["email"], "bob@example.com");

    Ok(())
}

/// Test the registration validation table over the wire.
#[tokio::test]
async fn test_register_validation_failures() -> Result<()> {
    let gate = TestGate::spawn().await?;
    gate.seed_user("taken@example.com", "taken", "hunter2hunter2", "dev");

    let client = reqwest::Client::new();
    let cases = [
        (
            json!({"email": "no-at-sign", "username": "x", "password": "longenough"}),
            "Invalid email format",
        ),
        (
            json!({"email": "short@example.com", "username": "x", "password": "short"}),
            "Password must be at least 8 characters",
        ),
        (
            json!({"email": "blank@example.com", "username": "   ", "password": "longenough"}),
            "Username cannot be empty",
        ),
        (
            json!({"email": "taken@example.com", "username": "again", "password": "longenough"}),
            "Email is already in use",
        ),
    ];

    for (payload, expected_message) in cases {
        let response = client
            .post(format!("{}/register", gate.url()))
            .json(&payload)
            .send()
            .await?;

        assert_eq!(response.status(), 400, "payload {payload}");
        let body = read_envelope(response, -1).await;
        assert_eq!(body["message"], expected_message);
    }

    Ok(())
}

/// Test that logout expires both cookies and kills the stored
/// credential.
#[tokio::test]
async fn test_logout_expires_cookies_and_revokes_credential() -> Result<()> {
    let gate = TestGate::spawn().await?;
    gate.seed_user("alice@example.com", "alice", "hunter2hunter2", "dev");
    gate.grant_roles("dev", &["/users"]);

    let client = reqwest::Client::new();
    let login = client
        .post(format!("{}/login", gate.url()))
        .json(&json!({
            "email": "alice@example.com",
            "password": "hunter2hunter2",
        }))
        .send()
        .await?;

    let cookies = set_cookie_values(&login);
    let refresh = cookie_value(&cookies, "refresh-token").expect("refresh cookie should be set");

    let logout = client
        .post(format!("{}/logout", gate.url()))
        .header(
            reqwest::header::COOKIE,
            cookie_header(&[("refresh-token", refresh.as_str())]),
        )
        .send()
        .await?;

    assert_eq!(logout.status(), 200);
    let cleared = set_cookie_values(&logout);
    assert_eq!(cleared.len(), 2);
    assert!(cleared.iter().all(|c| c.contains("Max-Age=0")));
    read_envelope(logout, 0).await;

    // The revoked credential can no longer drive a refresh.
    let expired = gate.expired_token(
        "alice@example.com",
        "alice",
        ag_test_utils::roles("dev", &["/users"]),
    );
    let replay = client
        .get(format!("{}/users", gate.url()))
        .header(
            reqwest::header::COOKIE,
            cookie_header(&[
                ("access-token", expired.as_str()),
                ("refresh-token", refresh.as_str()),
            ]),
        )
        .send()
        .await?;

    assert_eq!(replay.status().as_u16(), 433);
    assert!(set_cookie_values(&replay).is_empty());

    Ok(())
}

/// Test that logout without a refresh cookie still answers success.
#[tokio::test]
async fn test_logout_without_cookie_succeeds() -> Result<()> {
    let gate = TestGate::spawn().await?;

    let client = reqwest::Client::new();
    let response = client
        .post(format!("{}/logout", gate.url()))
        .send()
        .await?;

    assert_eq!(response.status(), 200);
    assert_eq!(set_cookie_values(&response).len(), 2);

    Ok(())
}
