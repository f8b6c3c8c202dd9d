//! Health check endpoint.

/// Liveness probe. Answers outside the guarded set so orchestrators can
/// poll it without credentials.
pub async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_check_returns_ok() {
        assert_eq!(health_check().await, "OK");
    }
}
