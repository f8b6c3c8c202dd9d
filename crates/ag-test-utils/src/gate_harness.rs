//! Test server harness for end-to-end gate testing.
//!
//! Provides [`TestGate`] for spawning real gate instances over an
//! in-memory user store in integration tests.

use ag_service::config::Config;
use ag_service::observability::metrics::init_metrics_recorder;
use ag_service::routes::{self, AppState};
use ag_service::store::{MemoryUserStore, UserRecord};
use ag_service::token::{self, GroupRoles, RoleGrant, SessionClaims};
use chrono::Utc;
use metrics_exporter_prometheus::PrometheusHandle;
use secrecy::SecretString;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Signing secret every test server starts with.
pub const TEST_JWT_SECRET: &str = "integration-test-secret-0123456789";

/// Global metrics handle for test servers
static TEST_METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Shared Prometheus handle for test servers.
///
/// The global recorder can only install once per process; later servers
/// reuse the same handle.
pub fn get_test_metrics_handle() -> PrometheusHandle {
    TEST_METRICS_HANDLE
        .get_or_init(|| {
            init_metrics_recorder().unwrap_or_else(|_| {
                metrics_exporter_prometheus::PrometheusBuilder::new()
                    .build_recorder()
                    .handle()
            })
        })
        .clone()
}

/// Build a [`GroupRoles`] payload granting a list of path patterns.
pub fn roles(group: &str, patterns: &[&str]) -> GroupRoles {
    GroupRoles {
        name: group.to_string(),
        roles: patterns
            .iter()
            .map(|pattern| RoleGrant {
                url: (*pattern).to_string(),
                description: format!("grants {pattern}"),
            })
            .collect(),
    }
}

/// Test harness for spawning the gate in end-to-end tests
///
/// # Example
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_login_flow() -> anyhow::Result<()> {
///     let gate = TestGate::spawn().await?;
///     gate.seed_user("alice@example.com", "alice", "hunter2hunter2", "dev");
///
///     let client = reqwest::Client::new();
///     let response = client
///         .post(format!("{}/login", gate.url()))
///         .json(&login_body)
///         .send()
///         .await?;
///
///     assert_eq!(response.status(), 200);
///     Ok(())
/// }
/// ```
pub struct TestGate {
    addr: SocketAddr,
    store: Arc<MemoryUserStore>,
    config: Config,
    _server_handle: JoinHandle<()>,
}

impl TestGate {
    /// Spawn a gate with the default test configuration (fast bcrypt,
    /// fixed signing secret, stock public paths).
    pub async fn spawn() -> Result<Self, anyhow::Error> {
        Self::spawn_with_vars(HashMap::new()).await
    }

    /// Spawn a gate with extra environment-style overrides layered on
    /// the defaults, e.g. a short `AG_TOKEN_TTL_SECONDS`.
    pub async fn spawn_with_vars(
        overrides: HashMap<String, String>,
    ) -> Result<Self, anyhow::Error> {
        let mut vars = HashMap::from([
            (
                "DATABASE_URL".to_string(),
                "postgresql://unused-in-tests/gate".to_string(),
            ),
            ("AG_JWT_SECRET".to_string(), TEST_JWT_SECRET.to_string()),
            ("AG_BCRYPT_COST".to_string(), "4".to_string()),
        ]);
        vars.extend(overrides);

        let config = Config::from_vars(&vars)
            .map_err(|e| anyhow::anyhow!("Failed to create config: {e}"))?;

        let store = Arc::new(MemoryUserStore::new());

        // Create application state over the in-memory store
        let state = Arc::new(AppState {
            store: store.clone(),
            config: config.clone(),
        });

        // Build routes using the real route builder
        let app = routes::build_routes(state, get_test_metrics_handle());

        // Bind to random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind test server: {e}"))?;

        let addr = listener
            .local_addr()
            .map_err(|e| anyhow::anyhow!("Failed to get local address: {e}"))?;

        // Spawn server in background
        let server_handle = tokio::spawn(async move {
            let make_service = app.into_make_service_with_connect_info::<SocketAddr>();
            if let Err(e) = axum::serve(listener, make_service).await {
                eprintln!("Test server error: {e}");
            }
        });

        Ok(Self {
            addr,
            store,
            config,
            _server_handle: server_handle,
        })
    }

    /// Get the base URL of the test server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Get the in-memory store behind the server, for seeding and
    /// post-request inspection.
    pub fn store(&self) -> &MemoryUserStore {
        &self.store
    }

    /// Get the configuration the server runs with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Seed a user with a bcrypt-hashed password; returns the new id.
    pub fn seed_user(&self, email: &str, username: &str, password: &str, group: &str) -> Uuid {
        let user_id = Uuid::new_v4();
        let password_hash = bcrypt::hash(password, 4).expect("bcrypt hash should succeed");

        self.store.seed_user(UserRecord {
            user_id,
            email: email.to_string(),
            username: username.to_string(),
            password_hash,
            group_name: group.to_string(),
            refresh_token: None,
        });

        user_id
    }

    /// Grant a group a set of path patterns, picked up by the next
    /// login or refresh.
    pub fn grant_roles(&self, group: &str, patterns: &[&str]) {
        self.store.set_group_roles(group, roles(group, patterns).roles);
    }

    /// Issue an access token the gate will accept.
    pub fn valid_token(&self, email: &str, username: &str, group: GroupRoles) -> String {
        let claims = SessionClaims::new(email, username, group, 3600);
        token::issue(&claims, &self.config.jwt_secret).expect("token issuance should succeed")
    }

    /// Issue a token whose signature checks out but whose expiry has
    /// already passed.
    pub fn expired_token(&self, email: &str, username: &str, group: GroupRoles) -> String {
        let now = Utc::now().timestamp();
        let claims = SessionClaims {
            email: email.to_string(),
            username: username.to_string(),
            group_with_roles: group,
            iat: now - 7200,
            exp: now - 3600,
        };

        token::issue(&claims, &self.config.jwt_secret).expect("token issuance should succeed")
    }

    /// Issue a well-formed token signed with a secret the gate does not
    /// hold.
    pub fn foreign_token(&self, email: &str, username: &str, group: GroupRoles) -> String {
        let claims = SessionClaims::new(email, username, group, 3600);
        let other_secret = SecretString::from("a-completely-different-secret");

        token::issue(&claims, &other_secret).expect("token issuance should succeed")
    }
}

impl Drop for TestGate {
    fn drop(&mut self) {
        self._server_handle.abort();
    }
}
