//! Test server harness for end-to-end testing.
//!
//! Spawns the real router on a random port, backed by in-memory stores,
//! so the full HTTP surface can be exercised without a database.

use crate::test_ids::{TEST_ACCESS_SECRET, TEST_REFRESH_SECRET};
use crate::token_builders::TestTokenBuilder;
use bookcircle_service::config::{
    Config, DEFAULT_ACCESS_TOKEN_TTL_SECONDS, DEFAULT_BCRYPT_COST,
    DEFAULT_REFRESH_TOKEN_TTL_SECONDS,
};
use bookcircle_service::crypto::password;
use bookcircle_service::handlers::auth_handler::AppState;
use bookcircle_service::models::{Account, NewAccount, Role};
use bookcircle_service::repositories::{AccountStore, MemoryAccountStore, MemoryBookStore};
use bookcircle_service::routes;
use secrecy::SecretString;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Test harness for spawning the auth service in end-to-end tests.
///
/// # Example
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_auth_flow_e2e() -> Result<(), anyhow::Error> {
///     let server = TestServer::spawn().await?;
///
///     let response = server
///         .client()
///         .post(format!("{}/api/auth/login", server.url()))
///         .json(&login_request)
///         .send()
///         .await?;
///
///     assert_eq!(response.status(), 200);
///     Ok(())
/// }
/// ```
pub struct TestServer {
    addr: SocketAddr,
    client: reqwest::Client,
    accounts: Arc<MemoryAccountStore>,
    books: Arc<MemoryBookStore>,
    config: Config,
    _handle: JoinHandle<()>,
}

impl TestServer {
    /// Spawn a new test server instance with isolated in-memory stores.
    pub async fn spawn() -> Result<Self, anyhow::Error> {
        let config = Config {
            database_url: String::new(), // In-memory stores; never connected
            bind_address: "127.0.0.1:0".to_string(),
            access_token_secret: SecretString::from(TEST_ACCESS_SECRET.to_string()),
            refresh_token_secret: SecretString::from(TEST_REFRESH_SECRET.to_string()),
            access_token_ttl_seconds: DEFAULT_ACCESS_TOKEN_TTL_SECONDS,
            refresh_token_ttl_seconds: DEFAULT_REFRESH_TOKEN_TTL_SECONDS,
            bcrypt_cost: DEFAULT_BCRYPT_COST,
        };

        let accounts = Arc::new(MemoryAccountStore::new());
        let books = Arc::new(MemoryBookStore::new());

        let state = Arc::new(AppState {
            accounts: accounts.clone(),
            books: books.clone(),
            config: config.clone(),
        });

        // Install the metrics recorder once per test process; later spawns
        // fall back to a standalone recorder.
        let metrics_handle =
            match bookcircle_service::observability::metrics::init_metrics_recorder() {
                Ok(handle) => handle,
                Err(_) => {
                    use metrics_exporter_prometheus::PrometheusBuilder;
                    PrometheusBuilder::new().build_recorder().handle()
                }
            };

        let app = routes::build_routes(state, metrics_handle);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind test server: {}", e))?;

        let addr = listener
            .local_addr()
            .map_err(|e| anyhow::anyhow!("Failed to get local address: {}", e))?;

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("Test server error: {}", e);
            }
        });

        Ok(Self {
            addr,
            client: reqwest::Client::new(),
            accounts,
            books,
            config,
            _handle: handle,
        })
    }

    /// Base URL of the running server.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Shared HTTP client.
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// The account store backing this server.
    pub fn accounts(&self) -> &Arc<MemoryAccountStore> {
        &self.accounts
    }

    /// The book store backing this server.
    pub fn books(&self) -> &Arc<MemoryBookStore> {
        &self.books
    }

    /// The configuration the server was spawned with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Seed an account directly into the store, bypassing the HTTP
    /// surface, with the given plaintext password hashed for real.
    pub async fn seed_account(
        &self,
        username: &str,
        plaintext_password: &str,
        role: Role,
    ) -> Result<Account, anyhow::Error> {
        let password_hash = password::hash_password(plaintext_password, DEFAULT_BCRYPT_COST)
            .map_err(|e| anyhow::anyhow!("Failed to hash seed password: {}", e))?;

        self.accounts
            .insert(NewAccount {
                username: username.to_string(),
                email: format!("{}@example.com", username),
                display_name: username.to_string(),
                password_hash,
                role,
            })
            .await
            .map_err(|e| anyhow::anyhow!("Failed to seed account: {}", e))
    }

    /// Mint a valid access token for a seeded account, signed with the
    /// server's access secret.
    pub fn access_token_for(&self, account: &Account) -> String {
        TestTokenBuilder::new()
            .for_account(account.account_id)
            .with_username(&account.username)
            .with_role(account.role)
            .expires_in(self.config.access_token_ttl_seconds)
            .sign(TEST_ACCESS_SECRET)
    }
}
