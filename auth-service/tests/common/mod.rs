use std::sync::Arc;

use auth::Authenticator;
use auth::PasswordHasher;
use auth_service::domain::user::service::AuthService;
use auth_service::inbound::http::router::create_router;
use auth_service::outbound::repositories::SqliteCredentialStore;
use chrono::Duration;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

pub const TEST_SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";

/// Test application that spawns a real server
pub struct TestApp {
    pub address: String,
    pub pool: SqlitePool,
    pub api_client: reqwest::Client,
    pub authenticator: Authenticator,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        Self::spawn_with_token_ttl(Duration::minutes(30)).await
    }

    /// Spawn with a custom token lifetime (negative values issue already-expired tokens)
    pub async fn spawn_with_token_ttl(token_ttl: Duration) -> Self {
        let pool = test_pool().await;

        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let authenticator = Authenticator::new(TEST_SECRET)
            .with_password_hasher(PasswordHasher::with_cost(4).expect("valid cost"))
            .with_token_ttl(token_ttl);

        let credential_store = Arc::new(SqliteCredentialStore::new(pool.clone()));
        let auth_service = Arc::new(AuthService::new(
            credential_store,
            Arc::new(authenticator.clone()),
        ));

        let router = create_router(auth_service, "Auth Service");

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            pool,
            api_client: reqwest::Client::new(),
            authenticator,
        }
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    /// Register an account and return the raw response
    pub async fn register(&self, email: &str, password: &str) -> reqwest::Response {
        self.post("/auth/register")
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Log in and return the raw response
    pub async fn login(&self, email: &str, password: &str) -> reqwest::Response {
        self.post("/auth/login")
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Log in and extract the access token, panicking on failure
    pub async fn token_for(&self, email: &str, password: &str) -> String {
        let response = self.login(email, password).await;
        assert_eq!(response.status(), reqwest::StatusCode::OK);

        let body: serde_json::Value = response.json().await.expect("Failed to parse response");
        body["data"]["access_token"]
            .as_str()
            .expect("access_token missing")
            .to_string()
    }

    /// Flip the active flag directly in storage
    pub async fn set_active(&self, email: &str, is_active: bool) {
        sqlx::query("UPDATE users SET is_active = ?1 WHERE email = ?2")
            .bind(is_active)
            .bind(email)
            .execute(&self.pool)
            .await
            .expect("Failed to update user");
    }

    /// Delete a user directly in storage
    pub async fn delete_user(&self, email: &str) {
        sqlx::query("DELETE FROM users WHERE email = ?1")
            .bind(email)
            .execute(&self.pool)
            .await
            .expect("Failed to delete user");
    }
}

/// Fresh in-memory database with migrations applied.
///
/// A single connection that never expires: each in-memory SQLite connection
/// is its own database.
pub async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}
