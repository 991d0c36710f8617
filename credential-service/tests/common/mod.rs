#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use auth::create_hasher;
use auth::HashParams;
use auth::TokenIssuer;
use credential_service::config::DatabaseConfig;
use credential_service::domain::credential::service::CredentialService;
use credential_service::domain::credential::service::PasswordPolicy;
use credential_service::domain::deadline::Deadline;
use credential_service::domain::migration::runner::Migrator;
use credential_service::inbound::http::router::create_router;
use credential_service::outbound::clock::SystemClock;
use credential_service::outbound::database;
use credential_service::outbound::repositories::SqliteAccountRepository;
use credential_service::outbound::repositories::SqliteRefreshTokenRepository;
use credential_service::outbound::schema::SqliteSchemaStore;
use credential_service::outbound::schema::MIGRATIONS;
use sqlx::SqlitePool;

pub const TEST_SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";
pub const TEST_ISSUER: &str = "credential-service-test";

/// Test application that spawns a real server
pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub db: TestDb,
    pub api_client: reqwest::Client,
    pub issuer: TokenIssuer,
}

/// Test database helper backed by a throwaway SQLite file
pub struct TestDb {
    pub pool: SqlitePool,
    pub path: PathBuf,
}

pub fn test_issuer() -> TokenIssuer {
    TokenIssuer::new(
        TEST_SECRET,
        TEST_ISSUER,
        chrono::Duration::minutes(15),
        chrono::Duration::days(7),
    )
}

/// Argon2id at the lowest cost the library accepts.
pub fn cheap_hash_params() -> HashParams {
    HashParams {
        iterations: 1,
        memory_kib: 1024,
        parallelism: 1,
        output_length: 32,
        salt_length: 16,
    }
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        let db = TestDb::new().await;

        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let hasher =
            create_hasher("argon2", &cheap_hash_params()).expect("Failed to create hasher");

        let credential_service = Arc::new(CredentialService::new(
            Arc::new(SqliteAccountRepository::new(db.pool.clone())),
            Arc::new(SqliteRefreshTokenRepository::new(db.pool.clone())),
            hasher,
            Arc::new(test_issuer()),
            PasswordPolicy {
                min_length: 12,
                max_length: 64,
            },
            Arc::new(SystemClock),
        ));

        let router = create_router(credential_service, Duration::from_secs(10));

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            port,
            db,
            api_client: reqwest::Client::new(),
            issuer: test_issuer(),
        }
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }
}

impl TestDb {
    /// Create a migrated database in a fresh temp file
    pub async fn new() -> Self {
        let db = Self::empty().await;

        Migrator::new(Arc::new(SqliteSchemaStore::new(db.pool.clone())), MIGRATIONS)
            .expect("Invalid migration list")
            .run(Deadline::none())
            .await
            .expect("Failed to run migrations");

        db
    }

    /// Create a database file with no schema
    pub async fn empty() -> Self {
        let path = std::env::temp_dir().join(format!(
            "test_credential_service_{}.db",
            uuid::Uuid::new_v4().simple()
        ));
        let pool = Self::connect(&path).await;

        Self { pool, path }
    }

    /// Open another pool on the same file.
    pub async fn second_pool(&self) -> SqlitePool {
        Self::connect(&self.path).await
    }

    async fn connect(path: &PathBuf) -> SqlitePool {
        database::connect(&DatabaseConfig {
            url: format!("sqlite://{}", path.display()),
            max_connections: 5,
            busy_timeout_ms: 5000,
        })
        .await
        .expect("Failed to open test database")
    }
}

impl Drop for TestDb {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let mut file = self.path.clone().into_os_string();
            file.push(suffix);
            let _ = std::fs::remove_file(file);
        }
    }
}
