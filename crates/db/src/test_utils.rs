//! Test utilities for database operations.
//!
//! Provides helpers for setting up and tearing down test databases.

use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, DbErr,
    Statement,
};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use crate::migrations::Migrator;

/// Test database configuration.
#[derive(Debug, Clone)]
pub struct TestDbConfig {
    /// Database host.
    pub host: String,
    /// Database port.
    pub port: u16,
    /// Database username.
    pub username: String,
    /// Database password.
    pub password: String,
    /// Database name.
    pub database: String,
}

impl Default for TestDbConfig {
    fn default() -> Self {
        Self {
            host: std::env::var("TEST_DB_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: std::env::var("TEST_DB_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5433),
            username: std::env::var("TEST_DB_USER").unwrap_or_else(|_| "yatube_test".to_string()),
            password: std::env::var("TEST_DB_PASSWORD")
                .unwrap_or_else(|_| "yatube_test".to_string()),
            database: std::env::var("TEST_DB_NAME").unwrap_or_else(|_| "yatube_test".to_string()),
        }
    }
}

impl TestDbConfig {
    /// Get the database URL.
    #[must_use]
    pub fn database_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database
        )
    }
}

/// A test database context that manages the lifecycle of a test database.
pub struct TestDatabase {
    /// Database connection.
    pub conn: DatabaseConnection,
    backend: DatabaseBackend,
}

impl TestDatabase {
    /// Connect to the `PostgreSQL` test database and run migrations.
    pub async fn new() -> Result<Self, DbErr> {
        Self::with_config(TestDbConfig::default()).await
    }

    /// Connect to a `PostgreSQL` test database with custom configuration.
    pub async fn with_config(config: TestDbConfig) -> Result<Self, DbErr> {
        let conn = Database::connect(&config.database_url()).await?;
        Migrator::up(&conn, None).await?;

        info!(database = %config.database, "Connected to test database");

        Ok(Self {
            conn,
            backend: DatabaseBackend::Postgres,
        })
    }

    /// Create a private, migrated in-memory `SQLite` database.
    ///
    /// The pool is pinned to a single connection because every `SQLite`
    /// in-memory connection owns a separate database.
    pub async fn sqlite() -> Result<Self, DbErr> {
        let mut opt = ConnectOptions::new("sqlite::memory:");
        opt.max_connections(1)
            .min_connections(1)
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;
        conn.execute(Statement::from_string(
            DatabaseBackend::Sqlite,
            "PRAGMA foreign_keys = ON".to_string(),
        ))
        .await?;
        Migrator::up(&conn, None).await?;

        Ok(Self {
            conn,
            backend: DatabaseBackend::Sqlite,
        })
    }

    /// Get the database connection.
    #[must_use]
    pub const fn connection(&self) -> &DatabaseConnection {
        &self.conn
    }

    /// Clean up all data in the test database.
    pub async fn cleanup(&self) -> Result<(), DbErr> {
        // Children first so foreign keys never block the delete.
        for table in ["follow", "comment", "post", "group", "user"] {
            let sql = match self.backend {
                DatabaseBackend::Postgres => format!("TRUNCATE TABLE \"{table}\" CASCADE"),
                _ => format!("DELETE FROM \"{table}\""),
            };
            self.conn
                .execute(Statement::from_string(self.backend, sql))
                .await?;
        }

        info!("Cleaned up test database");
        Ok(())
    }
}
