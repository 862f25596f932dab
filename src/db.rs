use std::time::Duration;

use anyhow::Context;
use rust_decimal::Decimal;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};

use crate::config::DatabaseConfig;
use crate::error::ApiError;

/// A generated QR code as persisted in the `qr_code` table.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct QrRecord {
    pub id: i64,
    pub promptpay_id: String,
    pub amount: Decimal,
    pub image_path: String,
}

/// Record store over a PostgreSQL connection pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect eagerly. Used at startup, where a dead database is fatal.
    pub async fn connect(config: &DatabaseConfig) -> anyhow::Result<Self> {
        log::info!(
            "Connecting to PostgreSQL at {}:{}/{}",
            config.host,
            config.port,
            config.name
        );

        let pool = pool_options(config)
            .connect_with(connect_options(config))
            .await
            .with_context(|| {
                format!(
                    "connecting to PostgreSQL at {}:{}/{}",
                    config.host, config.port, config.name
                )
            })?;

        log::info!("PostgreSQL connection pool established");

        Ok(Self { pool })
    }

    /// Build the pool without touching the server. Connections are opened
    /// on first use, so callers that never hit the store need no database.
    pub fn connect_lazy(config: &DatabaseConfig) -> Self {
        let pool = pool_options(config).connect_lazy_with(connect_options(config));
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn health_check(&self) -> anyhow::Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .context("database health check")?;
        Ok(())
    }

    pub async fn run_migrations(&self) -> anyhow::Result<()> {
        log::info!("Running database migrations");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("running database migrations")?;
        log::info!("Database migrations completed");
        Ok(())
    }

    /// Insert a record for an already-written image, returning the stored row.
    pub async fn insert_record(
        &self,
        promptpay_id: &str,
        amount: Decimal,
        image_path: &str,
    ) -> Result<QrRecord, ApiError> {
        let record = sqlx::query_as::<_, QrRecord>(
            r#"
            INSERT INTO qr_code (promptpay_id, amount, image_path)
            VALUES ($1, $2, $3)
            RETURNING id, promptpay_id, amount, image_path
            "#,
        )
        .bind(promptpay_id)
        .bind(amount)
        .bind(image_path)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| ApiError::Storage(anyhow::anyhow!("inserting qr_code row: {}", e)))?;

        log::debug!("Inserted qr_code record {}", record.id);

        Ok(record)
    }

    /// Every generated code, newest first.
    pub async fn list_records(&self) -> Result<Vec<QrRecord>, ApiError> {
        sqlx::query_as::<_, QrRecord>(
            r#"
            SELECT id, promptpay_id, amount, image_path
            FROM qr_code
            ORDER BY id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ApiError::Storage(anyhow::anyhow!("listing qr_code rows: {}", e)))
    }
}

fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(30))
        .idle_timeout(Duration::from_secs(600))
}

fn connect_options(config: &DatabaseConfig) -> PgConnectOptions {
    let mut options = PgConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .database(&config.name)
        .username(&config.user);

    if !config.password.is_empty() {
        options = options.password(&config.password);
    }

    options
}
