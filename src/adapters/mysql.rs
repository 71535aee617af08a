use crate::config::DatabaseConfig;
use crate::domain::model::CleanRecord;
use crate::domain::ports::ContactStore;
use crate::utils::error::Result;
use async_trait::async_trait;
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use sqlx::{MySql, QueryBuilder, Row};
use std::time::Duration;
use tracing::{debug, error, info};

/// Five binds per row keeps each statement well under MySQL's 65535 placeholder cap.
const ROWS_PER_STATEMENT: usize = 1000;

/// Contact table on a MySQL pool.
#[derive(Debug, Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
    table: String,
}

impl MySqlStore {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let url = config.connection_url()?;
        let pool = MySqlPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect(url.as_str())
            .await
            .map_err(|e| {
                error!("Failed to connect to database: {}", e);
                e
            })?;

        Ok(Self::new(pool, config.table.clone()))
    }

    /// `table` must already be a validated SQL identifier.
    pub fn new(pool: MySqlPool, table: String) -> Self {
        Self { pool, table }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub async fn ensure_schema(&self) -> Result<()> {
        let sql = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                id INT AUTO_INCREMENT PRIMARY KEY,
                first_name VARCHAR(20) NOT NULL,
                second_name VARCHAR(20) NOT NULL,
                email VARCHAR(254) NOT NULL,
                phone VARCHAR(10) NOT NULL,
                eir_code CHAR(6) NOT NULL,
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            )
            "#,
            self.table
        );
        sqlx::query(&sql).execute(&self.pool).await?;
        info!("Database schema: OK (table `{}`)", self.table);
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl ContactStore for MySqlStore {
    async fn insert_one(&self, record: &CleanRecord) -> Result<()> {
        let sql = format!(
            "INSERT INTO {} (first_name, second_name, email, phone, eir_code) VALUES (?, ?, ?, ?, ?)",
            self.table
        );
        sqlx::query(&sql)
            .bind(record.first_name())
            .bind(record.second_name())
            .bind(record.email())
            .bind(record.phone())
            .bind(record.eir_code())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Failed to insert contact: {}", e);
                e
            })?;
        Ok(())
    }

    async fn insert_many(&self, records: &[CleanRecord]) -> Result<u64> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;

        for chunk in records.chunks(ROWS_PER_STATEMENT) {
            let mut builder: QueryBuilder<MySql> = QueryBuilder::new(format!(
                "INSERT INTO {} (first_name, second_name, email, phone, eir_code) ",
                self.table
            ));
            builder.push_values(chunk, |mut row, record| {
                row.push_bind(record.first_name().to_owned())
                    .push_bind(record.second_name().to_owned())
                    .push_bind(record.email().to_owned())
                    .push_bind(record.phone().to_owned())
                    .push_bind(record.eir_code().to_owned());
            });

            let done = builder.build().execute(&mut *tx).await.map_err(|e| {
                error!("Batch insert failed, rolling back: {}", e);
                e
            })?;
            inserted += done.rows_affected();
            debug!("Inserted chunk of {} rows", chunk.len());
        }

        tx.commit().await?;
        Ok(inserted)
    }

    async fn check_connection(&self) -> Result<bool> {
        let row = sqlx::query("SELECT 1 AS ok")
            .fetch_one(&self.pool)
            .await?;
        let ok: i64 = row.try_get("ok")?;
        Ok(ok == 1)
    }
}
