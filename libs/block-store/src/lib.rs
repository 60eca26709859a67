pub mod models;
pub mod schema;

use chrono::Utc;
use sqlx::{sqlite::SqliteConnectOptions, SqlitePool};
use std::str::FromStr;
use thiserror::Error;
use tracing::info;

pub use models::BlockSample;
pub use schema::{initialize_schema, SCHEMA_VERSION};

#[derive(Error, Debug)]
pub enum StoreError {
    /// The store holds no rows yet.
    #[error("No data found")]
    NotFound,

    /// The store could not be reached or the query failed.
    #[error("Store unavailable: {0}")]
    Unavailable(#[from] sqlx::Error),

    #[error("Schema error: {0}")]
    SchemaError(#[from] schema::SchemaError),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Handle to the block data store.
///
/// Owns the connection pool; callers pass the handle around explicitly,
/// there is no process-wide singleton. Rows are append-only: samples are
/// inserted, never updated or deleted.
pub struct BlockStore {
    pool: SqlitePool,
}

impl BlockStore {
    /// Open (or create) the store at `db_path` and initialize the schema.
    pub async fn open(db_path: &str) -> Result<Self> {
        info!("Connecting to block store: {}", db_path);

        let options = SqliteConnectOptions::from_str(db_path)?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

        let pool = SqlitePool::connect_with(options).await?;

        schema::initialize_schema(&pool).await?;

        info!("Block store initialized");

        Ok(Self { pool })
    }

    /// Append one sample, stamping the timestamp at insert time.
    ///
    /// Returns the insertion id of the new row.
    pub async fn insert_sample(&self, block_height: i64, price: f64) -> Result<i64> {
        let result = sqlx::query(
            "INSERT INTO block_data (block_height, price, timestamp) VALUES (?, ?, ?)",
        )
        .bind(block_height)
        .bind(price)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Most recent row by insertion id, not by timestamp value.
    pub async fn latest_sample(&self) -> Result<BlockSample> {
        let sample = sqlx::query_as::<_, BlockSample>(
            "SELECT * FROM block_data ORDER BY id DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)?;

        Ok(sample)
    }

    /// All rows ascending by insertion id (oldest first, chart order).
    pub async fn all_samples(&self) -> Result<Vec<BlockSample>> {
        let samples =
            sqlx::query_as::<_, BlockSample>("SELECT * FROM block_data ORDER BY id ASC")
                .fetch_all(&self.pool)
                .await?;

        Ok(samples)
    }

    /// Total number of stored samples.
    pub async fn sample_count(&self) -> Result<i64> {
        let (count,) = sqlx::query_as::<_, (i64,)>("SELECT COUNT(*) FROM block_data")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Get database pool reference
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the store connection
    pub async fn close(self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn create_test_store() -> BlockStore {
        BlockStore::open(":memory:").await.unwrap()
    }

    #[tokio::test]
    async fn test_latest_on_empty_store_is_not_found() {
        let store = create_test_store().await;

        let err = store.latest_sample().await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
        assert_eq!(err.to_string(), "No data found");
    }

    #[tokio::test]
    async fn test_latest_follows_insertion_order() {
        let store = create_test_store().await;

        store.insert_sample(900000, 60000.0).await.unwrap();
        store.insert_sample(900001, 60100.0).await.unwrap();

        let latest = store.latest_sample().await.unwrap();
        assert_eq!(latest.block_height, 900001);
        assert_eq!(latest.price, 60100.0);
    }

    #[tokio::test]
    async fn test_latest_ignores_timestamp_values() {
        let store = create_test_store().await;

        // Write rows whose timestamp strings sort against insertion order;
        // the latest row is still the one inserted last.
        sqlx::query("INSERT INTO block_data (block_height, price, timestamp) VALUES (?, ?, ?)")
            .bind(900005i64)
            .bind(61000.0f64)
            .bind("2099-01-01T00:00:00Z")
            .execute(store.pool())
            .await
            .unwrap();
        sqlx::query("INSERT INTO block_data (block_height, price, timestamp) VALUES (?, ?, ?)")
            .bind(900006i64)
            .bind(61050.0f64)
            .bind("2001-01-01T00:00:00Z")
            .execute(store.pool())
            .await
            .unwrap();

        let latest = store.latest_sample().await.unwrap();
        assert_eq!(latest.block_height, 900006);
    }

    #[tokio::test]
    async fn test_all_samples_ascending() {
        let store = create_test_store().await;

        for (height, price) in [(900000i64, 60000.0), (900001, 60100.0), (900002, 60200.0)] {
            store.insert_sample(height, price).await.unwrap();
        }

        let all = store.all_samples().await.unwrap();
        assert_eq!(all.len(), 3);
        let heights: Vec<i64> = all.iter().map(|s| s.block_height).collect();
        assert_eq!(heights, vec![900000, 900001, 900002]);
        assert!(all.windows(2).all(|w| w[0].id < w[1].id));
    }

    #[tokio::test]
    async fn test_insert_stamps_timestamp() {
        let store = create_test_store().await;

        let id = store.insert_sample(900000, 60000.0).await.unwrap();
        assert!(id > 0);

        let latest = store.latest_sample().await.unwrap();
        assert!(!latest.timestamp.is_empty());
        assert!(chrono::DateTime::parse_from_rfc3339(&latest.timestamp).is_ok());
    }

    #[tokio::test]
    async fn test_sample_count() {
        let store = create_test_store().await;
        assert_eq!(store.sample_count().await.unwrap(), 0);

        store.insert_sample(900000, 60000.0).await.unwrap();
        store.insert_sample(900001, 60100.0).await.unwrap();

        assert_eq!(store.sample_count().await.unwrap(), 2);
    }
}
