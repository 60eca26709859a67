use sqlx::SqlitePool;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

pub type Result<T> = std::result::Result<T, SchemaError>;

/// Database schema version
pub const SCHEMA_VERSION: i32 = 1;

/// Initialize database schema
///
/// Production rows are written by the external ingestion pipeline; this
/// bootstrap exists so local runs and the test suite work against a fresh
/// file without a separate migration step.
pub async fn initialize_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS block_data (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            block_height INTEGER NOT NULL,
            price REAL NOT NULL,
            timestamp TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Latest-row lookups scan by insertion id; height queries come from tests
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_block_data_height ON block_data(block_height)")
        .execute(pool)
        .await?;

    Ok(())
}
