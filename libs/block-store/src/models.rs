//! Row models for the block data store

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One stored observation of the chain tip: block height, price, and the
/// timestamp assigned when the row was written. `id` is the insertion id
/// and defines store order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct BlockSample {
    pub id: i64,
    pub block_height: i64,
    pub price: f64,
    pub timestamp: String,
}
