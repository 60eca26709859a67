//! HTTP client for the dashboard API.

use crate::aggregator::Sample;
use crate::error::{DashboardError, Result};
use crate::poller::LatestSource;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;

/// Row shape served by the API. The insertion id is not needed client-side.
#[derive(Debug, Deserialize)]
struct ApiRow {
    block_height: u64,
    price: f64,
    timestamp: String,
}

impl From<ApiRow> for Sample {
    fn from(row: ApiRow) -> Self {
        Sample {
            block_height: row.block_height,
            price: row.price,
            timestamp: row.timestamp,
        }
    }
}

/// Client for the block API: one-shot history fetch plus the latest-sample
/// poll. No retries here; the poller's next tick is the retry.
pub struct DashboardApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl DashboardApiClient {
    pub fn new(base_url: impl Into<String>, request_timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| DashboardError::Unavailable(e.to_string()))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    /// GET /block-height: the single most-recent sample.
    pub async fn latest(&self) -> Result<Sample> {
        let url = format!("{}/block-height", self.base_url);
        let response = self.http.get(&url).send().await?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(DashboardError::NotFound),
            status if status.is_success() => {
                let row: ApiRow = response.json().await?;
                Ok(row.into())
            }
            status => Err(DashboardError::Unavailable(format!(
                "GET /block-height returned {}",
                status
            ))),
        }
    }

    /// GET /all-data: full history, oldest first.
    pub async fn history(&self) -> Result<Vec<Sample>> {
        let url = format!("{}/all-data", self.base_url);
        let response = self.http.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DashboardError::Unavailable(format!(
                "GET /all-data returned {}",
                status
            )));
        }

        let rows: Vec<ApiRow> = response.json().await?;
        Ok(rows.into_iter().map(Sample::from).collect())
    }
}

#[async_trait]
impl LatestSource for DashboardApiClient {
    async fn fetch_latest(&self) -> Result<Sample> {
        self.latest().await
    }
}
