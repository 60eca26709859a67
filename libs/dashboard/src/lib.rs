//! Dashboard core: the client state aggregator, the latest-sample poller,
//! the REST client, and the HTTP API over the block store.

pub mod aggregator;
pub mod api;
pub mod config;
pub mod error;
pub mod poller;
pub mod rest;
pub mod utils;

pub use aggregator::{AggregatorSink, AggregatorState, Sample, SeriesAggregator, SeriesSnapshot};
pub use config::{ConfigError, DashboardConfig};
pub use error::DashboardError;
pub use poller::{LatestDisplay, LatestPoller, LatestSource};
pub use rest::DashboardApiClient;
