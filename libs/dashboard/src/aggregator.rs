//! Client-side state for the chart: history loaded once, live frames
//! appended as they arrive.

use crate::error::{DashboardError, Result};
use chrono::Utc;
use livefeed::{FeedError, FrameHandler};
use parking_lot::Mutex;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// One observed (block height, price, timestamp) triple.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub block_height: u64,
    pub price: f64,
    pub timestamp: String,
}

/// `Loading` until the first successful bulk load, `Live` after. Live
/// frames are accepted in either state and never change the label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregatorState {
    Loading,
    Live,
}

/// Wire shape of a live frame. The timestamp is not part of the message;
/// it is stamped at receipt.
#[derive(Debug, Deserialize)]
struct LiveFrame {
    block_height: u64,
    price: f64,
}

/// Read-only copy of the three parallel series, in chart order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesSnapshot {
    pub heights: Vec<u64>,
    pub prices: Vec<f64>,
    pub timestamps: Vec<String>,
}

impl SeriesSnapshot {
    pub fn len(&self) -> usize {
        self.heights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heights.is_empty()
    }
}

/// In-memory series state behind the chart.
///
/// Holds three parallel vectors (heights, prices, timestamps); they always
/// have equal length, and index i in each refers to the same sample. Growth
/// is bounded by `max_points`: appends beyond the window drop the oldest
/// entries.
pub struct SeriesAggregator {
    state: AggregatorState,
    heights: Vec<u64>,
    prices: Vec<f64>,
    timestamps: Vec<String>,
    max_points: usize,
    redraw: watch::Sender<u64>,
    revision: u64,
}

impl SeriesAggregator {
    pub fn new(max_points: usize) -> Self {
        let (redraw, _) = watch::channel(0);
        Self {
            state: AggregatorState::Loading,
            heights: Vec::new(),
            prices: Vec::new(),
            timestamps: Vec::new(),
            max_points: max_points.max(1),
            redraw,
            revision: 0,
        }
    }

    pub fn state(&self) -> AggregatorState {
        self.state
    }

    pub fn len(&self) -> usize {
        self.heights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heights.is_empty()
    }

    /// Subscribe to redraw signals. The value is a revision counter bumped
    /// on every successful mutation.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.redraw.subscribe()
    }

    /// Replace the series with a freshly fetched history batch.
    ///
    /// Replace, not append: calling this twice without intervening pushes
    /// leaves the same content as a single call. Transitions
    /// `Loading -> Live` on first success; a failed fetch never reaches
    /// this method, so `Loading` persists until a batch arrives.
    pub fn load_history(&mut self, samples: Vec<Sample>) {
        self.heights.clear();
        self.prices.clear();
        self.timestamps.clear();

        // Keep the newest points when the batch exceeds the window
        let skip = samples.len().saturating_sub(self.max_points);
        for sample in samples.into_iter().skip(skip) {
            self.heights.push(sample.block_height);
            self.prices.push(sample.price);
            self.timestamps.push(sample.timestamp);
        }

        if self.state == AggregatorState::Loading {
            info!("History loaded: {} samples, going live", self.len());
            self.state = AggregatorState::Live;
        } else {
            debug!("History reloaded: {} samples", self.len());
        }
        self.signal_redraw();
    }

    /// Parse one live frame and append it.
    ///
    /// The timestamp is stamped here, at receipt. A malformed frame
    /// returns `ParseFailure` and mutates nothing; appended samples from
    /// earlier frames are unaffected.
    pub fn apply_frame(&mut self, raw: &str) -> Result<Sample> {
        let frame: LiveFrame = serde_json::from_str(raw)
            .map_err(|e| DashboardError::ParseFailure(e.to_string()))?;

        let sample = Sample {
            block_height: frame.block_height,
            price: frame.price,
            timestamp: Utc::now().to_rfc3339(),
        };

        self.heights.push(sample.block_height);
        self.prices.push(sample.price);
        self.timestamps.push(sample.timestamp.clone());
        self.trim_to_window();
        self.signal_redraw();

        Ok(sample)
    }

    /// Read-only snapshot of the three series for the renderer.
    pub fn snapshot(&self) -> SeriesSnapshot {
        SeriesSnapshot {
            heights: self.heights.clone(),
            prices: self.prices.clone(),
            timestamps: self.timestamps.clone(),
        }
    }

    fn trim_to_window(&mut self) {
        if self.heights.len() > self.max_points {
            let excess = self.heights.len() - self.max_points;
            self.heights.drain(..excess);
            self.prices.drain(..excess);
            self.timestamps.drain(..excess);
        }
    }

    fn signal_redraw(&mut self) {
        self.revision += 1;
        // send_replace never fails, even with no subscribed renderer
        self.redraw.send_replace(self.revision);
    }
}

/// Bridges the live feed into the aggregator: each text frame is parsed
/// and appended; malformed frames are dropped and reported.
pub struct AggregatorSink {
    aggregator: Arc<Mutex<SeriesAggregator>>,
}

impl AggregatorSink {
    pub fn new(aggregator: Arc<Mutex<SeriesAggregator>>) -> Self {
        Self { aggregator }
    }
}

#[async_trait::async_trait]
impl FrameHandler for AggregatorSink {
    async fn on_frame(&self, frame: &str) -> livefeed::Result<()> {
        match self.aggregator.lock().apply_frame(frame) {
            Ok(sample) => {
                debug!(
                    "Appended live sample: height {} price {}",
                    sample.block_height, sample.price
                );
                Ok(())
            }
            Err(e) => {
                warn!("Malformed live frame dropped: {}", e);
                Err(FeedError::Handler(e.to_string()))
            }
        }
    }
}
