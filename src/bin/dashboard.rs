use anyhow::Result;
use chainpulse::bin_common::{load_config_from_env, ConfigType};
use dashboard::utils::{init_tracing, Heartbeat, ShutdownManager};
use dashboard::{
    AggregatorSink, AggregatorState, DashboardApiClient, DashboardConfig, LatestDisplay,
    LatestPoller, SeriesAggregator,
};
use livefeed::{FeedClient, FrameHandler};
use parking_lot::Mutex;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let config_path = load_config_from_env(ConfigType::Dashboard);
    let config = DashboardConfig::load(&config_path)?;

    init_tracing(&config.log_level);
    config.log();

    let shutdown = ShutdownManager::new();
    shutdown.spawn_signal_handler();

    print_banner("Dashboard", config.poll.interval_secs);

    let aggregator = Arc::new(Mutex::new(SeriesAggregator::new(config.series.max_points)));
    let mut redraw = aggregator.lock().subscribe();

    let request_timeout = Duration::from_secs(config.poll.request_timeout_secs);
    let rest = DashboardApiClient::new(config.api.base_url(), request_timeout)?;

    // One-shot history load; on failure the chart stays in Loading and the
    // live feed still appends as samples arrive
    match rest.history().await {
        Ok(samples) => aggregator.lock().load_history(samples),
        Err(e) => error!("History load failed, staying in Loading: {}", e),
    }

    // Live feed subscription
    let sink = Arc::new(AggregatorSink::new(Arc::clone(&aggregator)));
    let feed = FeedClient::new(
        config.live_feed.ws_url.clone(),
        sink as Arc<dyn FrameHandler>,
        Box::new(config.live_feed.reconnect.policy()),
        shutdown.flag(),
    );
    let frame_counter = feed.frame_counter();
    let feed_task = tokio::spawn(feed.run());

    // Single-sample poll refresh
    let display = Arc::new(Mutex::new(LatestDisplay::default()));
    let poller = LatestPoller::new(
        DashboardApiClient::new(config.api.base_url(), request_timeout)?,
        Duration::from_secs(config.poll.interval_secs),
        Arc::clone(&display),
        shutdown.flag(),
    );
    let poll_task = tokio::spawn(poller.run());

    // Renderer: one log line per redraw, heartbeat when the feed is quiet
    let mut heartbeat = Heartbeat::new(300);
    let mut seen_frames = 0u64;
    while shutdown.is_running() {
        tokio::select! {
            changed = redraw.changed() => {
                if changed.is_ok() {
                    render(&aggregator, &display);
                }
            }
            _ = tokio::time::sleep(Duration::from_millis(250)) => {}
        }

        let frames = frame_counter.load(Ordering::Relaxed);
        if frames > seen_frames {
            seen_frames = frames;
            heartbeat.reset();
        } else if heartbeat.should_beat() {
            info!("Heartbeat: no live frames in the last 5 minutes");
            heartbeat.beat();
        }
    }

    if let Err(e) = feed_task.await? {
        error!("Live feed ended with error: {}", e);
    }
    poll_task.await?;

    print_shutdown("Dashboard");
    Ok(())
}

fn print_banner(name: &str, interval_secs: u64) {
    info!("");
    info!("========================================");
    info!("Starting {}", name);
    info!("Poll interval: {}s", interval_secs);
    info!("Press Ctrl+C to stop");
    info!("========================================");
    info!("");
}

fn print_shutdown(name: &str) {
    info!("");
    info!("========================================");
    info!("{} stopped gracefully", name);
    info!("========================================");
}

fn render(
    aggregator: &Arc<Mutex<SeriesAggregator>>,
    display: &Arc<Mutex<LatestDisplay>>,
) {
    let agg = aggregator.lock();
    if agg.state() == AggregatorState::Loading && agg.is_empty() {
        info!("Loading...");
        return;
    }

    let snap = agg.snapshot();
    if let Some(last) = snap.heights.last() {
        info!(
            "Chart: {} points, tip height {}, tip price {}",
            snap.len(),
            last,
            snap.prices.last().unwrap_or(&0.0)
        );
    }
    drop(agg);

    if let Some(sample) = display.lock().current() {
        info!(
            "Latest Block Height: {} ({})",
            sample.block_height, sample.timestamp
        );
    }
}
