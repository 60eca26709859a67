use crate::error::{FeedError, Result};
use crate::reconnect::ReconnectPolicy;
use async_trait::async_trait;
use futures::StreamExt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, warn};

/// Receives each text frame delivered by the publisher.
///
/// Runs on the feed task; an `Err` drops that one frame (the client logs it
/// and keeps reading), it never tears down the connection.
#[async_trait]
pub trait FrameHandler: Send + Sync {
    async fn on_frame(&self, frame: &str) -> Result<()>;
}

/// Persistent subscription to the live feed publisher.
///
/// Opens one WebSocket connection, forwards text frames to the handler, and
/// on connection loss logs the drop and consults the reconnect policy. The
/// shared `running` flag is the teardown signal: clearing it closes the
/// connection and ends `run`.
pub struct FeedClient {
    url: String,
    handler: Arc<dyn FrameHandler>,
    policy: Box<dyn ReconnectPolicy>,
    running: Arc<AtomicBool>,
    frames: Arc<AtomicU64>,
}

impl FeedClient {
    pub fn new(
        url: impl Into<String>,
        handler: Arc<dyn FrameHandler>,
        policy: Box<dyn ReconnectPolicy>,
        running: Arc<AtomicBool>,
    ) -> Self {
        Self {
            url: url.into(),
            handler,
            policy,
            running,
            frames: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Counter of frames delivered to the handler so far.
    pub fn frame_counter(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.frames)
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Run the subscription until shutdown or until the reconnect policy
    /// gives up.
    pub async fn run(self) -> Result<()> {
        let mut attempt = 0usize;

        loop {
            if !self.is_running() {
                return Ok(());
            }

            match connect_async(self.url.as_str()).await {
                Ok((ws, _)) => {
                    info!("Live feed connected: {}", self.url);
                    attempt = 0;
                    self.pump(ws).await;
                }
                Err(e) => {
                    warn!("Live feed connect failed: {}", e);
                }
            }

            if !self.is_running() {
                return Ok(());
            }

            match self.policy.delay_before(attempt) {
                Some(delay) => {
                    warn!(
                        "Live feed reconnecting in {:?} (attempt {})",
                        delay,
                        attempt + 1
                    );
                    self.interruptible_sleep(delay).await;
                    attempt += 1;
                }
                None => {
                    warn!("Live feed down and reconnect policy gave up");
                    return Err(FeedError::ReconnectExhausted { attempts: attempt });
                }
            }
        }
    }

    /// Read frames until the connection drops or shutdown is requested.
    async fn pump(
        &self,
        mut ws: tokio_tungstenite::WebSocketStream<
            tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
        >,
    ) {
        loop {
            if !self.is_running() {
                debug!("Shutdown requested, closing live feed connection");
                let _ = ws.close(None).await;
                return;
            }

            tokio::select! {
                msg = ws.next() => match msg {
                    Some(Ok(Message::Text(text))) => {
                        // Frames arriving after teardown are discarded
                        if !self.is_running() {
                            return;
                        }
                        self.frames.fetch_add(1, Ordering::Relaxed);
                        if let Err(e) = self.handler.on_frame(&text).await {
                            warn!("Dropping live frame: {}", e);
                        }
                    }
                    Some(Ok(Message::Close(_))) => {
                        warn!("Live feed connection closed by publisher");
                        return;
                    }
                    Some(Ok(_)) => {
                        // Binary/ping/pong frames carry no samples
                    }
                    Some(Err(e)) => {
                        warn!("Live feed connection lost: {}", e);
                        return;
                    }
                    None => {
                        warn!("Live feed stream ended");
                        return;
                    }
                },
                // Wake periodically to notice the shutdown flag
                _ = sleep(Duration::from_millis(200)) => {}
            }
        }
    }

    /// Sleep for `duration`, waking early on shutdown.
    async fn interruptible_sleep(&self, duration: Duration) {
        let check_interval = Duration::from_millis(50);
        let mut elapsed = Duration::ZERO;

        while elapsed < duration && self.is_running() {
            sleep(check_interval).await;
            elapsed += check_interval;
        }
    }
}
