//! Integration tests for the live feed client against a mock publisher.

use async_trait::async_trait;
use futures::SinkExt;
use livefeed::{FeedClient, FeedError, FixedDelay, FrameHandler, NoReconnect};
use parking_lot::Mutex;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_tungstenite::{accept_async, tungstenite::Message};

/// Mock publisher: accepts one connection, pushes the given frames, then
/// closes.
async fn spawn_publisher(frames: Vec<String>) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        if let Ok((stream, _)) = listener.accept().await {
            let mut ws = match accept_async(stream).await {
                Ok(ws) => ws,
                Err(_) => return,
            };
            for frame in frames {
                if ws.send(Message::Text(frame)).await.is_err() {
                    return;
                }
            }
            // Let the client drain before closing
            tokio::time::sleep(Duration::from_millis(200)).await;
            let _ = ws.send(Message::Close(None)).await;
        }
    });

    addr
}

/// Collects every delivered frame.
struct CollectingHandler {
    frames: Mutex<Vec<String>>,
}

impl CollectingHandler {
    fn new() -> Self {
        Self {
            frames: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl FrameHandler for CollectingHandler {
    async fn on_frame(&self, frame: &str) -> livefeed::Result<()> {
        self.frames.lock().push(frame.to_string());
        Ok(())
    }
}

#[tokio::test]
async fn delivers_frames_in_order() {
    let addr = spawn_publisher(vec![
        r#"{"block_height":900001,"price":60100.0}"#.to_string(),
        r#"{"block_height":900002,"price":61234.5}"#.to_string(),
    ])
    .await;

    let handler = Arc::new(CollectingHandler::new());
    let running = Arc::new(AtomicBool::new(true));
    let client = FeedClient::new(
        format!("ws://{}", addr),
        Arc::clone(&handler) as Arc<dyn FrameHandler>,
        Box::new(NoReconnect),
        Arc::clone(&running),
    );

    let result = tokio::time::timeout(Duration::from_secs(5), client.run())
        .await
        .expect("client did not finish");

    // Publisher closed and NoReconnect gives up immediately
    assert!(matches!(
        result,
        Err(FeedError::ReconnectExhausted { attempts: 0 })
    ));

    let frames = handler.frames.lock();
    assert_eq!(frames.len(), 2);
    assert!(frames[0].contains("900001"));
    assert!(frames[1].contains("900002"));
}

#[tokio::test]
async fn shutdown_flag_stops_the_client() {
    // Publisher that accepts and then stays silent
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        if let Ok((stream, _)) = listener.accept().await {
            if let Ok(mut ws) = accept_async(stream).await {
                // Hold the connection open until the client goes away
                while ws.send(Message::Ping(vec![])).await.is_ok() {
                    tokio::time::sleep(Duration::from_millis(100)).await;
                }
            }
        }
    });

    let handler = Arc::new(CollectingHandler::new());
    let running = Arc::new(AtomicBool::new(true));
    let client = FeedClient::new(
        format!("ws://{}", addr),
        handler as Arc<dyn FrameHandler>,
        Box::new(NoReconnect),
        Arc::clone(&running),
    );

    let task = tokio::spawn(client.run());
    tokio::time::sleep(Duration::from_millis(300)).await;

    running.store(false, Ordering::Release);

    let result = tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .expect("client ignored shutdown")
        .unwrap();
    assert!(result.is_ok());
}

#[tokio::test]
async fn bounded_reconnects_then_gives_up() {
    // Listener that drops every connection before the WebSocket handshake,
    // so each attempt counts as a connect failure.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let accepted = Arc::new(AtomicUsize::new(0));
    let accepted_srv = Arc::clone(&accepted);
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((stream, _)) => {
                    accepted_srv.fetch_add(1, Ordering::SeqCst);
                    drop(stream);
                }
                Err(_) => break,
            }
        }
    });

    let handler = Arc::new(CollectingHandler::new());
    let running = Arc::new(AtomicBool::new(true));
    let client = FeedClient::new(
        format!("ws://{}", addr),
        handler as Arc<dyn FrameHandler>,
        Box::new(FixedDelay::new(Duration::from_millis(10), Some(2))),
        Arc::clone(&running),
    );

    let result = tokio::time::timeout(Duration::from_secs(5), client.run())
        .await
        .expect("client did not finish");

    assert!(matches!(
        result,
        Err(FeedError::ReconnectExhausted { attempts: 2 })
    ));
    // Initial attempt plus two retries
    assert_eq!(accepted.load(Ordering::SeqCst), 3);
}
