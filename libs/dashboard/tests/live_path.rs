//! End-to-end live path: mock publisher -> feed client -> aggregator.

use dashboard::{AggregatorSink, AggregatorState, Sample, SeriesAggregator};
use futures::SinkExt;
use livefeed::{FeedClient, FrameHandler, NoReconnect};
use parking_lot::Mutex;
use std::net::SocketAddr;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_tungstenite::{accept_async, tungstenite::Message};

async fn spawn_publisher(frames: Vec<String>) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        if let Ok((stream, _)) = listener.accept().await {
            if let Ok(mut ws) = accept_async(stream).await {
                for frame in frames {
                    if ws.send(Message::Text(frame)).await.is_err() {
                        return;
                    }
                }
                tokio::time::sleep(Duration::from_millis(200)).await;
                let _ = ws.send(Message::Close(None)).await;
            }
        }
    });

    addr
}

fn history() -> Vec<Sample> {
    vec![
        Sample {
            block_height: 900000,
            price: 60000.0,
            timestamp: "2024-09-29T20:00:00Z".to_string(),
        },
        Sample {
            block_height: 900001,
            price: 60100.0,
            timestamp: "2024-09-29T20:10:00Z".to_string(),
        },
    ]
}

#[tokio::test]
async fn live_frames_land_behind_the_loaded_history() {
    let addr = spawn_publisher(vec![
        r#"{"block_height":900002,"price":61234.5}"#.to_string(),
        r#"this frame is garbage"#.to_string(),
        r#"{"block_height":900003,"price":61300.0}"#.to_string(),
    ])
    .await;

    let aggregator = Arc::new(Mutex::new(SeriesAggregator::new(1000)));
    aggregator.lock().load_history(history());

    let sink = Arc::new(AggregatorSink::new(Arc::clone(&aggregator)));
    let running = Arc::new(AtomicBool::new(true));
    let client = FeedClient::new(
        format!("ws://{}", addr),
        sink as Arc<dyn FrameHandler>,
        Box::new(NoReconnect),
        Arc::clone(&running),
    );

    // Publisher closes after its frames; NoReconnect ends the run
    let _ = tokio::time::timeout(Duration::from_secs(5), client.run())
        .await
        .expect("feed client did not finish");

    let agg = aggregator.lock();
    assert_eq!(agg.state(), AggregatorState::Live);

    let snap = agg.snapshot();
    // 2 history points + 2 parsed frames; the garbage frame was dropped
    assert_eq!(snap.len(), 4);
    assert_eq!(snap.heights, vec![900000, 900001, 900002, 900003]);

    // Live timestamps are stamped at receipt, after the history ones
    let live_ts = &snap.timestamps[2];
    assert!(chrono::DateTime::parse_from_rfc3339(live_ts).is_ok());
    assert!(live_ts.as_str() > "2024-09-29T20:10:00Z");
}

#[tokio::test]
async fn single_live_frame_appends_with_fresh_timestamp() {
    let addr =
        spawn_publisher(vec![r#"{"block_height":900002,"price":61234.5}"#.to_string()]).await;

    let aggregator = Arc::new(Mutex::new(SeriesAggregator::new(1000)));
    let mut redraw = aggregator.lock().subscribe();

    let sink = Arc::new(AggregatorSink::new(Arc::clone(&aggregator)));
    let running = Arc::new(AtomicBool::new(true));
    let client = FeedClient::new(
        format!("ws://{}", addr),
        sink as Arc<dyn FrameHandler>,
        Box::new(NoReconnect),
        Arc::clone(&running),
    );

    let _ = tokio::time::timeout(Duration::from_secs(5), client.run())
        .await
        .expect("feed client did not finish");

    // The append signalled a redraw
    assert!(redraw.has_changed().unwrap());

    let agg = aggregator.lock();
    let snap = agg.snapshot();
    assert_eq!(*snap.heights.last().unwrap(), 900002);
    assert_eq!(*snap.prices.last().unwrap(), 61234.5);
    assert!(!snap.timestamps.last().unwrap().is_empty());
}
