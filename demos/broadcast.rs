//! Demo driver: three subscribers, a mid-stream detach, a shutdown.
//!
//! Run with:
//! ```text
//! RUST_LOG=debug cargo run --example broadcast
//! ```

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use eventhub::{Hub, SHUTDOWN_EVENT};

const NUM_SUBSCRIBERS: usize = 3;
const NUM_EVENTS: usize = 3;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let hub = Arc::new(Hub::new());

    // Attach subscribers and spawn one consumer task per subscription.
    let mut keys = Vec::new();
    let mut consumers = Vec::new();
    for i in 0..NUM_SUBSCRIBERS {
        let mut sub = hub.attach().await;
        keys.push(sub.key().to_string());
        consumers.push(tokio::spawn(async move {
            while let Some(event) = sub.recv().await {
                info!(subscriber = i, event = %event, "received");
            }
            info!(subscriber = i, "channel closed, consumer exiting");
        }));
    }

    // Publish a burst of events from a separate task.
    let publisher = {
        let hub = Arc::clone(&hub);
        tokio::spawn(async move {
            for i in 0..NUM_EVENTS {
                hub.publish(&format!("event {i}")).await;
            }
        })
    };

    // Emulate some work time.
    tokio::time::sleep(Duration::from_secs(2)).await;
    publisher.await.expect("publisher task panicked");

    // Drop one subscriber mid-stream, then show the rest still receive.
    hub.detach(&keys[1]).await.expect("detach failed");
    hub.publish("event after disconnect").await;

    // Sentinel shutdown: every consumer loop observes end-of-stream.
    hub.publish(SHUTDOWN_EVENT).await;
    for consumer in consumers {
        consumer.await.expect("consumer task panicked");
    }
    info!("shutdown");
}
