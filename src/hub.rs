//! # Broadcast hub - subscriber registry and fan-out.
//!
//! [`Hub`] owns the registry mapping subscriber keys to the sending half of
//! each delivery channel. Every operation takes the single hub mutex, so
//! attach, publish, detach and shutdown are atomic with respect to each
//! other.
//!
//! ## Architecture
//! ```text
//! attach() ──────► insert (key, tx) ──► returns Subscription { key, rx }
//! publish(ev) ───► for each tx: tx.send(ev).await   (lock held throughout)
//! detach(key) ───► remove (key, tx), drop tx ──► rx observes end-of-stream
//! shutdown() ────► stopped = true, drop every tx, clear registry
//! ```
//!
//! ## Rules
//! - The registry and the `stopped` flag are only touched under the mutex.
//! - A delivery channel is closed exactly once: by detach, by shutdown, or
//!   by pruning after its receiver was dropped. Closed channels never
//!   re-enter the registry.
//! - Once stopped, the hub stays stopped: publish becomes a no-op, detach
//!   returns [`HubError::Stopped`], attach hands out channels that are
//!   already at end-of-stream.

use std::collections::HashMap;

use tokio::sync::{Mutex, mpsc};
use tracing::{debug, warn};

use crate::config::HubConfig;
use crate::error::HubError;
use crate::subscription::Subscription;

/// Reserved event payload that triggers shutdown-broadcast.
///
/// Publishing this string is equivalent to calling [`Hub::shutdown`]. It is
/// kept for compatibility with callers that drive the hub through a single
/// string-typed publish pipeline; new code should call `shutdown()` and keep
/// the data plane free of control values. Callers are responsible for
/// ensuring legitimate payloads never collide with it.
pub const SHUTDOWN_EVENT: &str = "disconnect";

/// Registry state behind the hub mutex.
struct Inner {
    /// Subscriber key → sending half of that subscriber's channel.
    channels: HashMap<String, mpsc::Sender<String>>,
    /// Terminal flag; set once by shutdown, never cleared.
    stopped: bool,
}

/// In-process broadcast hub.
///
/// Cheap to share behind an `Arc`; all methods take `&self` and are safe
/// under arbitrary concurrent invocation.
///
/// ### Properties
/// - **Atomic broadcast**: each publish delivers to exactly the subscribers
///   registered at the moment it acquires the lock.
/// - **Per-subscriber FIFO**: one subscriber sees events in lock-acquisition
///   order. No ordering across subscribers.
/// - **Blocking delivery**: a publish awaits each subscriber in turn; a slow
///   consumer stalls the rest of that broadcast.
pub struct Hub {
    inner: Mutex<Inner>,
    capacity: usize,
}

impl Hub {
    /// Creates a hub with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(HubConfig::default())
    }

    /// Creates a hub with explicit configuration.
    #[must_use]
    pub fn with_config(config: HubConfig) -> Self {
        Self {
            inner: Mutex::new(Inner {
                channels: HashMap::new(),
                stopped: false,
            }),
            capacity: config.capacity(),
        }
    }

    /// Registers a new subscriber and returns its subscription.
    ///
    /// The key is a fresh random 128-bit token rendered as hex; it is never
    /// reused after detach. Always succeeds. On a stopped hub the returned
    /// subscription is already at end-of-stream, so its consumer loop exits
    /// on the first `recv()`.
    pub async fn attach(&self) -> Subscription {
        let key = fresh_key();
        let (tx, rx) = mpsc::channel::<String>(self.capacity);

        let mut inner = self.inner.lock().await;
        if inner.stopped {
            debug!(key = %key, "attach on stopped hub, handing out closed channel");
            drop(tx);
            return Subscription::new(key, rx);
        }

        inner.channels.insert(key.clone(), tx);
        debug!(key = %key, subscribers = inner.channels.len(), "subscriber attached");
        Subscription::new(key, rx)
    }

    /// Broadcasts `event` to every registered subscriber.
    ///
    /// Holds the hub lock for the entire call and delivers by awaited send,
    /// one subscriber at a time, in unspecified order. Publishing
    /// [`SHUTDOWN_EVENT`] is the compatibility path into
    /// [`Hub::shutdown`]. On a stopped hub this is a no-op.
    ///
    /// Subscribers whose receiver has been dropped are pruned from the
    /// registry here; they would otherwise never accept another event.
    pub async fn publish(&self, event: &str) {
        let mut inner = self.inner.lock().await;
        if inner.stopped {
            debug!(event, "publish on stopped hub ignored");
            return;
        }

        if event == SHUTDOWN_EVENT {
            shutdown_locked(&mut inner);
            return;
        }

        let mut dead: Vec<String> = Vec::new();
        for (key, tx) in &inner.channels {
            if tx.send(event.to_string()).await.is_err() {
                // Receiver dropped without detach; prune below.
                dead.push(key.clone());
            }
        }

        for key in dead {
            inner.channels.remove(&key);
            warn!(key = %key, "pruned subscriber with dropped receiver");
        }
    }

    /// Unsubscribes `key` and closes its delivery channel.
    ///
    /// The subscriber's pending events stay readable; after they drain, its
    /// `recv()` observes end-of-stream. Detach is single-attempt: a second
    /// call with the same key returns [`HubError::NotFound`], as does a key
    /// that was never attached. After shutdown every detach returns
    /// [`HubError::Stopped`].
    pub async fn detach(&self, key: &str) -> Result<(), HubError> {
        let mut inner = self.inner.lock().await;
        if inner.stopped {
            return Err(HubError::Stopped);
        }

        match inner.channels.remove(key) {
            Some(tx) => {
                drop(tx);
                debug!(key = %key, subscribers = inner.channels.len(), "subscriber detached");
                Ok(())
            }
            None => Err(HubError::NotFound {
                key: key.to_string(),
            }),
        }
    }

    /// Shuts the hub down: closes every delivery channel and stops for good.
    ///
    /// Every live consumer loop observes end-of-stream and can exit.
    /// Idempotent; a second call is a no-op. Prefer this over publishing
    /// [`SHUTDOWN_EVENT`], which exists for string-pipeline compatibility.
    pub async fn shutdown(&self) {
        let mut inner = self.inner.lock().await;
        if inner.stopped {
            debug!("shutdown on stopped hub ignored");
            return;
        }
        shutdown_locked(&mut inner);
    }

    /// Number of currently attached subscribers.
    pub async fn len(&self) -> usize {
        self.inner.lock().await.channels.len()
    }

    /// True if no subscribers are attached.
    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.channels.is_empty()
    }

    /// True once [`shutdown`](Hub::shutdown) has run.
    pub async fn is_stopped(&self) -> bool {
        self.inner.lock().await.stopped
    }
}

impl Default for Hub {
    fn default() -> Self {
        Self::new()
    }
}

/// Closes all channels and marks the hub stopped. Caller holds the lock.
fn shutdown_locked(inner: &mut Inner) {
    inner.stopped = true;
    let closed = inner.channels.len();
    inner.channels.clear();
    debug!(closed, "hub shut down, all channels closed");
}

/// Generates a fresh subscriber key: a random 128-bit token as 32 hex chars.
fn fresh_key() -> String {
    format!("{:032x}", rand::random::<u128>())
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::time::Duration;

    use tokio::time::timeout;

    use super::*;

    const TICK: Duration = Duration::from_millis(200);

    #[tokio::test]
    async fn test_attach_keys_are_unique() {
        let hub = Hub::new();
        let mut keys = HashSet::new();
        for _ in 0..64 {
            let sub = hub.attach().await;
            assert!(keys.insert(sub.key().to_string()), "duplicate key handed out");
        }
        assert_eq!(hub.len().await, 64);
    }

    #[tokio::test]
    async fn test_publish_reaches_attached_subscriber() {
        let hub = Hub::new();
        let mut sub = hub.attach().await;

        hub.publish("event 0").await;
        assert_eq!(sub.recv().await.as_deref(), Some("event 0"));
    }

    #[tokio::test]
    async fn test_detach_unknown_key_returns_not_found() {
        let hub = Hub::new();
        let err = hub.detach("no-such-key").await.unwrap_err();
        assert_eq!(
            err,
            HubError::NotFound {
                key: "no-such-key".into()
            }
        );
        assert_eq!(err.as_label(), "hub_not_found");
    }

    #[tokio::test]
    async fn test_detach_closes_channel_and_is_single_attempt() {
        let hub = Hub::new();
        let mut left = hub.attach().await;
        let mut right = hub.attach().await;
        let left_key = left.key().to_string();

        hub.detach(&left_key).await.unwrap();
        assert_eq!(left.recv().await, None);

        // Second detach of the same key: entry is gone.
        assert!(matches!(
            hub.detach(&left_key).await,
            Err(HubError::NotFound { .. })
        ));

        // The other subscriber is untouched.
        hub.publish("still here").await;
        assert_eq!(right.recv().await.as_deref(), Some("still here"));
    }

    #[tokio::test]
    async fn test_detach_delivers_buffered_events_before_close() {
        let hub = Hub::new();
        let mut sub = hub.attach().await;
        let key = sub.key().to_string();

        hub.publish("buffered").await;
        hub.detach(&key).await.unwrap();

        assert_eq!(sub.recv().await.as_deref(), Some("buffered"));
        assert_eq!(sub.recv().await, None);
    }

    #[tokio::test]
    async fn test_shutdown_closes_all_channels() {
        let hub = Hub::new();
        let mut a = hub.attach().await;
        let mut b = hub.attach().await;

        hub.shutdown().await;
        assert!(hub.is_stopped().await);
        assert!(hub.is_empty().await);
        assert_eq!(a.recv().await, None);
        assert_eq!(b.recv().await, None);
    }

    #[tokio::test]
    async fn test_shutdown_twice_is_noop() {
        let hub = Hub::new();
        let _sub = hub.attach().await;
        hub.shutdown().await;
        hub.shutdown().await;
        assert!(hub.is_stopped().await);
    }

    #[tokio::test]
    async fn test_sentinel_event_triggers_shutdown() {
        let hub = Hub::new();
        let mut sub = hub.attach().await;

        hub.publish(SHUTDOWN_EVENT).await;
        assert!(hub.is_stopped().await);
        assert_eq!(sub.recv().await, None);
    }

    #[tokio::test]
    async fn test_stopped_hub_rejects_or_ignores_calls() {
        let hub = Hub::new();
        let sub = hub.attach().await;
        let key = sub.key().to_string();
        hub.shutdown().await;

        // Publish is a no-op, not a hang or a panic.
        hub.publish("into the void").await;
        hub.publish(SHUTDOWN_EVENT).await;

        assert_eq!(hub.detach(&key).await.unwrap_err(), HubError::Stopped);

        // Late attach observes end-of-stream immediately.
        let mut late = hub.attach().await;
        assert_eq!(late.recv().await, None);
        assert!(hub.is_empty().await);
    }

    #[tokio::test]
    async fn test_dropped_receiver_is_pruned_on_publish() {
        let hub = Hub::new();
        let gone = hub.attach().await;
        let mut kept = hub.attach().await;
        drop(gone);

        // Must neither block nor fail; the dead entry goes away.
        timeout(TICK, hub.publish("event 0")).await.unwrap();
        assert_eq!(hub.len().await, 1);
        assert_eq!(kept.recv().await.as_deref(), Some("event 0"));
    }

    /// End-to-end: three subscribers, a detach mid-stream, a late event and
    /// a sentinel shutdown, with one consumer task per subscription.
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_broadcast_detach_shutdown_scenario() {
        let hub = Arc::new(Hub::new());

        let mut keys = Vec::new();
        let mut consumers = Vec::new();
        for _ in 0..3 {
            let mut sub = hub.attach().await;
            keys.push(sub.key().to_string());
            consumers.push(tokio::spawn(async move {
                let mut seen = Vec::new();
                while let Some(event) = sub.recv().await {
                    seen.push(event);
                }
                seen
            }));
        }

        for i in 0..3 {
            hub.publish(&format!("event {i}")).await;
        }
        hub.detach(&keys[1]).await.unwrap();
        hub.publish("event after disconnect").await;
        hub.publish(SHUTDOWN_EVENT).await;

        let mut collected = Vec::new();
        for consumer in consumers {
            collected.push(timeout(TICK, consumer).await.unwrap().unwrap());
        }

        assert_eq!(
            collected[0],
            vec!["event 0", "event 1", "event 2", "event after disconnect"]
        );
        assert_eq!(collected[1], vec!["event 0", "event 1", "event 2"]);
        assert_eq!(collected[2], collected[0]);
    }

    /// Attaches race a stream of publishes; every subscriber must still see
    /// a well-formed, strictly ordered slice of the stream.
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_attach_during_publish() {
        let hub = Arc::new(Hub::new());

        let publisher = {
            let hub = Arc::clone(&hub);
            tokio::spawn(async move {
                for i in 0..50 {
                    hub.publish(&format!("event {i}")).await;
                }
                hub.shutdown().await;
            })
        };

        let mut consumers = Vec::new();
        for _ in 0..8 {
            let sub = hub.attach().await;
            consumers.push(tokio::spawn(async move {
                let mut sub = sub;
                let mut indices = Vec::new();
                while let Some(event) = sub.recv().await {
                    let i: u32 = event
                        .strip_prefix("event ")
                        .expect("malformed event payload")
                        .parse()
                        .expect("malformed event index");
                    indices.push(i);
                }
                indices
            }));
            tokio::task::yield_now().await;
        }

        publisher.await.unwrap();
        for consumer in consumers {
            let indices = timeout(TICK, consumer).await.unwrap().unwrap();
            assert!(
                indices.windows(2).all(|w| w[0] < w[1]),
                "per-subscriber order violated: {indices:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_configured_capacity_gives_publisher_slack() {
        let hub = Hub::with_config(HubConfig {
            delivery_capacity: 4,
        });
        let mut sub = hub.attach().await;

        // Four publishes fit the buffer without a consumer draining.
        for i in 0..4 {
            timeout(TICK, hub.publish(&format!("event {i}")))
                .await
                .unwrap();
        }
        for i in 0..4 {
            assert_eq!(sub.recv().await.as_deref(), Some(format!("event {i}").as_str()));
        }
    }
}
