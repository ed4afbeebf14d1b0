//! # Consumer-side subscription handle.
//!
//! [`Subscription`] is what [`Hub::attach`](crate::Hub::attach) hands back:
//! the subscriber's opaque key plus the receive-only half of its delivery
//! channel. The sending half stays inside the hub, so a consumer can drain
//! events but can neither inject them nor close the channel itself — closing
//! only ever happens under the hub lock, via detach or shutdown.

use tokio::sync::mpsc;

/// A live subscription to a [`Hub`](crate::Hub).
///
/// Drain it with [`recv`](Subscription::recv) until `None`, which signals
/// end-of-stream (the subscriber was detached or the hub shut down).
///
/// Dropping a `Subscription` without detaching is allowed; the hub prunes
/// the dead registry entry on the next publish.
#[derive(Debug)]
pub struct Subscription {
    key: String,
    receiver: mpsc::Receiver<String>,
}

impl Subscription {
    pub(crate) fn new(key: String, receiver: mpsc::Receiver<String>) -> Self {
        Self { key, receiver }
    }

    /// The subscriber key, as the hub knows it.
    ///
    /// Pass this to [`Hub::detach`](crate::Hub::detach) to unsubscribe.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Receives the next event.
    ///
    /// Suspends until an event is delivered or the channel is closed.
    /// Returns `None` once the stream has ended; further calls keep
    /// returning `None`.
    pub async fn recv(&mut self) -> Option<String> {
        self.receiver.recv().await
    }

    /// Splits the subscription into its key and raw receiver.
    ///
    /// For callers that want to own the receiver directly (e.g. to feed it
    /// into `tokio::select!` alongside other channels).
    #[must_use]
    pub fn into_parts(self) -> (String, mpsc::Receiver<String>) {
        (self.key, self.receiver)
    }
}
