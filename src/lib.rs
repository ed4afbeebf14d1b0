//! # eventhub
//!
//! **eventhub** is a minimal in-process broadcast hub.
//!
//! Consumers attach to a shared [`Hub`] and receive every event published
//! while they are attached, each through its own FIFO delivery channel.
//! Subscribers can detach individually, and the hub can shut everyone down
//! at once.
//!
//! ## Architecture
//! ```text
//! Publishers (any number):              Consumers (one task each):
//!
//!   publish("event") ──┐                ┌──► [channel k0] ─► recv() loop
//!                      ├───► Hub ───────┼──► [channel k1] ─► recv() loop
//!   detach(key) ───────┤   (registry    └──► [channel kN] ─► recv() loop
//!                      │    + lock)
//!   shutdown() ────────┘
//! ```
//!
//! The registry maps an opaque subscriber key to the sending half of that
//! subscriber's delivery channel. One mutex guards the registry and the
//! sends, so every publish observes a consistent subscriber snapshot and
//! each subscriber sees events in publish order.
//!
//! ## Rules
//! - **Blocking delivery**: `publish` awaits each subscriber's channel in
//!   turn. A slow consumer delays the rest of that broadcast; there is no
//!   per-subscriber timeout. Fan-out isolation is out of scope here.
//! - **Per-subscriber FIFO**: a single subscriber receives events in the
//!   order the publishes acquired the hub lock. No ordering is guaranteed
//!   *across* subscribers.
//! - **Terminal shutdown**: after [`Hub::shutdown`] the hub is stopped for
//!   good. Publishes become no-ops, detaches are rejected, and new
//!   subscriptions observe end-of-stream immediately.
//!
//! ## Example
//! ```rust
//! use eventhub::Hub;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let hub = Hub::new();
//!
//!     let mut sub = hub.attach().await;
//!     hub.publish("hello").await;
//!     assert_eq!(sub.recv().await.as_deref(), Some("hello"));
//!
//!     hub.shutdown().await;
//!     assert_eq!(sub.recv().await, None); // end-of-stream
//! }
//! ```
mod config;
mod error;
mod hub;
mod subscription;

// ---- Public re-exports ----

pub use config::HubConfig;
pub use error::HubError;
pub use hub::{Hub, SHUTDOWN_EVENT};
pub use subscription::Subscription;
