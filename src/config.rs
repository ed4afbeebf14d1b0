//! # Hub configuration.
//!
//! Provides [`HubConfig`], the settings applied at hub construction.
//!
//! ## Sentinel values
//! - `delivery_capacity = 0` → clamped to 1 (a tokio mpsc channel cannot be
//!   unbuffered; capacity 1 is the closest thing to a synchronous hand-off)

/// Configuration for a [`Hub`](crate::Hub).
///
/// ## Field semantics
/// - `delivery_capacity`: per-subscriber channel buffer (min 1; clamped by
///   the hub at attach time)
///
/// ## Notes
/// Fields are public for flexibility; `Default` gives near-synchronous
/// hand-off (capacity 1, so a publisher can run at most one event ahead of
/// each consumer).
#[derive(Clone, Debug)]
pub struct HubConfig {
    /// Capacity of each subscriber's delivery channel.
    ///
    /// Delivery blocks once a subscriber's buffer is full, which in turn
    /// stalls the broadcast for every subscriber later in the iteration.
    /// Raising this trades memory for publisher slack; it does not change
    /// per-subscriber FIFO ordering.
    pub delivery_capacity: usize,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            delivery_capacity: 1,
        }
    }
}

impl HubConfig {
    /// Effective channel capacity (clamped to the tokio minimum of 1).
    pub(crate) fn capacity(&self) -> usize {
        self.delivery_capacity.max(1)
    }
}
