//! Error types for hub operations.
//!
//! A single enum, [`HubError`], covers the two ways a hub call can be
//! refused. Everything else the hub does is total: `attach`, `publish` and
//! `shutdown` never fail under correct usage.

use thiserror::Error;

/// # Errors produced by the broadcast hub.
///
/// Only [`Hub::detach`](crate::Hub::detach) is fallible; the other
/// operations absorb misuse (double shutdown, publish-after-shutdown)
/// internally instead of surfacing it.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HubError {
    /// The subscriber key is not in the registry.
    ///
    /// Returned for keys that were never attached and for keys that were
    /// already detached. Detach is single-attempt: the second detach of the
    /// same key always lands here.
    #[error("subscriber not found: {key}")]
    NotFound {
        /// The key that was looked up.
        key: String,
    },

    /// The hub has been shut down; the registry is closed for good.
    #[error("hub is stopped")]
    Stopped,
}

impl HubError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use eventhub::HubError;
    ///
    /// let err = HubError::NotFound { key: "k0".into() };
    /// assert_eq!(err.as_label(), "hub_not_found");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            HubError::NotFound { .. } => "hub_not_found",
            HubError::Stopped => "hub_stopped",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            HubError::NotFound { key } => format!("no subscriber under key {key}"),
            HubError::Stopped => "hub already shut down".to_string(),
        }
    }
}
