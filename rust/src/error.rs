//! Error types for the conversation view core.

use thiserror::Error;

use crate::store::StoreErrorKind;

/// Conditions the view core reports.
///
/// Only [`ViewError::SnapshotLoad`] reaches the user (as a failed thread
/// phase); the other variants are discards that get logged and dropped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewError {
    /// The store could not produce the thread snapshot for a peer.
    #[error("thread for {peer_id} failed to load ({}): {message}", .kind.label())]
    SnapshotLoad {
        peer_id: String,
        kind: StoreErrorKind,
        message: String,
    },

    /// A snapshot or live update no longer matches the selected peer.
    #[error("stale {what} for {got}; active peer is {}", .expected.as_deref().unwrap_or("none"))]
    StaleEvent {
        what: &'static str,
        expected: Option<String>,
        got: String,
    },

    /// Nothing to scroll to yet.
    #[error("no scroll target")]
    ScrollTargetMissing,
}
