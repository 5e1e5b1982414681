//! Error types for the in-memory store

use thiserror::Error;

/// Rejections raised while writing to the in-memory store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemoryStoreError {
    /// Peer id was empty after trimming
    #[error("peer id is empty")]
    EmptyPeerId,

    /// Message id was empty or exceeded the configured length
    #[error("invalid message id: {0}")]
    InvalidMessageId(String),

    /// A message with this id is already in the thread
    #[error("duplicate message {message_id} in thread {peer_id}")]
    DuplicateMessage {
        /// Thread the message was offered to
        peer_id: String,
        /// Offending id
        message_id: String,
    },

    /// Message has neither text nor an image
    #[error("message {0} has no content")]
    EmptyMessage(String),

    /// Message is older than the thread's newest entry
    #[error("message {message_id} is out of order ({created_at} < {newest})")]
    OutOfOrder {
        /// Offending id
        message_id: String,
        /// Its timestamp
        created_at: i64,
        /// Timestamp of the newest stored message
        newest: i64,
    },
}
