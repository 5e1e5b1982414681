//! In-memory message store for the conversation view core.
//!
//! [`MemoryMessageStore`] implements the view's `MessageStore` callback
//! interface entirely in process memory. Threads are keyed by peer id and kept
//! in arrival order; nothing is persisted.
//!
//! Like a socket-backed store, the live feed is global: while any subscription
//! handle is held, every received message is pushed to the attached view and
//! the view decides whether it belongs to the selected peer.
//!
//! ```rust,no_run
//! use convo_memory_store::{MemoryIdentity, MemoryMessageStore};
//! use convo_core::{FfiConversationView, StoredMessage};
//!
//! let store = MemoryMessageStore::new();
//! let view = FfiConversationView::new(
//!     "/tmp/convo".to_string(),
//!     Box::new(store.clone()),
//!     Box::new(MemoryIdentity::new("me", None)),
//! );
//! store.attach(&view);
//! store
//!     .receive(
//!         "alice",
//!         StoredMessage {
//!             id: "m1".to_string(),
//!             sender_id: "alice".to_string(),
//!             text: Some("hi".to_string()),
//!             image_url: None,
//!             created_at: 0,
//!         },
//!     )
//!     .unwrap();
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Weak};

use convo_core::{FfiConversationView, StoreErrorKind};
use parking_lot::RwLock;

mod error;
mod identity;
mod subscriptions;
mod threads;

pub use self::error::MemoryStoreError;
pub use self::identity::MemoryIdentity;

/// Default maximum number of messages kept per thread.
/// When this limit is reached, the oldest message is evicted.
pub const DEFAULT_MAX_MESSAGES_PER_THREAD: usize = 10_000;

/// Default maximum length of a message id in bytes.
pub const DEFAULT_MAX_MESSAGE_ID_LENGTH: usize = 256;

/// Configurable limits for the in-memory store.
#[derive(Debug, Clone, Copy)]
pub struct MemoryLimits {
    /// Maximum number of messages kept per thread
    pub max_messages_per_thread: usize,
    /// Maximum length of a message id in bytes
    pub max_message_id_length: usize,
}

impl Default for MemoryLimits {
    fn default() -> Self {
        Self {
            max_messages_per_thread: DEFAULT_MAX_MESSAGES_PER_THREAD,
            max_message_id_length: DEFAULT_MAX_MESSAGE_ID_LENGTH,
        }
    }
}

impl MemoryLimits {
    /// Sets the maximum number of messages kept per thread.
    ///
    /// # Panics
    ///
    /// Panics if `limit` is 0.
    pub fn with_max_messages_per_thread(mut self, limit: usize) -> Self {
        assert!(limit > 0, "max_messages_per_thread must be greater than 0");
        self.max_messages_per_thread = limit;
        self
    }

    /// Sets the maximum length of a message id in bytes.
    ///
    /// # Panics
    ///
    /// Panics if `limit` is 0.
    pub fn with_max_message_id_length(mut self, limit: usize) -> Self {
        assert!(limit > 0, "max_message_id_length must be greater than 0");
        self.max_message_id_length = limit;
        self
    }
}

#[derive(Default)]
struct Inner {
    threads: HashMap<String, VecDeque<convo_core::StoredMessage>>,
    failures: HashMap<String, (StoreErrorKind, String)>,
    // handle -> peer id it was opened for
    live: HashMap<u64, String>,
    next_handle: u64,
    max_concurrent: usize,
    view: Option<Weak<FfiConversationView>>,
}

/// A memory-based message store.
///
/// Cloning is cheap; clones share the same threads and subscriptions.
#[derive(Clone, Default)]
pub struct MemoryMessageStore {
    inner: Arc<RwLock<Inner>>,
    limits: MemoryLimits,
}

impl std::fmt::Debug for MemoryMessageStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.read();
        f.debug_struct("MemoryMessageStore")
            .field("threads", &inner.threads.len())
            .field("live_handles", &inner.live.len())
            .field("limits", &self.limits)
            .finish()
    }
}

impl MemoryMessageStore {
    /// Creates an empty store with default limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store with custom limits.
    pub fn with_limits(limits: MemoryLimits) -> Self {
        Self {
            inner: Arc::default(),
            limits,
        }
    }

    /// Returns the limits this store enforces.
    pub fn limits(&self) -> &MemoryLimits {
        &self.limits
    }

    /// Attach the view that receives live pushes. Only a weak reference is kept.
    pub fn attach(&self, view: &Arc<FfiConversationView>) {
        self.inner.write().view = Some(Arc::downgrade(view));
    }

    /// Make every fetch for `peer_id` fail with the given error until cleared.
    pub fn fail_fetches(&self, peer_id: &str, kind: StoreErrorKind, message: impl Into<String>) {
        self.inner
            .write()
            .failures
            .insert(peer_id.to_string(), (kind, message.into()));
    }

    /// Undo [`MemoryMessageStore::fail_fetches`].
    pub fn clear_failure(&self, peer_id: &str) {
        self.inner.write().failures.remove(peer_id);
    }
}
