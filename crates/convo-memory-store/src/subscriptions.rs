//! `MessageStore` implementation: fetches and live-update handles

use convo_core::{MessageStore, ThreadFetchResult};

use crate::MemoryMessageStore;

impl MemoryMessageStore {
    /// Number of live-update handles currently held.
    pub fn live_handle_count(&self) -> usize {
        self.inner.read().live.len()
    }

    /// Highest number of handles that were ever live at the same time.
    pub fn max_concurrent_handles(&self) -> usize {
        self.inner.read().max_concurrent
    }
}

impl MessageStore for MemoryMessageStore {
    fn fetch_thread(&self, peer_id: String) -> ThreadFetchResult {
        let inner = self.inner.read();
        if let Some((kind, message)) = inner.failures.get(&peer_id) {
            tracing::warn!(peer_id = %peer_id, kind = kind.label(), "fetch failing by request");
            return ThreadFetchResult::failed(*kind, message.clone());
        }
        let messages = inner
            .threads
            .get(&peer_id)
            .map(|t| t.iter().cloned().collect())
            .unwrap_or_default();
        ThreadFetchResult::loaded(messages)
    }

    fn subscribe_to_live_updates(&self, peer_id: String) -> u64 {
        let mut inner = self.inner.write();
        inner.next_handle += 1;
        let handle = inner.next_handle;
        inner.live.insert(handle, peer_id);
        inner.max_concurrent = inner.max_concurrent.max(inner.live.len());
        handle
    }

    fn release_subscription(&self, handle: u64) {
        if self.inner.write().live.remove(&handle).is_none() {
            tracing::warn!(handle, "release of unknown subscription handle");
        }
    }
}
