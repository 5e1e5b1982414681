use std::sync::Arc;

use crate::store::MessageStore;

/// A live-update handle leased from the store for one peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SubscriptionLease {
    pub(crate) handle: u64,
    pub(crate) peer_id: String,
}

/// Keeps the live feed bound to at most one peer at a time.
///
/// The old lease is always released before a new one is acquired, so there is
/// never a window with two handles live for the same view.
pub(crate) struct LiveSubscription {
    store: Arc<dyn MessageStore>,
    lease: Option<SubscriptionLease>,
}

impl LiveSubscription {
    pub(crate) fn new(store: Arc<dyn MessageStore>) -> Self {
        Self { store, lease: None }
    }

    #[cfg(test)]
    pub(crate) fn lease(&self) -> Option<&SubscriptionLease> {
        self.lease.as_ref()
    }

    pub(crate) fn is_live_for(&self, peer_id: &str) -> bool {
        self.lease.as_ref().is_some_and(|l| l.peer_id == peer_id)
    }

    #[cfg(test)]
    pub(crate) fn live_count(&self) -> usize {
        usize::from(self.lease.is_some())
    }

    /// Release-then-acquire. Returns the new handle.
    pub(crate) fn rebind(&mut self, peer_id: &str) -> u64 {
        self.release();
        let handle = self.store.subscribe_to_live_updates(peer_id.to_string());
        tracing::debug!(handle, peer_id, "live subscription acquired");
        self.lease = Some(SubscriptionLease {
            handle,
            peer_id: peer_id.to_string(),
        });
        handle
    }

    /// No-op when nothing is held.
    pub(crate) fn release(&mut self) {
        if let Some(lease) = self.lease.take() {
            tracing::debug!(
                handle = lease.handle,
                peer_id = %lease.peer_id,
                "live subscription released"
            );
            self.store.release_subscription(lease.handle);
        }
    }
}

impl Drop for LiveSubscription {
    fn drop(&mut self) {
        self.release();
    }
}
