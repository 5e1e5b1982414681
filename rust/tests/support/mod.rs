#![allow(dead_code)]

pub mod helpers;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use convo_core::{
    IdentityProvider, MessageStore, StoreErrorKind, StoredMessage, ThreadFetchResult,
    UserIdentity,
};
use flume::{Receiver, Sender};

/// Store whose fetches block until the test releases them, so tests decide
/// the order in which snapshot responses land.
#[derive(Clone, Default)]
pub struct GatedStore {
    inner: Arc<GatedInner>,
}

#[derive(Default)]
struct GatedInner {
    threads: Mutex<HashMap<String, ThreadFetchResult>>,
    gates: Mutex<HashMap<String, (Sender<()>, Receiver<()>)>>,
    next_handle: Mutex<u64>,
    live: Mutex<Vec<u64>>,
    max_live: Mutex<usize>,
    log: Mutex<Vec<String>>,
}

impl GatedStore {
    pub fn set_thread(&self, peer_id: &str, messages: Vec<StoredMessage>) {
        self.inner
            .threads
            .lock()
            .unwrap()
            .insert(peer_id.to_string(), ThreadFetchResult::loaded(messages));
    }

    pub fn set_failure(&self, peer_id: &str, kind: StoreErrorKind, message: &str) {
        self.inner
            .threads
            .lock()
            .unwrap()
            .insert(peer_id.to_string(), ThreadFetchResult::failed(kind, message));
    }

    /// Fetches for `peer_id` block until [`GatedStore::open`] is called.
    pub fn hold(&self, peer_id: &str) {
        self.inner
            .gates
            .lock()
            .unwrap()
            .insert(peer_id.to_string(), flume::unbounded());
    }

    pub fn open(&self, peer_id: &str) {
        if let Some((tx, _)) = self.inner.gates.lock().unwrap().get(peer_id) {
            let _ = tx.send(());
        }
    }

    pub fn log(&self) -> Vec<String> {
        self.inner.log.lock().unwrap().clone()
    }

    pub fn live_count(&self) -> usize {
        self.inner.live.lock().unwrap().len()
    }

    pub fn max_live(&self) -> usize {
        *self.inner.max_live.lock().unwrap()
    }
}

impl MessageStore for GatedStore {
    fn fetch_thread(&self, peer_id: String) -> ThreadFetchResult {
        let gate = self
            .inner
            .gates
            .lock()
            .unwrap()
            .get(&peer_id)
            .map(|(_, rx)| rx.clone());
        if let Some(rx) = gate {
            let _ = rx.recv_timeout(Duration::from_secs(10));
        }
        self.inner.log.lock().unwrap().push(format!("fetched:{peer_id}"));
        self.inner
            .threads
            .lock()
            .unwrap()
            .get(&peer_id)
            .cloned()
            .unwrap_or_else(|| ThreadFetchResult::loaded(vec![]))
    }

    fn subscribe_to_live_updates(&self, peer_id: String) -> u64 {
        let mut next = self.inner.next_handle.lock().unwrap();
        *next += 1;
        let handle = *next;
        let mut live = self.inner.live.lock().unwrap();
        live.push(handle);
        let mut max = self.inner.max_live.lock().unwrap();
        *max = (*max).max(live.len());
        self.inner
            .log
            .lock()
            .unwrap()
            .push(format!("subscribe:{peer_id}:{handle}"));
        handle
    }

    fn release_subscription(&self, handle: u64) {
        self.inner.live.lock().unwrap().retain(|h| *h != handle);
        self.inner
            .log
            .lock()
            .unwrap()
            .push(format!("release:{handle}"));
    }
}

pub struct StaticIdentity(pub Option<UserIdentity>);

impl IdentityProvider for StaticIdentity {
    fn current_user(&self) -> Option<UserIdentity> {
        self.0.clone()
    }
}

pub fn me() -> StaticIdentity {
    StaticIdentity(Some(UserIdentity {
        user_id: "me".to_string(),
        avatar_url: Some("https://cdn.example/me.png".to_string()),
    }))
}

pub fn msg(id: &str, sender: &str, image: bool) -> StoredMessage {
    StoredMessage {
        id: id.to_string(),
        sender_id: sender.to_string(),
        text: Some(format!("{id} from {sender}")),
        image_url: image.then(|| format!("https://cdn.example/{id}.jpg")),
        created_at: 1_700_000_000,
    }
}
