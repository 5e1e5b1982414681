//! Thread storage: ordered, unique messages per peer

use std::collections::VecDeque;

use convo_core::StoredMessage;

use crate::{Inner, MemoryMessageStore, MemoryStoreError};

impl MemoryMessageStore {
    fn validate(
        &self,
        peer_id: &str,
        thread: Option<&VecDeque<StoredMessage>>,
        message: &StoredMessage,
    ) -> Result<(), MemoryStoreError> {
        let id = message.id.trim();
        if id.is_empty() || id.len() > self.limits.max_message_id_length {
            return Err(MemoryStoreError::InvalidMessageId(message.id.clone()));
        }
        let has_text = message.text.as_deref().is_some_and(|t| !t.trim().is_empty());
        if !has_text && message.image_url.is_none() {
            return Err(MemoryStoreError::EmptyMessage(message.id.clone()));
        }
        let Some(thread) = thread else {
            return Ok(());
        };
        if thread.iter().any(|m| m.id == message.id) {
            return Err(MemoryStoreError::DuplicateMessage {
                peer_id: peer_id.to_string(),
                message_id: message.id.clone(),
            });
        }
        if let Some(newest) = thread.back() {
            if message.created_at < newest.created_at {
                return Err(MemoryStoreError::OutOfOrder {
                    message_id: message.id.clone(),
                    created_at: message.created_at,
                    newest: newest.created_at,
                });
            }
        }
        Ok(())
    }

    fn append(
        &self,
        inner: &mut Inner,
        peer_id: &str,
        message: StoredMessage,
    ) -> Result<(), MemoryStoreError> {
        self.validate(peer_id, inner.threads.get(peer_id), &message)?;
        let thread = inner.threads.entry(peer_id.to_string()).or_default();
        if thread.len() >= self.limits.max_messages_per_thread {
            // Evict the oldest message to make room for the new one
            thread.pop_front();
        }
        thread.push_back(message);
        Ok(())
    }

    /// Seed (or replace) the history for `peer_id` without touching the live feed.
    pub fn insert_thread(
        &self,
        peer_id: &str,
        messages: Vec<StoredMessage>,
    ) -> Result<(), MemoryStoreError> {
        let peer_id = normalize_peer_id(peer_id)?;
        let mut guard = self.inner.write();
        let previous = guard.threads.remove(&peer_id);
        for message in messages {
            if let Err(e) = self.append(&mut guard, &peer_id, message) {
                // Leave the previous history in place on a rejected batch.
                match previous {
                    Some(prev) => guard.threads.insert(peer_id, prev),
                    None => guard.threads.remove(&peer_id),
                };
                return Err(e);
            }
        }
        // An empty batch still marks the thread as known.
        guard.threads.entry(peer_id).or_default();
        Ok(())
    }

    /// Store an incoming message and push it to the attached view if any live
    /// subscription is held. Returns whether it was pushed.
    pub fn receive(&self, peer_id: &str, message: StoredMessage) -> Result<bool, MemoryStoreError> {
        let peer_id = normalize_peer_id(peer_id)?;
        let view = {
            let mut guard = self.inner.write();
            self.append(&mut guard, &peer_id, message.clone())?;
            if guard.live.is_empty() {
                None
            } else {
                guard.view.as_ref().and_then(|w| w.upgrade())
            }
        };
        let Some(view) = view else {
            tracing::debug!(peer_id = %peer_id, message_id = %message.id, "stored without live push");
            return Ok(false);
        };
        view.deliver_live_message(peer_id, message);
        Ok(true)
    }

    /// Current history for `peer_id`, oldest first.
    pub fn thread(&self, peer_id: &str) -> Vec<StoredMessage> {
        self.inner
            .read()
            .threads
            .get(peer_id.trim())
            .map(|t| t.iter().cloned().collect())
            .unwrap_or_default()
    }
}

fn normalize_peer_id(peer_id: &str) -> Result<String, MemoryStoreError> {
    let peer_id = peer_id.trim();
    if peer_id.is_empty() {
        return Err(MemoryStoreError::EmptyPeerId);
    }
    Ok(peer_id.to_string())
}
