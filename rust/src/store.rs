use serde::{Deserialize, Serialize};

use crate::state::{StoredMessage, UserIdentity};

#[derive(uniffi::Enum, Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreErrorKind {
    NotFound,
    Unauthorized,
    Unavailable,
    Timeout,
    Other,
}

impl StoreErrorKind {
    pub fn label(&self) -> &'static str {
        match self {
            StoreErrorKind::NotFound => "not found",
            StoreErrorKind::Unauthorized => "unauthorized",
            StoreErrorKind::Unavailable => "unavailable",
            StoreErrorKind::Timeout => "timeout",
            StoreErrorKind::Other => "store error",
        }
    }
}

#[derive(uniffi::Record, Clone, Debug, PartialEq, Eq)]
pub struct ThreadFetchResult {
    pub ok: bool,
    pub messages: Vec<StoredMessage>,
    pub error_kind: Option<StoreErrorKind>,
    pub error_message: Option<String>,
}

impl ThreadFetchResult {
    pub fn loaded(messages: Vec<StoredMessage>) -> Self {
        Self {
            ok: true,
            messages,
            error_kind: None,
            error_message: None,
        }
    }

    pub fn failed(kind: StoreErrorKind, message: impl Into<String>) -> Self {
        Self {
            ok: false,
            messages: vec![],
            error_kind: Some(kind),
            error_message: Some(message.into()),
        }
    }

    /// Collapse the FFI-friendly record into a `Result`, passing the store's
    /// error kind and message through unchanged.
    pub fn into_result(self) -> Result<Vec<StoredMessage>, (StoreErrorKind, String)> {
        if self.ok {
            return Ok(self.messages);
        }
        let kind = self.error_kind.unwrap_or(StoreErrorKind::Other);
        let message = self
            .error_message
            .unwrap_or_else(|| kind.label().to_string());
        Err((kind, message))
    }
}

/// Message store owned by the host.
///
/// `fetch_thread` may block; the view never calls it on the actor thread.
/// Live messages are pushed back through `FfiConversationView::deliver_live_message`
/// while a subscription handle is held.
#[uniffi::export(callback_interface)]
pub trait MessageStore: Send + Sync + 'static {
    fn fetch_thread(&self, peer_id: String) -> ThreadFetchResult;
    fn subscribe_to_live_updates(&self, peer_id: String) -> u64;
    fn release_subscription(&self, handle: u64);
}

#[uniffi::export(callback_interface)]
pub trait IdentityProvider: Send + Sync + 'static {
    fn current_user(&self) -> Option<UserIdentity>;
}
