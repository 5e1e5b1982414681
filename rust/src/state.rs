use serde::{Deserialize, Serialize};

use crate::store::StoreErrorKind;

#[derive(uniffi::Record, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Peer {
    pub peer_id: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

#[derive(uniffi::Record, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub user_id: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// A message as the store hands it to us. Immutable once received.
#[derive(uniffi::Record, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredMessage {
    pub id: String,
    pub sender_id: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    pub created_at: i64,
}

/// A renderable row: the stored message classified against the current user.
#[derive(uniffi::Record, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRow {
    pub id: String,
    pub sender_id: String,
    pub text: Option<String>,
    pub image_url: Option<String>,
    pub created_at: i64,
    pub is_mine: bool,
    pub avatar_url: String,
}

#[derive(uniffi::Enum, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum ThreadPhase {
    Idle,
    Loading {
        peer_id: String,
    },
    Ready {
        peer_id: String,
    },
    Failed {
        peer_id: String,
        kind: StoreErrorKind,
        message: String,
    },
}

impl ThreadPhase {
    pub fn peer_id(&self) -> Option<&str> {
        match self {
            ThreadPhase::Idle => None,
            ThreadPhase::Loading { peer_id }
            | ThreadPhase::Ready { peer_id }
            | ThreadPhase::Failed { peer_id, .. } => Some(peer_id),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, ThreadPhase::Loading { .. })
    }

    pub fn is_ready_for(&self, peer_id: &str) -> bool {
        matches!(self, ThreadPhase::Ready { peer_id: p } if p == peer_id)
    }
}

/// Everything the host needs to render the conversation pane.
///
/// Ephemeral widget state (actual scroll offset, focus) stays native; the
/// decisions that must survive a peer switch live here.
#[derive(uniffi::Record, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState {
    pub rev: u64,
    pub peer: Option<Peer>,
    pub phase: ThreadPhase,
    pub is_loading: bool,
    pub messages: Vec<MessageRow>,
    pub scroll_anchor: Option<String>,
    pub preview_image: Option<String>,
    pub me: Option<UserIdentity>,
}

impl ViewState {
    pub fn empty() -> Self {
        Self {
            rev: 0,
            peer: None,
            phase: ThreadPhase::Idle,
            is_loading: false,
            messages: vec![],
            scroll_anchor: None,
            preview_image: None,
            me: None,
        }
    }

    pub fn active_peer_id(&self) -> Option<&str> {
        self.peer.as_ref().map(|p| p.peer_id.as_str())
    }

    pub fn set_phase(&mut self, phase: ThreadPhase) {
        self.is_loading = phase.is_loading();
        self.phase = phase;
    }
}
