use crate::state::{StoredMessage, ViewState};
use crate::store::ThreadFetchResult;
use crate::ViewAction;

#[derive(uniffi::Enum, Clone, Debug, PartialEq)]
pub enum ViewUpdate {
    FullState(ViewState),
    /// Emitted after the `FullState` that contains `message_id`, never before.
    ScrollToMessage {
        rev: u64,
        message_id: String,
        smooth: bool,
    },
}

impl ViewUpdate {
    pub fn rev(&self) -> u64 {
        match self {
            ViewUpdate::FullState(s) => s.rev,
            ViewUpdate::ScrollToMessage { rev, .. } => *rev,
        }
    }
}

#[derive(Debug)]
pub enum CoreMsg {
    Action(ViewAction),
    Internal(Box<InternalEvent>),
}

#[derive(Debug)]
pub enum InternalEvent {
    // Async fetch result. `token` identifies the load that requested it.
    ThreadFetched {
        token: u64,
        peer_id: String,
        result: ThreadFetchResult,
    },

    // Live feed push from the host's store.
    LiveMessage {
        peer_id: String,
        message: StoredMessage,
    },
}
