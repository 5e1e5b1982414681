use crate::error::ViewError;
use crate::state::{MessageRow, Peer, StoredMessage, ThreadPhase, UserIdentity};
use crate::updates::ViewUpdate;

use super::ViewCore;

pub(super) fn build_row(
    message: StoredMessage,
    me: Option<&UserIdentity>,
    peer: Option<&Peer>,
    avatar_fallback: &str,
) -> MessageRow {
    let is_mine = me.is_some_and(|me| me.user_id == message.sender_id);
    let avatar = if is_mine {
        me.and_then(|me| me.avatar_url.as_deref())
    } else {
        peer.and_then(|p| p.avatar_url.as_deref())
    };
    let avatar_url = avatar
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(avatar_fallback)
        .to_string();
    MessageRow {
        id: message.id,
        sender_id: message.sender_id,
        text: message.text,
        image_url: message.image_url,
        created_at: message.created_at,
        is_mine,
        avatar_url,
    }
}

/// The newest row is always the scroll target.
pub(super) fn scroll_anchor(rows: &[MessageRow]) -> Result<&str, ViewError> {
    rows.last()
        .map(|row| row.id.as_str())
        .ok_or(ViewError::ScrollTargetMissing)
}

/// Checks an async result or live event against the peer currently on screen.
pub(super) fn ensure_active_peer(
    what: &'static str,
    active: Option<&str>,
    got: &str,
) -> Result<(), ViewError> {
    if active == Some(got) {
        return Ok(());
    }
    Err(ViewError::StaleEvent {
        what,
        expected: active.map(ToString::to_string),
        got: got.to_string(),
    })
}

impl ViewCore {
    fn build_rows(&mut self, messages: Vec<StoredMessage>) -> Vec<MessageRow> {
        self.state.me = self.identity.current_user();
        let fallback = self.avatar_fallback().to_string();
        messages
            .into_iter()
            .map(|m| build_row(m, self.state.me.as_ref(), self.state.peer.as_ref(), &fallback))
            .collect()
    }

    pub(super) fn apply_snapshot(&mut self, peer_id: String, messages: Vec<StoredMessage>) {
        let rows = self.build_rows(messages);
        tracing::info!(peer_id = %peer_id, count = rows.len(), "thread ready");
        self.state.messages = rows;
        self.state.set_phase(ThreadPhase::Ready { peer_id });
        self.state.scroll_anchor = scroll_anchor(&self.state.messages)
            .ok()
            .map(ToString::to_string);
        self.emit_state();
        self.emit_scroll_to_latest();
    }

    pub(super) fn apply_snapshot_failure(&mut self, err: ViewError) {
        tracing::warn!(%err, "thread load failed");
        let ViewError::SnapshotLoad {
            peer_id,
            kind,
            message,
        } = err
        else {
            return;
        };
        self.state.messages.clear();
        self.state.scroll_anchor = None;
        self.state
            .set_phase(ThreadPhase::Failed { peer_id, kind, message });
        self.emit_state();
    }

    pub(super) fn apply_live_message(&mut self, peer_id: &str, message: StoredMessage) {
        if !self.state.phase.is_ready_for(peer_id) {
            // The pending snapshot (or the failure) is what the user sees; the
            // store's snapshot already accounts for this message.
            tracing::debug!(peer_id, message_id = %message.id, "live message before thread ready; dropped");
            return;
        }
        let rows = self.build_rows(vec![message]);
        self.state.messages.extend(rows);
        self.state.scroll_anchor = scroll_anchor(&self.state.messages)
            .ok()
            .map(ToString::to_string);
        self.emit_state();
        self.emit_scroll_to_latest();
    }

    /// Runs after the list has been published so the target already exists.
    fn emit_scroll_to_latest(&mut self) {
        let target = match self.state.scroll_anchor.clone() {
            Some(id) if self.state.messages.iter().any(|m| m.id == id) => id,
            _ => {
                tracing::debug!(err = %ViewError::ScrollTargetMissing, "scroll skipped");
                return;
            }
        };
        let rev = self.next_rev();
        let snapshot = self.state.clone();
        self.commit_state_snapshot(&snapshot);
        let _ = self.update_sender.send(ViewUpdate::ScrollToMessage {
            rev,
            message_id: target,
            smooth: self.smooth_scroll(),
        });
    }

    pub(super) fn open_preview(&mut self, image_url: String) {
        if self.state.preview_image.as_deref() == Some(image_url.as_str()) {
            return;
        }
        // Replaces any open preview; there is never more than one.
        self.state.preview_image = Some(image_url);
        self.emit_state();
    }

    pub(super) fn close_preview(&mut self) {
        if self.state.preview_image.take().is_some() {
            self.emit_state();
        }
    }
}
