mod config;
mod reconcile;
mod subscription;

use std::sync::{Arc, RwLock};

use flume::Sender;

use crate::actions::ViewAction;
use crate::error::ViewError;
use crate::state::{Peer, ThreadPhase, ViewState};
use crate::store::{IdentityProvider, MessageStore, StoreErrorKind, ThreadFetchResult};
use crate::updates::{CoreMsg, InternalEvent, ViewUpdate};

use reconcile::ensure_active_peer;
use subscription::LiveSubscription;

pub(crate) use config::default_view_config_json;

pub struct ViewCore {
    pub state: ViewState,
    rev: u64,

    update_sender: Sender<ViewUpdate>,
    core_sender: Sender<CoreMsg>,
    shared_state: Arc<RwLock<ViewState>>,

    config: config::ViewConfig,
    runtime: tokio::runtime::Runtime,

    store: Arc<dyn MessageStore>,
    identity: Arc<dyn IdentityProvider>,
    subscription: LiveSubscription,

    // Bumped on every activation/deactivation; fetch results carrying an older
    // token belong to a peer that is no longer on screen.
    load_token: u64,
    unmounted: bool,
}

impl ViewCore {
    pub fn new(
        update_sender: Sender<ViewUpdate>,
        core_sender: Sender<CoreMsg>,
        data_dir: String,
        shared_state: Arc<RwLock<ViewState>>,
        store: Arc<dyn MessageStore>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        let config = config::load_view_config(&data_dir);

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .max_blocking_threads(config.fetch_worker_threads())
            .thread_name("convo-fetch")
            .build()
            .expect("tokio runtime");

        let mut state = ViewState::empty();
        state.me = identity.current_user();

        let this = Self {
            state,
            rev: 0,
            update_sender,
            core_sender,
            shared_state,
            config,
            runtime,
            subscription: LiveSubscription::new(store.clone()),
            store,
            identity,
            load_token: 0,
            unmounted: false,
        };

        // Ensure FfiConversationView.state() has an immediately-available snapshot.
        let snapshot = this.state.clone();
        this.commit_state_snapshot(&snapshot);
        this
    }

    pub fn is_unmounted(&self) -> bool {
        self.unmounted
    }

    #[cfg(test)]
    pub(crate) fn live_subscription_count(&self) -> usize {
        self.subscription.live_count()
    }

    fn next_rev(&mut self) -> u64 {
        self.rev += 1;
        self.state.rev = self.rev;
        self.rev
    }

    fn commit_state_snapshot(&self, snapshot: &ViewState) {
        match self.shared_state.write() {
            Ok(mut g) => *g = snapshot.clone(),
            Err(poison) => *poison.into_inner() = snapshot.clone(),
        }
    }

    fn emit_state(&mut self) {
        self.next_rev();
        let snapshot = self.state.clone();
        self.commit_state_snapshot(&snapshot);
        let _ = self.update_sender.send(ViewUpdate::FullState(snapshot));
    }

    pub fn handle_message(&mut self, msg: CoreMsg) {
        if self.unmounted {
            tracing::debug!("view unmounted; ignoring message");
            return;
        }
        match msg {
            CoreMsg::Action(action) => {
                // Never log `?action` directly: it carries message/image content.
                tracing::info!(action = action.tag(), "dispatch");
                self.handle_action(action);
            }
            CoreMsg::Internal(internal) => self.handle_internal(*internal),
        }
    }

    fn handle_internal(&mut self, internal: InternalEvent) {
        match internal {
            InternalEvent::ThreadFetched {
                token,
                peer_id,
                result,
            } => {
                // Ignore stale results (peer changed while the fetch was in flight).
                if token != self.load_token {
                    let err = ViewError::StaleEvent {
                        what: "snapshot",
                        expected: self.state.active_peer_id().map(ToString::to_string),
                        got: peer_id,
                    };
                    tracing::debug!(%err, token, current = self.load_token, "dropped");
                    return;
                }
                if let Err(err) = ensure_active_peer("snapshot", self.state.active_peer_id(), &peer_id)
                {
                    tracing::debug!(%err, "dropped");
                    return;
                }
                match result.into_result() {
                    Ok(messages) => self.apply_snapshot(peer_id, messages),
                    Err((kind, message)) => self.apply_snapshot_failure(ViewError::SnapshotLoad {
                        peer_id,
                        kind,
                        message,
                    }),
                }
            }
            InternalEvent::LiveMessage { peer_id, message } => {
                if let Err(err) =
                    ensure_active_peer("live message", self.state.active_peer_id(), &peer_id)
                {
                    tracing::debug!(%err, message_id = %message.id, "dropped");
                    return;
                }
                if !self.subscription.is_live_for(&peer_id) {
                    tracing::debug!(peer_id = %peer_id, "live message without a live subscription; dropped");
                    return;
                }
                self.apply_live_message(&peer_id, message);
            }
        }
    }

    fn handle_action(&mut self, action: ViewAction) {
        match action {
            ViewAction::SelectPeer { peer } => {
                let peer_id = peer.peer_id.trim();
                if peer_id.is_empty() {
                    tracing::warn!("select peer with empty id; ignoring");
                    return;
                }
                let peer = Peer {
                    peer_id: peer_id.to_string(),
                    avatar_url: peer.avatar_url,
                };
                if self.skip_reselect_same_peer()
                    && self.state.active_peer_id() == Some(peer.peer_id.as_str())
                    && self.subscription.is_live_for(&peer.peer_id)
                {
                    tracing::debug!(peer_id = %peer.peer_id, "peer already active; not re-binding");
                    return;
                }
                self.activate(peer);
            }
            ViewAction::ClearPeer => {
                self.deactivate();
                self.state.peer = None;
                self.state.messages.clear();
                self.state.scroll_anchor = None;
                self.state.set_phase(ThreadPhase::Idle);
                self.emit_state();
            }
            ViewAction::OpenImagePreview { image_url } => {
                let image_url = image_url.trim().to_string();
                if image_url.is_empty() {
                    return;
                }
                self.open_preview(image_url);
            }
            ViewAction::CloseImagePreview => self.close_preview(),
            ViewAction::Unmount => {
                self.deactivate();
                self.unmounted = true;
                let rev = self.rev;
                self.state = ViewState::empty();
                self.state.rev = rev;
                self.emit_state();
                tracing::info!("view unmounted");
            }
        }
    }

    /// Tear down everything bound to the current peer: live feed, pending
    /// fetch interest, preview.
    fn deactivate(&mut self) {
        self.subscription.release();
        self.load_token += 1;
        self.state.preview_image = None;
    }

    fn activate(&mut self, peer: Peer) {
        // Release-then-acquire: the old handle is gone before anything new starts.
        self.deactivate();
        let token = self.load_token;
        let peer_id = peer.peer_id.clone();

        self.state.peer = Some(peer);
        self.state.me = self.identity.current_user();
        self.state.messages.clear();
        self.state.scroll_anchor = None;
        self.state.set_phase(ThreadPhase::Loading {
            peer_id: peer_id.clone(),
        });
        self.emit_state();

        self.request_thread(token, peer_id.clone());
        self.subscription.rebind(&peer_id);
    }

    fn request_thread(&self, token: u64, peer_id: String) {
        let store = self.store.clone();
        let tx = self.core_sender.clone();
        self.runtime.spawn(async move {
            let fetch_peer = peer_id.clone();
            let joined =
                tokio::task::spawn_blocking(move || store.fetch_thread(fetch_peer)).await;
            let result = match joined {
                Ok(result) => result,
                Err(e) => ThreadFetchResult::failed(
                    StoreErrorKind::Other,
                    format!("thread fetch task failed: {e}"),
                ),
            };
            let _ = tx.send(CoreMsg::Internal(Box::new(InternalEvent::ThreadFetched {
                token,
                peer_id,
                result,
            })));
        });
    }
}
