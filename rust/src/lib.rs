mod actions;
mod core;
mod error;
mod logging;
mod state;
mod store;
mod updates;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::thread;

use flume::{Receiver, Sender};

pub use actions::ViewAction;
pub use error::ViewError;
pub use state::*;
pub use store::*;
pub use updates::*;

/// Return the default `convo_config.json` payload used when no config file exists.
pub fn default_config_json() -> String {
    core::default_view_config_json()
}

uniffi::setup_scaffolding!();

#[uniffi::export(callback_interface)]
pub trait ViewReconciler: Send + Sync + 'static {
    fn reconcile(&self, update: ViewUpdate);
}

/// A mounted conversation view.
///
/// The host supplies the selected peer (via [`ViewAction::SelectPeer`]) and
/// forwards live feed pushes; everything else is derived by the view actor.
#[derive(uniffi::Object)]
pub struct FfiConversationView {
    core_tx: Sender<CoreMsg>,
    update_rx: Receiver<ViewUpdate>,
    listening: AtomicBool,
    shared_state: Arc<RwLock<ViewState>>,
}

#[uniffi::export]
impl FfiConversationView {
    #[uniffi::constructor]
    pub fn new(
        data_dir: String,
        store: Box<dyn MessageStore>,
        identity: Box<dyn IdentityProvider>,
    ) -> Arc<Self> {
        logging::init_logging(&data_dir);
        tracing::info!(data_dir = %data_dir, "FfiConversationView::new() starting");

        let (update_tx, update_rx) = flume::unbounded();
        let (core_tx, core_rx) = flume::unbounded::<CoreMsg>();
        let shared_state = Arc::new(RwLock::new(ViewState::empty()));
        let store: Arc<dyn MessageStore> = Arc::from(store);
        let identity: Arc<dyn IdentityProvider> = Arc::from(identity);

        // Actor loop thread (single threaded "view actor").
        let core_tx_for_core = core_tx.clone();
        let shared_for_core = shared_state.clone();
        thread::spawn(move || {
            let mut core = crate::core::ViewCore::new(
                update_tx,
                core_tx_for_core,
                data_dir,
                shared_for_core,
                store,
                identity,
            );
            while let Ok(msg) = core_rx.recv() {
                core.handle_message(msg);
                if core.is_unmounted() {
                    break;
                }
            }
        });

        Arc::new(Self {
            core_tx,
            update_rx,
            listening: AtomicBool::new(false),
            shared_state,
        })
    }

    pub fn state(&self) -> ViewState {
        match self.shared_state.read() {
            Ok(g) => g.clone(),
            Err(poison) => poison.into_inner().clone(),
        }
    }

    pub fn dispatch(&self, action: ViewAction) {
        // Contract: never block caller.
        let _ = self.core_tx.send(CoreMsg::Action(action));
    }

    /// Push from the store's live feed. Dropped unless `peer_id` is the
    /// selected peer and its subscription is still held.
    pub fn deliver_live_message(&self, peer_id: String, message: StoredMessage) {
        let _ = self.core_tx.send(CoreMsg::Internal(Box::new(
            InternalEvent::LiveMessage { peer_id, message },
        )));
    }

    /// Explicit teardown: releases the live subscription and stops the actor.
    pub fn unmount(&self) {
        self.dispatch(ViewAction::Unmount);
    }

    pub fn listen_for_updates(&self, reconciler: Box<dyn ViewReconciler>) {
        if self
            .listening
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            // Avoid multiple listeners that would split messages.
            return;
        }

        let rx = self.update_rx.clone();
        thread::spawn(move || {
            while let Ok(update) = rx.recv() {
                reconciler.reconcile(update);
            }
        });
    }
}

impl Drop for FfiConversationView {
    fn drop(&mut self) {
        // The actor holds its own sender, so it only stops on an explicit unmount.
        let _ = self.core_tx.send(CoreMsg::Action(ViewAction::Unmount));
    }
}
