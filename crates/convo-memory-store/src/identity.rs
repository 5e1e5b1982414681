//! Identity provider backed by a swappable in-memory user

use std::sync::Arc;

use convo_core::{IdentityProvider, UserIdentity};
use parking_lot::RwLock;

/// The signed-in user, as far as the view is concerned.
///
/// Clones share the same slot, so a host can log in/out after mounting.
#[derive(Debug, Clone, Default)]
pub struct MemoryIdentity {
    user: Arc<RwLock<Option<UserIdentity>>>,
}

impl MemoryIdentity {
    /// Creates an identity for `user_id`.
    pub fn new(user_id: &str, avatar_url: Option<String>) -> Self {
        Self {
            user: Arc::new(RwLock::new(Some(UserIdentity {
                user_id: user_id.to_string(),
                avatar_url,
            }))),
        }
    }

    /// Creates an identity with nobody signed in.
    pub fn signed_out() -> Self {
        Self::default()
    }

    /// Replaces the current user.
    pub fn set(&self, user: Option<UserIdentity>) {
        *self.user.write() = user;
    }
}

impl IdentityProvider for MemoryIdentity {
    fn current_user(&self) -> Option<UserIdentity> {
        self.user.read().clone()
    }
}
