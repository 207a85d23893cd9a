//! Session context - the bearer token and the signed-in user
//!
//! A `Session` is created once and cloned into every store and the REST client, so a login
//! or logout is visible everywhere immediately.

use std::sync::Arc;

use parking_lot::RwLock;

use blog_core::{ownership, Authored, User, UserId};

/// Token and user of a signed-in session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub token: String,
    pub user: User,
}

/// Shared, cheaply clonable session handle (anonymous until `login`)
#[derive(Debug, Clone, Default)]
pub struct Session {
    state: Arc<RwLock<Option<SessionState>>>,
}

impl Session {
    /// Create an anonymous session
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session that is already signed in
    pub fn signed_in(token: impl Into<String>, user: User) -> Self {
        let session = Self::new();
        session.login(token, user);
        session
    }

    pub fn login(&self, token: impl Into<String>, user: User) {
        tracing::info!(user_id = %user.id, "Session started");
        *self.state.write() = Some(SessionState {
            token: token.into(),
            user,
        });
    }

    pub fn logout(&self) {
        if self.state.write().take().is_some() {
            tracing::info!("Session ended");
        }
    }

    /// Replace the signed-in user, keeping the token (no-op when anonymous)
    pub fn update_user(&self, user: User) {
        if let Some(state) = self.state.write().as_mut() {
            state.user = user;
        }
    }

    pub fn token(&self) -> Option<String> {
        self.state.read().as_ref().map(|state| state.token.clone())
    }

    pub fn user(&self) -> Option<User> {
        self.state.read().as_ref().map(|state| state.user.clone())
    }

    pub fn current_user_id(&self) -> Option<UserId> {
        self.state.read().as_ref().map(|state| state.user.id.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.read().is_some()
    }

    /// Whether the signed-in user may edit or delete `resource`
    pub fn can_modify(&self, resource: &impl Authored) -> bool {
        let acting = self.current_user_id();
        ownership::can_modify(acting.as_ref(), resource.author_id())
    }
}
