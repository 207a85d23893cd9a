//! Account flows
//!
//! Login, signup, logout, and edits of the caller's own profile. Successful flows
//! update the shared [`Session`] so every store sees the same signed-in user.

use std::sync::Arc;

use tracing::{info, instrument, warn};
use validator::Validate;

use blog_common::Session;
use blog_core::{
    AccountApi, DomainError, ImageUpload, LoginForm, ProfileChanges, SignupForm, User, UserId,
};

use super::SyncResult;

/// Outcome of a profile edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileUpdate {
    /// Nothing differed from the current profile; no request was sent
    Unchanged,
    Updated(User),
}

/// Authentication and profile service
pub struct AuthService {
    accounts: Arc<dyn AccountApi>,
    session: Session,
    max_picture_bytes: usize,
}

impl AuthService {
    /// Create a new AuthService
    pub fn new(accounts: Arc<dyn AccountApi>, session: Session, max_picture_bytes: usize) -> Self {
        Self {
            accounts,
            session,
            max_picture_bytes,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn current_user(&self) -> Option<User> {
        self.session.user()
    }

    /// Login with email and password, then load the caller's profile
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> SyncResult<User> {
        let form = LoginForm::new(email, password);
        form.check()?;

        let grant = self
            .accounts
            .login(&form.email, &form.password)
            .await
            .inspect_err(|e| warn!(error = %e, "Login failed"))?;
        let user = self.accounts.fetch_profile(&grant.token).await?;

        info!(user_id = %user.id, "User logged in");
        self.session.login(grant.token, user.clone());
        Ok(user)
    }

    /// Register a new account and sign it in
    #[instrument(skip(self, form), fields(email = %form.email))]
    pub async fn signup(&self, form: &SignupForm) -> SyncResult<User> {
        form.check()?;

        let grant = self.accounts.signup(form).await?;
        let user = match grant.user {
            Some(user) => user,
            None => self.accounts.fetch_profile(&grant.token).await?,
        };

        info!(user_id = %user.id, "User registered");
        self.session.login(grant.token, user.clone());
        Ok(user)
    }

    pub fn logout(&self) {
        self.session.logout();
    }

    /// Save changed profile fields; blank or unchanged values are not sent
    #[instrument(skip(self))]
    pub async fn update_profile(
        &self,
        username: Option<&str>,
        email: Option<&str>,
    ) -> SyncResult<ProfileUpdate> {
        let current = self.session.user().ok_or(DomainError::Unauthenticated)?;

        let changes = ProfileChanges::diff(&current, username, email);
        if changes.is_empty() {
            return Ok(ProfileUpdate::Unchanged);
        }
        changes.validate()?;

        let user = self.accounts.update_profile(&changes).await?;
        info!(user_id = %user.id, "Profile updated");
        self.session.update_user(user.clone());
        Ok(ProfileUpdate::Updated(user))
    }

    /// Replace the caller's profile picture
    #[instrument(skip(self, upload), fields(file_name = %upload.file_name, size = upload.bytes.len()))]
    pub async fn upload_profile_picture(&self, upload: &ImageUpload) -> SyncResult<User> {
        if !self.session.is_authenticated() {
            return Err(DomainError::Unauthenticated);
        }
        upload.check_picture(self.max_picture_bytes)?;

        let user = self.accounts.upload_profile_picture(upload).await?;
        info!(user_id = %user.id, "Profile picture updated");
        self.session.update_user(user.clone());
        Ok(user)
    }

    /// Someone's public profile; no sign-in needed
    pub async fn public_profile(&self, id: &UserId) -> SyncResult<User> {
        self.accounts.public_profile(id).await
    }
}
