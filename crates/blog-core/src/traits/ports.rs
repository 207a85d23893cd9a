//! Ports - the backend operations the stores depend on
//!
//! The stores only ever talk to these traits; the REST adapter provides the
//! implementation and tests provide in-memory fakes.

use std::fmt::Debug;

use async_trait::async_trait;

use crate::entities::{Comment, ImageUpload, Post, PostDraft, ProfileChanges, ReactionTally, SignupForm, User};
use crate::error::DomainError;
use crate::pagination::{Identified, PageResponse};
use crate::value_objects::{CommentId, PostId, ReactionKind, UserId};

/// Result type for port operations
pub type PortResult<T> = Result<T, DomainError>;

// ============================================================================
// Reactions
// ============================================================================

#[async_trait]
pub trait ReactionApi: Send + Sync {
    /// Toggle the caller's reaction and return the authoritative tally
    async fn toggle_reaction(&self, post_id: &PostId, kind: ReactionKind) -> PortResult<ReactionTally>;
}

// ============================================================================
// Posts and comments
// ============================================================================

#[async_trait]
pub trait PostApi: Send + Sync {
    async fn get_post(&self, id: &PostId) -> PortResult<Post>;

    async fn create_post(&self, draft: &PostDraft) -> PortResult<Post>;

    async fn update_post(&self, id: &PostId, draft: &PostDraft) -> PortResult<Post>;

    async fn delete_post(&self, id: &PostId) -> PortResult<()>;
}

#[async_trait]
pub trait CommentApi: Send + Sync {
    async fn create_comment(&self, post_id: &PostId, content: &str) -> PortResult<Comment>;

    async fn update_comment(&self, id: &CommentId, content: &str) -> PortResult<Comment>;

    async fn delete_comment(&self, id: &CommentId) -> PortResult<()>;
}

// ============================================================================
// Accounts
// ============================================================================

/// Result of a successful login or signup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthGrant {
    pub token: String,
    /// Present when the backend includes the user in the auth response
    pub user: Option<User>,
}

#[async_trait]
pub trait AccountApi: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> PortResult<AuthGrant>;

    async fn signup(&self, form: &SignupForm) -> PortResult<AuthGrant>;

    /// Fetch the profile belonging to `token`, independent of the current session
    async fn fetch_profile(&self, token: &str) -> PortResult<User>;

    async fn update_profile(&self, changes: &ProfileChanges) -> PortResult<User>;

    async fn upload_profile_picture(&self, upload: &ImageUpload) -> PortResult<User>;

    async fn public_profile(&self, id: &UserId) -> PortResult<User>;
}

// ============================================================================
// Paged collections
// ============================================================================

/// A paginated collection on the backend
#[async_trait]
pub trait PageSource: Send + Sync {
    type Item: Identified + Clone + Send + Sync + 'static;
    type Query: Clone + Default + Debug + Send + Sync + 'static;

    /// Fetch page `page` (1-based) holding at most `limit` items
    async fn fetch_page(
        &self,
        query: &Self::Query,
        page: u32,
        limit: u32,
    ) -> PortResult<PageResponse<Self::Item>>;
}
