//! Client-side services
//!
//! Stores own client state and publish snapshots; flows orchestrate the ports, the
//! stores, and the ownership guard.

pub mod auth;
pub mod comments;
pub mod context;
pub mod feed;
pub mod posts;
pub mod reaction;

#[cfg(test)]
pub(crate) mod fakes;

use blog_core::DomainError;

/// Result type for service operations
pub type SyncResult<T> = Result<T, DomainError>;

// Re-export all services for convenience
pub use auth::{AuthService, ProfileUpdate};
pub use comments::CommentThread;
pub use context::SyncContext;
pub use feed::{MergeMode, Page, PaginatedFeed};
pub use posts::PostBoard;
pub use reaction::ReactionStore;
