//! # blog-core
//!
//! Domain layer for the blog client: identifiers, reaction tallies, posts and comments,
//! the ownership guard, pagination value types, and the port traits the REST adapter
//! implements. This crate has no knowledge of HTTP, configuration, or async runtimes.

pub mod entities;
pub mod error;
pub mod events;
pub mod ownership;
pub mod pagination;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    AuthorSummary, Comment, ImageSource, ImageUpload, LoginForm, Post, PostDraft, ProfileChanges,
    ReactionTally, SignupForm, User,
};
pub use error::{DomainError, FieldErrors};
pub use events::{TallyChanged, TallyPhase};
pub use ownership::{can_modify, require_owner, Authored};
pub use pagination::{total_pages_for, Identified, PageResponse};
pub use traits::{AccountApi, AuthGrant, CommentApi, PageSource, PortResult, PostApi, ReactionApi};
pub use value_objects::{CommentId, ParseReactionKindError, PostId, ReactionKind, UserId};
