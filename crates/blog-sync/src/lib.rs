//! # blog-sync
//!
//! Application layer: the optimistic reaction store, paginated feeds, and the post,
//! comment, and account flows built on top of them.

pub mod services;

pub use services::{
    AuthService, CommentThread, MergeMode, Page, PaginatedFeed, PostBoard,
    ProfileUpdate, ReactionStore, SyncContext, SyncResult,
};
