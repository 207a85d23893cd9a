//! # blog-api
//!
//! REST adapter for the blog backend: an authenticated `reqwest` client, the wire DTOs and
//! their mappers, implementations of the domain ports, and page sources for the feeds.

pub mod client;
pub mod dto;
pub mod endpoints;
pub mod error;
pub mod mappers;
pub mod sources;

pub use client::ApiClient;
pub use error::{ApiError, ApiResult};
pub use mappers::{tally_from_wire, tally_to_wire};
pub use sources::{AuthorPosts, PostComments, PostListing};
