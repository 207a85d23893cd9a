//! User entity - a blog account as the client sees it

use chrono::{DateTime, Utc};

use crate::value_objects::UserId;

/// User entity
///
/// `email` is only present on the caller's own profile; public profiles omit it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: Option<String>,
    pub profile_picture_url: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    /// Create a new User with required fields
    pub fn new(id: UserId, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            email: None,
            profile_picture_url: None,
            created_at: None,
        }
    }

    /// First letter of the username, uppercased, for avatar placeholders
    pub fn initial(&self) -> Option<char> {
        self.username.chars().next().map(|c| c.to_ascii_uppercase())
    }

    /// Summary used when this user appears as an author
    pub fn as_author(&self) -> AuthorSummary {
        AuthorSummary {
            id: self.id.clone(),
            username: self.username.clone(),
            profile_picture_url: self.profile_picture_url.clone(),
        }
    }
}

/// Author block embedded in posts and comments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorSummary {
    pub id: UserId,
    pub username: String,
    pub profile_picture_url: Option<String>,
}

impl AuthorSummary {
    pub fn new(id: UserId, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            profile_picture_url: None,
        }
    }
}
