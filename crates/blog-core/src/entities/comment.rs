//! Comment entity - a reply attached to a post

use chrono::{DateTime, Utc};

use crate::entities::AuthorSummary;
use crate::ownership::Authored;
use crate::pagination::Identified;
use crate::value_objects::{CommentId, PostId, UserId};

/// Comment entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: CommentId,
    pub post_id: PostId,
    pub content: String,
    pub author: Option<AuthorSummary>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Comment {
    /// Create a new Comment
    pub fn new(id: CommentId, post_id: PostId, content: String, author: Option<AuthorSummary>) -> Self {
        Self {
            id,
            post_id,
            content,
            author,
            created_at: Some(Utc::now()),
            updated_at: None,
        }
    }

    /// Check if comment has been edited
    #[inline]
    pub fn is_edited(&self) -> bool {
        match (self.created_at, self.updated_at) {
            (Some(created), Some(updated)) => updated > created,
            _ => false,
        }
    }

    /// Replace the comment content
    pub fn edit(&mut self, content: String) {
        self.content = content;
        self.updated_at = Some(Utc::now());
    }
}

impl Authored for Comment {
    fn author_id(&self) -> Option<&UserId> {
        self.author.as_ref().map(|author| &author.id)
    }
}

impl Identified for Comment {
    type Key = CommentId;

    fn key(&self) -> CommentId {
        self.id.clone()
    }
}
