//! Comment thread - load-more comments under one post, with add/edit/delete

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, instrument, warn};

use blog_common::Session;
use blog_core::{
    require_owner, Comment, CommentApi, CommentId, DomainError, FieldErrors, PageSource, PostId,
    UserId,
};

use super::feed::{MergeMode, Page, PaginatedFeed};
use super::SyncResult;

/// Comments of one post, loaded a page at a time
pub struct CommentThread<S>
where
    S: PageSource<Item = Comment, Query = PostId>,
{
    feed: PaginatedFeed<S>,
    comments: Arc<dyn CommentApi>,
    session: Session,
}

fn non_blank(content: &str) -> SyncResult<&str> {
    let content = content.trim();
    if content.is_empty() {
        let mut errors = FieldErrors::new();
        errors.add("content", "Comment cannot be empty");
        return Err(DomainError::Validation(errors));
    }
    Ok(content)
}

impl<S> CommentThread<S>
where
    S: PageSource<Item = Comment, Query = PostId>,
{
    pub fn new(source: S, comments: Arc<dyn CommentApi>, session: Session, page_size: u32) -> Self {
        Self {
            feed: PaginatedFeed::new(source, page_size, MergeMode::Append),
            comments,
            session,
        }
    }

    pub fn feed(&self) -> &PaginatedFeed<S> {
        &self.feed
    }

    pub fn post_id(&self) -> PostId {
        self.feed.query()
    }

    pub fn snapshot(&self) -> Page<Comment> {
        self.feed.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<Page<Comment>> {
        self.feed.subscribe()
    }

    /// Whether the signed-in user may edit or delete `comment`
    pub fn can_modify(&self, comment: &Comment) -> bool {
        self.session.can_modify(comment)
    }

    /// Show the comments of `post_id`, starting from the first page
    pub async fn open(&self, post_id: PostId) -> SyncResult<Page<Comment>> {
        self.feed.reset(post_id).await
    }

    pub async fn load_more(&self) -> SyncResult<Page<Comment>> {
        self.feed.load_more().await
    }

    /// Post a comment and reload the thread from its first page
    #[instrument(skip(self, content))]
    pub async fn add_comment(&self, content: &str) -> SyncResult<Comment> {
        if !self.session.is_authenticated() {
            return Err(DomainError::Unauthenticated);
        }
        let content = non_blank(content)?;
        let post_id = self.post_id();

        let comment = self.comments.create_comment(&post_id, content).await?;
        info!(post_id = %post_id, comment_id = %comment.id, "Comment added");

        if let Err(err) = self.feed.reset(post_id).await {
            warn!(comment_id = %comment.id, error = %err, "Comment saved but thread not reloaded");
        }
        Ok(comment)
    }

    /// Edit one of the signed-in user's comments in place
    #[instrument(skip(self, content))]
    pub async fn edit_comment(&self, id: &CommentId, content: &str) -> SyncResult<Comment> {
        let mut comment = self.owned_comment(id)?;
        let content = non_blank(content)?;

        let saved = self.comments.update_comment(id, content).await?;
        comment.edit(saved.content);
        if saved.updated_at.is_some() {
            comment.updated_at = saved.updated_at;
        }

        self.feed.upsert_item(comment.clone());
        info!(comment_id = %id, "Comment edited");
        Ok(comment)
    }

    /// Delete one of the signed-in user's comments
    #[instrument(skip(self))]
    pub async fn delete_comment(&self, id: &CommentId) -> SyncResult<()> {
        self.owned_comment(id)?;

        self.comments.delete_comment(id).await?;
        self.feed.remove_item(id);
        info!(comment_id = %id, "Comment deleted");
        Ok(())
    }

    fn owned_comment(&self, id: &CommentId) -> SyncResult<Comment> {
        let acting: Option<UserId> = self.session.current_user_id();
        if acting.is_none() {
            return Err(DomainError::Unauthenticated);
        }
        let comment = self
            .feed
            .find(id)
            .ok_or_else(|| DomainError::NotFound(format!("Comment {id}")))?;
        require_owner(acting.as_ref(), &comment)?;
        Ok(comment)
    }
}
