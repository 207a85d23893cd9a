//! Post board - a page-jump feed of posts plus the reaction state of each post shown

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, instrument, warn};

use blog_common::Session;
use blog_core::{
    require_owner, DomainError, PageSource, Post, PostApi, PostDraft, PostId, ReactionKind,
    ReactionTally,
};

use super::feed::{MergeMode, Page, PaginatedFeed};
use super::reaction::ReactionStore;
use super::SyncResult;

/// Paged posts with create/edit/delete and reactions
pub struct PostBoard<S>
where
    S: PageSource<Item = Post>,
{
    feed: PaginatedFeed<S>,
    posts: Arc<dyn PostApi>,
    reactions: Arc<ReactionStore>,
    session: Session,
}

impl<S> PostBoard<S>
where
    S: PageSource<Item = Post>,
{
    pub fn new(
        source: S,
        posts: Arc<dyn PostApi>,
        reactions: Arc<ReactionStore>,
        session: Session,
        page_size: u32,
    ) -> Self {
        Self {
            feed: PaginatedFeed::new(source, page_size, MergeMode::Replace),
            posts,
            reactions,
            session,
        }
    }

    pub fn feed(&self) -> &PaginatedFeed<S> {
        &self.feed
    }

    pub fn reactions(&self) -> &Arc<ReactionStore> {
        &self.reactions
    }

    pub fn snapshot(&self) -> Page<Post> {
        self.feed.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<Page<Post>> {
        self.feed.subscribe()
    }

    /// Whether the signed-in user may edit or delete `post`
    pub fn can_modify(&self, post: &Post) -> bool {
        self.session.can_modify(post)
    }

    /// Show the first page for `query`
    pub async fn load(&self, query: S::Query) -> SyncResult<Page<Post>> {
        let page = self.feed.reset(query).await?;
        Ok(self.seed(page))
    }

    pub async fn go_to_page(&self, n: u32) -> SyncResult<Page<Post>> {
        let page = self.feed.go_to_page(n).await?;
        Ok(self.seed(page))
    }

    pub async fn refresh(&self) -> SyncResult<Page<Post>> {
        let page = self.feed.refresh().await?;
        Ok(self.seed(page))
    }

    /// Fetch a single post and track its reactions
    #[instrument(skip(self))]
    pub async fn open_post(&self, id: &PostId) -> SyncResult<Post> {
        let post = self.posts.get_post(id).await?;
        self.reactions.track_post(&post);
        Ok(post)
    }

    /// Tally currently shown for a post
    pub fn tally(&self, id: &PostId) -> Option<ReactionTally> {
        self.reactions.get(id)
    }

    /// Toggle a reaction on a post for the signed-in user
    pub async fn toggle_reaction(&self, id: &PostId, kind: ReactionKind) -> SyncResult<ReactionTally> {
        self.reactions.toggle(id, kind).await
    }

    /// Publish a post and go back to the first page
    #[instrument(skip(self, draft), fields(title = %draft.title))]
    pub async fn create_post(&self, draft: &PostDraft) -> SyncResult<Post> {
        if !self.session.is_authenticated() {
            return Err(DomainError::Unauthenticated);
        }
        draft.check()?;

        let post = self.posts.create_post(draft).await?;
        info!(post_id = %post.id, "Post created");

        self.show_first_page().await;
        Ok(post)
    }

    /// Edit one of the signed-in user's posts, then refresh the current page
    #[instrument(skip(self, draft))]
    pub async fn update_post(&self, id: &PostId, draft: &PostDraft) -> SyncResult<Post> {
        self.owned_post(id).await?;
        draft.check()?;

        let post = self.posts.update_post(id, draft).await?;
        info!(post_id = %post.id, "Post updated");

        self.feed.upsert_item(post.clone());
        self.reactions.track_post(&post);
        if let Err(err) = self.refresh().await {
            warn!(post_id = %post.id, error = %err, "Post saved but listing not refreshed");
        }
        Ok(post)
    }

    /// Delete one of the signed-in user's posts and go back to the first page
    #[instrument(skip(self))]
    pub async fn delete_post(&self, id: &PostId) -> SyncResult<()> {
        self.owned_post(id).await?;

        self.posts.delete_post(id).await?;
        info!(post_id = %id, "Post deleted");

        self.reactions.forget(id);
        self.show_first_page().await;
        Ok(())
    }

    /// Look up a post (listed or fetched) and check the signed-in user wrote it
    async fn owned_post(&self, id: &PostId) -> SyncResult<Post> {
        let acting = self.session.current_user_id();
        if acting.is_none() {
            return Err(DomainError::Unauthenticated);
        }
        let post = match self.feed.find(id) {
            Some(post) => post,
            None => self.posts.get_post(id).await?,
        };
        require_owner(acting.as_ref(), &post)?;
        Ok(post)
    }

    /// Jump back to page 1 after a write; a failed fetch leaves the previous page in place
    async fn show_first_page(&self) {
        if let Err(err) = self.go_to_page(1).await {
            warn!(error = %err, "Listing not refreshed after write");
        }
    }

    fn seed(&self, page: Page<Post>) -> Page<Post> {
        for post in &page.items {
            self.reactions.track_post(post);
        }
        page
    }
}

impl<S> PostBoard<S>
where
    S: PageSource<Item = Post, Query = String>,
{
    /// Search posts; always starts from the first page
    pub async fn search(&self, term: &str) -> SyncResult<Page<Post>> {
        self.load(term.trim().to_string()).await
    }
}
