//! Sync context - dependency container for the stores and flows
//!
//! Holds the shared session, the REST client, and the one reaction store every
//! post board writes into.

use std::sync::Arc;

use blog_api::{ApiClient, AuthorPosts, PostComments, PostListing};
use blog_common::{ClientConfig, FeedConfig, Session, UploadConfig};
use blog_core::{AccountApi, CommentApi, DomainError, PostApi, ReactionApi};

use super::auth::AuthService;
use super::comments::CommentThread;
use super::posts::PostBoard;
use super::reaction::ReactionStore;
use super::SyncResult;

/// Shared dependencies for building boards, threads, and the auth service
#[derive(Clone)]
pub struct SyncContext {
    session: Session,
    feeds: FeedConfig,
    uploads: UploadConfig,
    client: Arc<ApiClient>,
    reactions: Arc<ReactionStore>,
}

impl SyncContext {
    /// Create a context talking to the backend described by `config`
    pub fn new(config: &ClientConfig, session: Session) -> SyncResult<Self> {
        let client = ApiClient::new(&config.api, session.clone()).map_err(DomainError::from)?;
        let client = Arc::new(client);
        let reactions = Arc::new(ReactionStore::new(
            Arc::clone(&client) as Arc<dyn ReactionApi>,
            session.clone(),
        ));

        Ok(Self {
            session,
            feeds: config.feeds,
            uploads: config.uploads,
            client,
            reactions,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn client(&self) -> &Arc<ApiClient> {
        &self.client
    }

    pub fn reactions(&self) -> &Arc<ReactionStore> {
        &self.reactions
    }

    /// Home page listing with search
    pub fn post_board(&self) -> PostBoard<PostListing> {
        PostBoard::new(
            PostListing::new(Arc::clone(&self.client)),
            self.post_api(),
            Arc::clone(&self.reactions),
            self.session.clone(),
            self.feeds.posts_per_page,
        )
    }

    /// Posts of one author, as on a profile page
    pub fn author_posts(&self) -> PostBoard<AuthorPosts> {
        PostBoard::new(
            AuthorPosts::new(Arc::clone(&self.client)),
            self.post_api(),
            Arc::clone(&self.reactions),
            self.session.clone(),
            self.feeds.author_posts_per_page,
        )
    }

    pub fn comment_thread(&self) -> CommentThread<PostComments> {
        CommentThread::new(
            PostComments::new(Arc::clone(&self.client)),
            Arc::clone(&self.client) as Arc<dyn CommentApi>,
            self.session.clone(),
            self.feeds.comments_per_page,
        )
    }

    pub fn auth(&self) -> AuthService {
        AuthService::new(
            Arc::clone(&self.client) as Arc<dyn AccountApi>,
            self.session.clone(),
            self.uploads.max_picture_bytes,
        )
    }

    fn post_api(&self) -> Arc<dyn PostApi> {
        Arc::clone(&self.client) as Arc<dyn PostApi>
    }
}

impl std::fmt::Debug for SyncContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncContext")
            .field("base_url", &self.client.base_url())
            .field("feeds", &self.feeds)
            .field("authenticated", &self.session.is_authenticated())
            .finish_non_exhaustive()
    }
}
