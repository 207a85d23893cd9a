//! In-memory ports for service tests

use std::collections::{HashMap, VecDeque};
use std::fmt::Debug;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Notify;

use blog_core::{
    AccountApi, AuthGrant, AuthorSummary, Comment, CommentApi, CommentId, DomainError, Identified,
    ImageUpload, PageResponse, PageSource, PortResult, Post, PostApi, PostDraft, PostId,
    ProfileChanges, ReactionApi, ReactionKind, ReactionTally, SignupForm, User, UserId,
};

pub fn user(id: &str, name: &str) -> User {
    User::new(UserId::from(id), name)
}

pub fn post_by(id: &str, author: &str) -> Post {
    let mut post = Post::new(PostId::from(id), format!("Post {id}"), "body");
    post.author = Some(AuthorSummary::new(UserId::from(author), author));
    post
}

pub fn comment_by(id: &str, post: &str, author: &str) -> Comment {
    Comment::new(
        CommentId::from(id),
        PostId::from(post),
        format!("comment {id}"),
        Some(AuthorSummary::new(UserId::from(author), author)),
    )
}

// ============================================================================
// Reactions
// ============================================================================

/// Replies are queued; a gated fake waits for `release` before answering
#[derive(Default)]
pub struct FakeReactions {
    replies: Mutex<VecDeque<PortResult<ReactionTally>>>,
    gate: Option<Notify>,
    pub calls: AtomicUsize,
}

impl FakeReactions {
    pub fn gated() -> Self {
        Self {
            gate: Some(Notify::new()),
            ..Self::default()
        }
    }

    pub fn reply(&self, reply: PortResult<ReactionTally>) {
        self.replies.lock().push_back(reply);
    }

    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.notify_one();
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReactionApi for FakeReactions {
    async fn toggle_reaction(&self, _post_id: &PostId, _kind: ReactionKind) -> PortResult<ReactionTally> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.replies
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(DomainError::fetch("no reply queued")))
    }
}

// ============================================================================
// Pages
// ============================================================================

/// Serves pages out of a shared item list; individual pages can be held back or failed
pub struct FakePages<T, Q = String> {
    pub items: Arc<Mutex<Vec<T>>>,
    report_total_pages: bool,
    gates: Mutex<HashMap<u32, Arc<Notify>>>,
    failures: Mutex<VecDeque<u32>>,
    pub requests: Mutex<Vec<(Q, u32, u32)>>,
    _query: PhantomData<fn() -> Q>,
}

impl<T, Q> FakePages<T, Q> {
    pub fn new(items: Vec<T>) -> Self {
        Self::shared(Arc::new(Mutex::new(items)))
    }

    pub fn shared(items: Arc<Mutex<Vec<T>>>) -> Self {
        Self {
            items,
            report_total_pages: true,
            gates: Mutex::new(HashMap::new()),
            failures: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            _query: PhantomData,
        }
    }

    /// Omit `totalPages`, like `GET /posts`
    pub fn without_total_pages(mut self) -> Self {
        self.report_total_pages = false;
        self
    }

    /// Hold requests for `page` until the returned handle is notified
    pub fn hold(&self, page: u32) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.gates.lock().insert(page, Arc::clone(&gate));
        gate
    }

    /// Fail the next request for `page`
    pub fn fail(&self, page: u32) {
        self.failures.lock().push_back(page);
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl<T, Q> PageSource for FakePages<T, Q>
where
    T: Identified + Clone + Send + Sync + 'static,
    Q: Clone + Default + Debug + Send + Sync + 'static,
{
    type Item = T;
    type Query = Q;

    async fn fetch_page(&self, query: &Q, page: u32, limit: u32) -> PortResult<PageResponse<T>> {
        self.requests.lock().push((query.clone(), page, limit));

        let gate = self.gates.lock().get(&page).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let should_fail = {
            let mut failures = self.failures.lock();
            match failures.iter().position(|failed| *failed == page) {
                Some(index) => failures.remove(index).is_some(),
                None => false,
            }
        };
        if should_fail {
            return Err(DomainError::Fetch {
                status: Some(500),
                message: "Internal Server Error".to_string(),
            });
        }

        let items = self.items.lock();
        let start = (page.saturating_sub(1) * limit) as usize;
        let data = items
            .iter()
            .skip(start)
            .take(limit as usize)
            .cloned()
            .collect();
        let total = items.len() as u64;
        let total_pages = self
            .report_total_pages
            .then(|| blog_core::total_pages_for(total, limit));
        Ok(PageResponse::new(data, total, total_pages))
    }
}

// ============================================================================
// Posts and comments
// ============================================================================

/// Post port writing into the same list a `FakePages` serves
pub struct FakePosts {
    pub items: Arc<Mutex<Vec<Post>>>,
    pub author: User,
    next_id: AtomicUsize,
}

impl FakePosts {
    pub fn new(items: Arc<Mutex<Vec<Post>>>, author: User) -> Self {
        Self {
            items,
            author,
            next_id: AtomicUsize::new(100),
        }
    }
}

#[async_trait]
impl PostApi for FakePosts {
    async fn get_post(&self, id: &PostId) -> PortResult<Post> {
        self.items
            .lock()
            .iter()
            .find(|post| &post.id == id)
            .cloned()
            .ok_or_else(|| DomainError::NotFound("Post not found".to_string()))
    }

    async fn create_post(&self, draft: &PostDraft) -> PortResult<Post> {
        let id = format!("p{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        let mut post = Post::new(PostId::from(id), draft.title.clone(), draft.content.clone());
        post.author = Some(self.author.as_author());
        self.items.lock().insert(0, post.clone());
        Ok(post)
    }

    async fn update_post(&self, id: &PostId, draft: &PostDraft) -> PortResult<Post> {
        let mut items = self.items.lock();
        let post = items
            .iter_mut()
            .find(|post| &post.id == id)
            .ok_or_else(|| DomainError::NotFound("Post not found".to_string()))?;
        post.title.clone_from(&draft.title);
        post.content.clone_from(&draft.content);
        Ok(post.clone())
    }

    async fn delete_post(&self, id: &PostId) -> PortResult<()> {
        self.items.lock().retain(|post| &post.id != id);
        Ok(())
    }
}

/// Comment port writing into the same list a `FakePages` serves
pub struct FakeComments {
    pub items: Arc<Mutex<Vec<Comment>>>,
    pub author: User,
    next_id: AtomicUsize,
    pub calls: AtomicUsize,
}

impl FakeComments {
    pub fn new(items: Arc<Mutex<Vec<Comment>>>, author: User) -> Self {
        Self {
            items,
            author,
            next_id: AtomicUsize::new(100),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CommentApi for FakeComments {
    async fn create_comment(&self, post_id: &PostId, content: &str) -> PortResult<Comment> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let id = format!("c{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        let comment = Comment::new(
            CommentId::from(id),
            post_id.clone(),
            content.to_string(),
            Some(self.author.as_author()),
        );
        self.items.lock().insert(0, comment.clone());
        Ok(comment)
    }

    async fn update_comment(&self, id: &CommentId, content: &str) -> PortResult<Comment> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut items = self.items.lock();
        let comment = items
            .iter_mut()
            .find(|comment| &comment.id == id)
            .ok_or_else(|| DomainError::NotFound("Comment not found".to_string()))?;
        comment.edit(content.to_string());
        Ok(comment.clone())
    }

    async fn delete_comment(&self, id: &CommentId) -> PortResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.items.lock().retain(|comment| &comment.id != id);
        Ok(())
    }
}

// ============================================================================
// Accounts
// ============================================================================

pub struct FakeAccounts {
    pub user: Mutex<User>,
    pub password: String,
    pub calls: AtomicUsize,
    pub include_user_in_grant: bool,
}

impl FakeAccounts {
    pub fn new(user: User, password: &str) -> Self {
        Self {
            user: Mutex::new(user),
            password: password.to_string(),
            calls: AtomicUsize::new(0),
            include_user_in_grant: false,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn token_for(user: &User) -> String {
        format!("token-{}", user.id)
    }
}

#[async_trait]
impl AccountApi for FakeAccounts {
    async fn login(&self, email: &str, password: &str) -> PortResult<AuthGrant> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let user = self.user.lock().clone();
        if user.email.as_deref() != Some(email) || password != self.password {
            return Err(DomainError::Unauthenticated);
        }
        Ok(AuthGrant {
            token: Self::token_for(&user),
            user: self.include_user_in_grant.then_some(user),
        })
    }

    async fn signup(&self, form: &SignupForm) -> PortResult<AuthGrant> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut user = User::new(UserId::from("new-user"), form.username());
        user.email = Some(form.email.clone());
        *self.user.lock() = user.clone();
        Ok(AuthGrant {
            token: Self::token_for(&user),
            user: Some(user),
        })
    }

    async fn fetch_profile(&self, token: &str) -> PortResult<User> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let user = self.user.lock().clone();
        if token == Self::token_for(&user) {
            Ok(user)
        } else {
            Err(DomainError::Unauthenticated)
        }
    }

    async fn update_profile(&self, changes: &ProfileChanges) -> PortResult<User> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut user = self.user.lock();
        if let Some(username) = &changes.username {
            user.username.clone_from(username);
        }
        if let Some(email) = &changes.email {
            user.email = Some(email.clone());
        }
        Ok(user.clone())
    }

    async fn upload_profile_picture(&self, upload: &ImageUpload) -> PortResult<User> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut user = self.user.lock();
        user.profile_picture_url = Some(format!("/uploads/{}", upload.file_name));
        Ok(user.clone())
    }

    async fn public_profile(&self, id: &UserId) -> PortResult<User> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let user = self.user.lock().clone();
        if &user.id == id {
            Ok(User {
                email: None,
                ..user
            })
        } else {
            Err(DomainError::NotFound("User not found".to_string()))
        }
    }
}
