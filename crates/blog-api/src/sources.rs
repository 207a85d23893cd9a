//! Page sources backing the feeds

use std::sync::Arc;

use async_trait::async_trait;

use blog_core::{Comment, PageResponse, PageSource, PortResult, Post, PostId, UserId};

use crate::client::ApiClient;

/// All posts, optionally filtered by a search term (empty = no filter)
#[derive(Debug, Clone)]
pub struct PostListing {
    client: Arc<ApiClient>,
}

impl PostListing {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageSource for PostListing {
    type Item = Post;
    type Query = String;

    async fn fetch_page(&self, search: &String, page: u32, limit: u32) -> PortResult<PageResponse<Post>> {
        Ok(self.client.list_posts(search, page, limit).await?)
    }
}

/// Posts written by one author
#[derive(Debug, Clone)]
pub struct AuthorPosts {
    client: Arc<ApiClient>,
}

impl AuthorPosts {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageSource for AuthorPosts {
    type Item = Post;
    type Query = UserId;

    async fn fetch_page(&self, author_id: &UserId, page: u32, limit: u32) -> PortResult<PageResponse<Post>> {
        Ok(self.client.posts_by_author(author_id, page, limit).await?)
    }
}

/// Comments on one post
#[derive(Debug, Clone)]
pub struct PostComments {
    client: Arc<ApiClient>,
}

impl PostComments {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageSource for PostComments {
    type Item = Comment;
    type Query = PostId;

    async fn fetch_page(&self, post_id: &PostId, page: u32, limit: u32) -> PortResult<PageResponse<Comment>> {
        Ok(self.client.list_comments(post_id, page, limit).await?)
    }
}
