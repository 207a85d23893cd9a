//! Backend endpoints and the domain port implementations

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use tracing::instrument;

use blog_core::{
    AccountApi, AuthGrant, Comment, CommentApi, CommentId, ImageSource, ImageUpload, PageResponse,
    PortResult, Post, PostApi, PostDraft, PostId, ProfileChanges, ReactionApi, ReactionKind,
    ReactionTally, SignupForm, User, UserId,
};

use crate::client::ApiClient;
use crate::dto::{
    AuthResponse, CommentDto, CommentRequest, LoginRequest, PageDto, PostDto, ProfileUpdateRequest,
    ReactRequest, ReactResponse, SignupRequest, UserDto,
};
use crate::error::ApiResult;
use crate::mappers::{comment_from_wire, post_from_wire, tally_from_wire, user_from_wire};

fn page_query(page: u32, limit: u32) -> Vec<(&'static str, String)> {
    vec![("page", page.to_string()), ("limit", limit.to_string())]
}

fn upload_part(upload: &ImageUpload) -> ApiResult<Part> {
    Ok(Part::bytes(upload.bytes.clone())
        .file_name(upload.file_name.clone())
        .mime_str(&upload.content_type)?)
}

fn post_form(draft: &PostDraft) -> ApiResult<Form> {
    let form = Form::new()
        .text("title", draft.title.clone())
        .text("content", draft.content.clone());

    Ok(match &draft.image {
        ImageSource::None => form,
        ImageSource::Url(url) => form.text("imageUrl", url.clone()),
        ImageSource::Upload(upload) => form.part("image", upload_part(upload)?),
    })
}

// ============================================================================
// Listings
// ============================================================================

impl ApiClient {
    /// `GET /posts?page&limit[&search]`
    #[instrument(skip(self))]
    pub async fn list_posts(&self, search: &str, page: u32, limit: u32) -> ApiResult<PageResponse<Post>> {
        let mut query = page_query(page, limit);
        let search = search.trim();
        if !search.is_empty() {
            query.push(("search", search.to_string()));
        }

        let page: PageDto<PostDto> = self
            .send_json(self.request(Method::GET, "/posts").query(&query))
            .await?;
        Ok(PageResponse::new(
            page.data.into_iter().map(post_from_wire).collect(),
            page.total,
            page.total_pages,
        ))
    }

    /// `GET /posts/author/{id}?page&limit`
    #[instrument(skip(self))]
    pub async fn posts_by_author(&self, author_id: &UserId, page: u32, limit: u32) -> ApiResult<PageResponse<Post>> {
        let path = format!("/posts/author/{author_id}");
        let page: PageDto<PostDto> = self
            .send_json(self.request(Method::GET, &path).query(&page_query(page, limit)))
            .await?;
        Ok(PageResponse::new(
            page.data.into_iter().map(post_from_wire).collect(),
            page.total,
            page.total_pages,
        ))
    }

    /// `GET /posts/{id}/comments?page&limit`
    #[instrument(skip(self))]
    pub async fn list_comments(&self, post_id: &PostId, page: u32, limit: u32) -> ApiResult<PageResponse<Comment>> {
        let path = format!("/posts/{post_id}/comments");
        let page: PageDto<CommentDto> = self
            .send_json(self.request(Method::GET, &path).query(&page_query(page, limit)))
            .await?;
        Ok(PageResponse::new(
            page.data
                .into_iter()
                .map(|dto| comment_from_wire(dto, Some(post_id)))
                .collect(),
            page.total,
            page.total_pages,
        ))
    }

    /// `GET /comments/{id}`
    #[instrument(skip(self))]
    pub async fn get_comment(&self, id: &CommentId) -> ApiResult<Comment> {
        let path = format!("/comments/{id}");
        let dto: CommentDto = self.send_json(self.request(Method::GET, &path)).await?;
        Ok(comment_from_wire(dto, None))
    }

    /// `GET /users/profile` for the current session
    #[instrument(skip(self))]
    pub async fn own_profile(&self) -> ApiResult<User> {
        let dto: UserDto = self
            .send_json(self.request(Method::GET, "/users/profile"))
            .await?;
        Ok(user_from_wire(dto))
    }
}

// ============================================================================
// Ports
// ============================================================================

#[async_trait]
impl ReactionApi for ApiClient {
    #[instrument(skip(self))]
    async fn toggle_reaction(&self, post_id: &PostId, kind: ReactionKind) -> PortResult<ReactionTally> {
        let path = format!("/posts/{post_id}/react");
        let body = ReactRequest { kind: kind.as_str() };
        let response: ReactResponse = self
            .send_json(self.request(Method::POST, &path).json(&body))
            .await?;

        Ok(tally_from_wire(
            &response.post.reaction_counts,
            response.current_user_reaction.as_deref(),
        ))
    }
}

#[async_trait]
impl PostApi for ApiClient {
    #[instrument(skip(self))]
    async fn get_post(&self, id: &PostId) -> PortResult<Post> {
        let path = format!("/posts/{id}");
        let dto: PostDto = self.send_json(self.request(Method::GET, &path)).await?;
        Ok(post_from_wire(dto))
    }

    #[instrument(skip(self, draft), fields(title = %draft.title))]
    async fn create_post(&self, draft: &PostDraft) -> PortResult<Post> {
        let form = post_form(draft)?;
        let dto: PostDto = self
            .send_json(self.request(Method::POST, "/posts").multipart(form))
            .await?;
        Ok(post_from_wire(dto))
    }

    #[instrument(skip(self, draft))]
    async fn update_post(&self, id: &PostId, draft: &PostDraft) -> PortResult<Post> {
        let path = format!("/posts/{id}");
        let form = post_form(draft)?;
        let dto: PostDto = self
            .send_json(self.request(Method::PUT, &path).multipart(form))
            .await?;
        Ok(post_from_wire(dto))
    }

    #[instrument(skip(self))]
    async fn delete_post(&self, id: &PostId) -> PortResult<()> {
        let path = format!("/posts/{id}");
        self.send_empty(self.request(Method::DELETE, &path)).await?;
        Ok(())
    }
}

#[async_trait]
impl CommentApi for ApiClient {
    #[instrument(skip(self, content))]
    async fn create_comment(&self, post_id: &PostId, content: &str) -> PortResult<Comment> {
        let path = format!("/posts/{post_id}/comments");
        let dto: CommentDto = self
            .send_json(
                self.request(Method::POST, &path)
                    .json(&CommentRequest { content }),
            )
            .await?;
        Ok(comment_from_wire(dto, Some(post_id)))
    }

    #[instrument(skip(self, content))]
    async fn update_comment(&self, id: &CommentId, content: &str) -> PortResult<Comment> {
        let path = format!("/comments/{id}");
        let dto: CommentDto = self
            .send_json(
                self.request(Method::PUT, &path)
                    .json(&CommentRequest { content }),
            )
            .await?;
        Ok(comment_from_wire(dto, None))
    }

    #[instrument(skip(self))]
    async fn delete_comment(&self, id: &CommentId) -> PortResult<()> {
        let path = format!("/comments/{id}");
        self.send_empty(self.request(Method::DELETE, &path)).await?;
        Ok(())
    }
}

#[async_trait]
impl AccountApi for ApiClient {
    #[instrument(skip(self, password))]
    async fn login(&self, email: &str, password: &str) -> PortResult<AuthGrant> {
        let response: AuthResponse = self
            .send_json(
                self.request(Method::POST, "/auth/login")
                    .json(&LoginRequest { email, password }),
            )
            .await?;
        Ok(AuthGrant {
            token: response.access_token,
            user: response.user.map(user_from_wire),
        })
    }

    #[instrument(skip(self, form), fields(email = %form.email))]
    async fn signup(&self, form: &SignupForm) -> PortResult<AuthGrant> {
        let body = SignupRequest {
            username: form.username(),
            email: form.email.trim(),
            password: &form.password,
        };
        let response: AuthResponse = self
            .send_json(self.request(Method::POST, "/auth/signup").json(&body))
            .await?;
        Ok(AuthGrant {
            token: response.access_token,
            user: response.user.map(user_from_wire),
        })
    }

    #[instrument(skip(self, token))]
    async fn fetch_profile(&self, token: &str) -> PortResult<User> {
        let dto: UserDto = self
            .send_json(self.request_with_token(Method::GET, "/users/profile", token))
            .await?;
        Ok(user_from_wire(dto))
    }

    #[instrument(skip(self))]
    async fn update_profile(&self, changes: &ProfileChanges) -> PortResult<User> {
        let body = ProfileUpdateRequest {
            username: changes.username.as_deref(),
            email: changes.email.as_deref(),
        };
        let dto: UserDto = self
            .send_json(self.request(Method::PUT, "/users/profile").json(&body))
            .await?;
        Ok(user_from_wire(dto))
    }

    #[instrument(skip(self, upload), fields(file_name = %upload.file_name))]
    async fn upload_profile_picture(&self, upload: &ImageUpload) -> PortResult<User> {
        let form = Form::new().part("profilePicture", upload_part(upload)?);
        let dto: UserDto = self
            .send_json(
                self.request(Method::POST, "/users/profile/picture")
                    .multipart(form),
            )
            .await?;
        Ok(user_from_wire(dto))
    }

    #[instrument(skip(self))]
    async fn public_profile(&self, id: &UserId) -> PortResult<User> {
        let path = format!("/users/{id}/profile");
        let dto: UserDto = self.send_json(self.request(Method::GET, &path)).await?;
        Ok(user_from_wire(dto))
    }
}
