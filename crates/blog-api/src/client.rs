//! Authenticated HTTP client for the blog backend

use blog_common::{ApiConfig, Session};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::dto::ErrorBody;
use crate::error::{ApiError, ApiResult};

/// REST client bound to one backend and one session.
///
/// Every request carries `Authorization: Bearer <token>` while the session is signed in.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    config: ApiConfig,
    session: Session,
}

impl ApiClient {
    /// Create a client with the configured timeout
    pub fn new(config: &ApiConfig, session: Session) -> ApiResult<Self> {
        let http = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            http,
            config: config.clone(),
            session,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Start a request, attaching the session token when present
    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, self.config.url(path));
        match self.session.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Start a request with an explicit token, ignoring the session
    pub(crate) fn request_with_token(&self, method: Method, path: &str, token: &str) -> RequestBuilder {
        self.http
            .request(method, self.config.url(path))
            .bearer_auth(token)
    }

    /// Send and decode a JSON body
    pub(crate) async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> ApiResult<T> {
        let response = self.send(builder).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|err| ApiError::Decode(err.to_string()))
    }

    /// Send and discard the body
    pub(crate) async fn send_empty(&self, builder: RequestBuilder) -> ApiResult<()> {
        self.send(builder).await.map(drop)
    }

    async fn send(&self, builder: RequestBuilder) -> ApiResult<Response> {
        let response = builder.send().await?;
        let status = response.status();
        debug!(status = status.as_u16(), url = %response.url(), "Response received");

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let error_body: ErrorBody = serde_json::from_str(&body).unwrap_or_default();
        let message = error_body
            .summary()
            .or_else(|| status.canonical_reason().map(String::from))
            .unwrap_or_else(|| status.to_string());

        warn!(status = status.as_u16(), message = %message, "Request rejected");
        Err(ApiError::Status {
            status: status.as_u16(),
            message,
            details: error_body.message,
        })
    }
}
