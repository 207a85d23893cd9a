//! Test helpers for integration tests
//!
//! Builds client configuration and sync contexts pointed at a running [`FakeBackend`],
//! and makes raw requests for checking what the server stored.

use anyhow::Result;
use blog_common::{try_init_tracing_with_config, ClientConfig, Session, TracingConfig};
use blog_sync::SyncContext;
use reqwest::StatusCode;
use serde_json::Value;

use crate::backend::FakeBackend;

/// Client configuration for `backend` with small page sizes
pub fn test_config(backend: &FakeBackend) -> Result<ClientConfig> {
    let base_url = backend.base_url();
    let config = ClientConfig::from_lookup(|key| match key {
        "API_BASE_URL" => Some(base_url.clone()),
        "API_TIMEOUT_SECS" => Some("5".to_string()),
        "POSTS_PER_PAGE" => Some("3".to_string()),
        "AUTHOR_POSTS_PER_PAGE" => Some("2".to_string()),
        "COMMENTS_PER_PAGE" => Some("2".to_string()),
        "MAX_PICTURE_BYTES" => Some("1024".to_string()),
        _ => None,
    })
    .map_err(|e| anyhow::anyhow!("Config error: {e}"))?;
    Ok(config)
}

/// Anonymous context talking to `backend`
pub fn context(backend: &FakeBackend) -> Result<SyncContext> {
    let config = test_config(backend)?;
    // Only the first test in the process installs the subscriber
    try_init_tracing_with_config(TracingConfig::for_environment(config.app.env)).ok();
    Ok(SyncContext::new(&config, Session::new())?)
}

/// Context signed in through the login flow
pub async fn signed_in(backend: &FakeBackend, email: &str, password: &str) -> Result<SyncContext> {
    let ctx = context(backend)?;
    ctx.auth().login(email, password).await?;
    Ok(ctx)
}

/// GET `path` without credentials and parse the JSON body
pub async fn get_json(backend: &FakeBackend, path: &str) -> Result<Value> {
    let response = reqwest::get(format!("{}{path}", backend.base_url())).await?;
    let status = response.status();
    if status != StatusCode::OK {
        let body = response.text().await?;
        anyhow::bail!("Expected status {}, got {status}. Body: {body}", StatusCode::OK);
    }
    Ok(response.json().await?)
}
