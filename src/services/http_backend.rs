//! [`BookmarkApi`] speaking the bookmark server's REST API over HTTP.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::services::backend::BookmarkApi;
use crate::types::bookmark::{BookmarkRecord, TagUpdate};
use crate::types::errors::UpdateError;
use crate::types::form::UpdateBookmarkRequest;
use crate::types::settings::BackendSettings;

/// HTTP client for `{base}/api/v1/bookmarks`.
#[derive(Clone)]
pub struct HttpBookmarkApi {
    client: Client,
    base_url: Url,
    api_key: Option<String>,
}

impl HttpBookmarkApi {
    /// Builds a client from backend settings. The request timeout applies to
    /// every call.
    pub fn from_settings(settings: &BackendSettings) -> Result<Self, UpdateError> {
        let base_url = Url::parse(&settings.api_base_url).map_err(|e| {
            UpdateError::InvalidRequest(format!(
                "invalid api_base_url '{}': {}",
                settings.api_base_url, e
            ))
        })?;
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()
            .map_err(|e| UpdateError::Network(e.to_string()))?;
        Ok(Self {
            client,
            base_url,
            api_key: settings.api_key.clone(),
        })
    }

    /// URL of `segments` below `/api/v1/bookmarks`, percent-encoding each one.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, UpdateError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| {
                UpdateError::InvalidRequest(format!("base URL cannot have a path: {}", self.base_url))
            })?;
            path.pop_if_empty().extend(["api", "v1", "bookmarks"]);
            path.extend(segments);
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.api_key {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }

    async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<T, UpdateError> {
        debug!(%method, %url, "bookmark api request");
        let mut builder = self.request(method, url);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let response = builder
            .send()
            .await
            .map_err(|e| UpdateError::Network(describe_transport_error(&e)))?;
        let response = check_status(response).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| UpdateError::Decode(e.to_string()))
    }
}

#[async_trait]
impl BookmarkApi for HttpBookmarkApi {
    async fn fetch_bookmark(&self, bookmark_id: &str) -> Result<BookmarkRecord, UpdateError> {
        let url = self.endpoint(&[bookmark_id])?;
        self.send_json::<(), _>(Method::GET, url, None).await
    }

    async fn update_bookmark(
        &self,
        request: UpdateBookmarkRequest,
    ) -> Result<BookmarkRecord, UpdateError> {
        let url = self.endpoint(&[&request.bookmark_id])?;
        self.send_json(Method::PATCH, url, Some(&request)).await
    }

    async fn update_tags(
        &self,
        bookmark_id: &str,
        update: TagUpdate,
    ) -> Result<BookmarkRecord, UpdateError> {
        let url = self.endpoint(&[bookmark_id, "tags"])?;
        self.send_json::<TagUpdate, Value>(Method::POST, url, Some(&update))
            .await?;
        // The tags endpoint answers with the tag diff only; re-read the bookmark.
        self.fetch_bookmark(bookmark_id).await
    }
}

fn describe_transport_error(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        "network timeout".to_string()
    } else if err.is_connect() {
        format!("could not connect to bookmark server: {}", err)
    } else {
        err.to_string()
    }
}

/// Maps non-success responses to [`UpdateError`], preferring the server's message.
async fn check_status(response: Response) -> Result<Response, UpdateError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());
    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(UpdateError::NotFound(message));
    }
    Err(UpdateError::Rejected {
        status: status.as_u16(),
        message,
    })
}

/// Extracts `message` or `error` from a JSON error body, or the raw text.
pub fn error_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Object(map)) => ["message", "error"]
            .iter()
            .find_map(|k| map.get(*k).and_then(Value::as_str))
            .map(str::to_string),
        _ => Some(trimmed.to_string()),
    }
}
