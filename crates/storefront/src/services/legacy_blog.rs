//! Read-only client for the legacy Firestore blog.
//!
//! Old posts still live in a Firestore `posts` collection. They are fetched
//! through the Firestore REST API, rendered from markdown, and cached for
//! 5 minutes.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use moka::future::Cache;
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::content::render_markdown;

const FIRESTORE_BASE: &str = "https://firestore.googleapis.com/v1";

/// Errors from the legacy blog.
#[derive(Debug, Error)]
pub enum LegacyBlogError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Firestore returned an error status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// No document with this id.
    #[error("Post not found: {0}")]
    NotFound(String),

    /// The document is missing a field we need.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// A post from the legacy blog, ready to render.
#[derive(Debug, Clone)]
pub struct LegacyPost {
    pub id: String,
    pub title: String,
    pub author: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub content_html: String,
}

/// Raw Firestore document.
#[derive(Debug, Deserialize)]
struct Document {
    #[serde(default)]
    fields: HashMap<String, serde_json::Value>,
    #[serde(rename = "createTime")]
    create_time: Option<DateTime<Utc>>,
}

impl Document {
    /// Firestore wraps every value in a typed object: `{"stringValue": "..."}`.
    fn string(&self, key: &str) -> Option<&str> {
        self.fields.get(key)?.get("stringValue")?.as_str()
    }

    fn timestamp(&self, key: &str) -> Option<DateTime<Utc>> {
        let raw = self.fields.get(key)?.get("timestampValue")?.as_str()?;
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

/// Turn a Firestore document into a rendered post.
fn parse_document(id: &str, document: &Document) -> Result<LegacyPost, LegacyBlogError> {
    let title = document
        .string("title")
        .ok_or_else(|| LegacyBlogError::Parse(format!("post {id} has no title")))?;
    let body = document
        .string("content")
        .or_else(|| document.string("body"))
        .unwrap_or_default();

    Ok(LegacyPost {
        id: id.to_string(),
        title: title.to_string(),
        author: document.string("author").map(String::from),
        published_at: document
            .timestamp("createdAt")
            .or(document.create_time),
        content_html: render_markdown(body),
    })
}

/// Firestore document ids never contain `/`; anything else is passed through.
fn is_valid_document_id(id: &str) -> bool {
    !id.is_empty() && !id.contains('/') && id != "." && id != ".."
}

/// Client for legacy Firestore posts.
#[derive(Clone)]
pub struct LegacyBlogClient {
    inner: Arc<LegacyBlogClientInner>,
}

struct LegacyBlogClientInner {
    client: reqwest::Client,
    collection_url: String,
    cache: Cache<String, Arc<LegacyPost>>,
}

impl LegacyBlogClient {
    /// Create a client for the given Firebase project.
    #[must_use]
    pub fn new(project_id: &str) -> Self {
        Self::with_base_url(FIRESTORE_BASE, project_id)
    }

    /// Create a client against a different Firestore endpoint (emulator).
    #[must_use]
    pub fn with_base_url(base_url: &str, project_id: &str) -> Self {
        let cache = Cache::builder()
            .max_capacity(500)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Self {
            inner: Arc::new(LegacyBlogClientInner {
                client: reqwest::Client::new(),
                collection_url: format!(
                    "{}/projects/{project_id}/databases/(default)/documents/posts",
                    base_url.trim_end_matches('/')
                ),
                cache,
            }),
        }
    }

    /// Fetch a post by document id.
    ///
    /// # Errors
    ///
    /// Returns `LegacyBlogError::NotFound` if the document does not exist,
    /// or another error if Firestore cannot be reached or parsed.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn get_post(&self, id: &str) -> Result<Arc<LegacyPost>, LegacyBlogError> {
        if !is_valid_document_id(id) {
            return Err(LegacyBlogError::NotFound(id.to_string()));
        }

        if let Some(post) = self.inner.cache.get(id).await {
            debug!("Cache hit for legacy post");
            return Ok(post);
        }

        let response = self
            .inner
            .client
            .get(format!("{}/{id}", self.inner.collection_url))
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(LegacyBlogError::NotFound(id.to_string()));
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(LegacyBlogError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let document: Document = response
            .json()
            .await
            .map_err(|e| LegacyBlogError::Parse(e.to_string()))?;
        let post = Arc::new(parse_document(id, &document)?);

        self.inner
            .cache
            .insert(id.to_string(), Arc::clone(&post))
            .await;

        Ok(post)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn document(json: &str) -> Document {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_parse_document_fields() {
        let doc = document(
            r#"{
                "name": "projects/p/databases/(default)/documents/posts/abc",
                "fields": {
                    "title": {"stringValue": "First light"},
                    "author": {"stringValue": "Ren"},
                    "content": {"stringValue": "Hello *world*"},
                    "createdAt": {"timestampValue": "2019-04-02T10:00:00Z"}
                },
                "createTime": "2019-04-02T10:00:01.123456Z"
            }"#,
        );

        let post = parse_document("abc", &doc).unwrap();

        assert_eq!(post.title, "First light");
        assert_eq!(post.author.as_deref(), Some("Ren"));
        assert!(post.content_html.contains("<em>world</em>"));
        assert_eq!(
            post.published_at.unwrap().to_rfc3339(),
            "2019-04-02T10:00:00+00:00"
        );
    }

    #[test]
    fn test_falls_back_to_create_time() {
        let doc = document(
            r#"{"fields": {"title": {"stringValue": "t"}}, "createTime": "2020-01-01T00:00:00Z"}"#,
        );
        let post = parse_document("x", &doc).unwrap();
        assert_eq!(post.published_at.unwrap().to_rfc3339(), "2020-01-01T00:00:00+00:00");
        assert_eq!(post.content_html, "");
    }

    #[test]
    fn test_missing_title_is_parse_error() {
        let doc = document(r#"{"fields": {"content": {"stringValue": "body"}}}"#);
        assert!(matches!(
            parse_document("x", &doc),
            Err(LegacyBlogError::Parse(_))
        ));
    }

    #[test]
    fn test_document_id_validation() {
        assert!(is_valid_document_id("abc123"));
        assert!(!is_valid_document_id(""));
        assert!(!is_valid_document_id("a/b"));
        assert!(!is_valid_document_id(".."));
    }
}
