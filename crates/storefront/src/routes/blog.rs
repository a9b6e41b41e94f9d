//! Blog route handlers.
//!
//! `/blog` serves the markdown posts bundled with the site;
//! `/blog/archive/{id}` serves posts from the legacy Firestore blog.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use tracing::instrument;

use crate::content::Post;
use crate::error::{AppError, Result};
use crate::filters;
use crate::state::AppState;

/// Post view for templates.
#[derive(Clone)]
pub struct PostView {
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub author: Option<String>,
    pub published_at: NaiveDate,
    pub tags: Vec<String>,
    pub content_html: String,
    pub reading_time_minutes: u32,
}

impl From<&Post> for PostView {
    fn from(post: &Post) -> Self {
        Self {
            slug: post.slug.clone(),
            title: post.meta.title.clone(),
            description: post.meta.description.clone(),
            author: post.meta.author.clone(),
            published_at: post.meta.published_at,
            tags: post.meta.tags.clone(),
            content_html: post.content_html.clone(),
            reading_time_minutes: post.reading_time_minutes,
        }
    }
}

/// Blog index page template.
#[derive(Template, WebTemplate)]
#[template(path = "blog/index.html")]
pub struct BlogIndexTemplate {
    pub posts: Vec<PostView>,
    pub tag: Option<String>,
    pub base_url: String,
}

/// Blog post detail template.
#[derive(Template, WebTemplate)]
#[template(path = "blog/show.html")]
pub struct BlogShowTemplate {
    pub post: PostView,
    pub base_url: String,
}

/// Legacy archive post template.
#[derive(Template, WebTemplate)]
#[template(path = "blog/archive.html")]
pub struct ArchivePostTemplate {
    pub title: String,
    pub author: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub content_html: String,
    pub base_url: String,
}

/// `?tag=news`
#[derive(Debug, Deserialize)]
pub struct IndexQuery {
    pub tag: Option<String>,
}

/// Display the blog index page with all published posts.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<IndexQuery>,
) -> impl IntoResponse {
    let tag = query.tag.filter(|t| !t.trim().is_empty());
    let posts: Vec<PostView> = match tag.as_deref() {
        Some(tag) => state
            .content()
            .get_posts_by_tag(tag)
            .map(PostView::from)
            .collect(),
        None => state
            .content()
            .get_published_posts()
            .map(PostView::from)
            .collect(),
    };

    BlogIndexTemplate {
        posts,
        tag,
        base_url: state.config().base_url.clone(),
    }
}

/// Display a single blog post by slug.
///
/// # Errors
///
/// Returns 404 if the post doesn't exist or is a draft.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> std::result::Result<impl IntoResponse, StatusCode> {
    let post = state
        .content()
        .get_post(&slug)
        .ok_or(StatusCode::NOT_FOUND)?;

    Ok(BlogShowTemplate {
        post: PostView::from(post),
        base_url: state.config().base_url.clone(),
    })
}

/// Display a post from the legacy blog.
///
/// # Errors
///
/// Returns 404 when the legacy blog is not configured or has no such post.
#[instrument(skip(state))]
pub async fn archive(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let client = state
        .legacy_blog()
        .ok_or_else(|| AppError::NotFound("Legacy blog is not configured".to_string()))?;
    let post = client.get_post(&id).await?;

    Ok(ArchivePostTemplate {
        title: post.title.clone(),
        author: post.author.clone(),
        published_at: post.published_at,
        content_html: post.content_html.clone(),
        base_url: state.config().base_url.clone(),
    })
}

/// Create the blog routes router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/blog", get(index))
        .route("/blog/{slug}", get(show))
        .route("/blog/archive/{id}", get(archive))
}
