//! Markdown blog posts.
//!
//! Posts are loaded from `content/blog` once at startup. Each file carries
//! YAML frontmatter and a markdown body:
//!
//! ```markdown
//! ---
//! title: Spring restock
//! published_at: 2026-03-01
//! tags: [news]
//! ---
//!
//! The notebooks are back.
//! ```
//!
//! A `YYYY-MM-DD-` filename prefix is dropped from the slug.

use chrono::NaiveDate;
use comrak::{Options, markdown_to_html};
use gray_matter::{Matter, ParsedEntity, engine::YAML};
use regex::Regex;
use serde::Deserialize;
use std::path::Path;
use std::sync::{Arc, LazyLock};

/// Words per minute used for the reading-time estimate.
const WORDS_PER_MINUTE: usize = 200;

/// Metadata for blog posts
#[derive(Debug, Clone, Deserialize)]
pub struct PostMeta {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    pub published_at: NaiveDate,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub draft: bool,
}

/// A rendered blog post with metadata and HTML content
#[derive(Debug, Clone)]
pub struct Post {
    pub slug: String,
    pub meta: PostMeta,
    pub content_html: String,
    pub reading_time_minutes: u32,
}

/// All posts, newest first.
#[derive(Debug, Clone, Default)]
pub struct ContentStore {
    posts: Arc<Vec<Post>>,
}

impl ContentStore {
    /// Load posts from `<content_dir>/blog`.
    ///
    /// A missing directory yields an empty store. Files that fail to parse
    /// are logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory exists but cannot be read.
    pub fn load(content_dir: &Path) -> Result<Self, ContentError> {
        let dir = content_dir.join("blog");
        let mut posts = Vec::new();

        if !dir.exists() {
            tracing::info!("Blog directory does not exist yet: {:?}", dir);
            return Ok(Self::default());
        }

        let entries = std::fs::read_dir(&dir).map_err(|e| ContentError::Io(e.to_string()))?;

        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "md") {
                match load_post(&path) {
                    Ok(post) => {
                        tracing::info!("Loaded post: {}", post.slug);
                        posts.push(post);
                    }
                    Err(e) => {
                        tracing::error!("Failed to load post {:?}: {}", path, e);
                    }
                }
            }
        }

        Ok(Self::from_posts(posts))
    }

    /// Build a store from already-parsed posts.
    #[must_use]
    pub fn from_posts(mut posts: Vec<Post>) -> Self {
        posts.sort_by(|a, b| b.meta.published_at.cmp(&a.meta.published_at));
        Self {
            posts: Arc::new(posts),
        }
    }

    /// Get a published post by slug. Drafts are not served.
    #[must_use]
    pub fn get_post(&self, slug: &str) -> Option<&Post> {
        self.get_published_posts().find(|p| p.slug == slug)
    }

    /// Get all published blog posts (excludes drafts)
    pub fn get_published_posts(&self) -> impl Iterator<Item = &Post> {
        self.posts.iter().filter(|p| !p.meta.draft)
    }

    /// Get posts by tag
    pub fn get_posts_by_tag<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Post> {
        let tag_lower = tag.to_lowercase();
        self.get_published_posts()
            .filter(move |p| p.meta.tags.iter().any(|t| t.to_lowercase() == tag_lower))
    }
}

fn load_post(path: &Path) -> Result<Post, ContentError> {
    let content = std::fs::read_to_string(path).map_err(|e| ContentError::Io(e.to_string()))?;

    let filename = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| ContentError::Parse("Invalid filename".to_string()))?;

    parse_post(filename, &content)
}

/// Parse one markdown file into a post.
///
/// # Errors
///
/// Returns `ContentError::Parse` if the frontmatter is missing or malformed.
pub fn parse_post(filename: &str, content: &str) -> Result<Post, ContentError> {
    let matter = Matter::<YAML>::new();
    let parsed: ParsedEntity<PostMeta> = matter
        .parse(content)
        .map_err(|e| ContentError::Parse(format!("Failed to parse frontmatter: {e}")))?;
    let meta = parsed
        .data
        .ok_or_else(|| ContentError::Parse("Missing frontmatter".to_string()))?;

    Ok(Post {
        slug: slug_from_filename(filename).to_string(),
        meta,
        content_html: render_markdown(&parsed.content),
        reading_time_minutes: reading_time_minutes(&parsed.content),
    })
}

/// `2026-03-01-` style filename prefix.
static DATE_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}-").expect("Invalid regex"));

/// `2025-01-15-my-post` -> `my-post`.
fn slug_from_filename(filename: &str) -> &str {
    DATE_PREFIX_RE
        .find(filename)
        .and_then(|m| filename.get(m.end()..))
        .filter(|rest| !rest.is_empty())
        .unwrap_or(filename)
}

/// Rounded up, never less than one minute.
fn reading_time_minutes(markdown: &str) -> u32 {
    let words = markdown.split_whitespace().count();
    u32::try_from(words.div_ceil(WORDS_PER_MINUTE))
        .unwrap_or(u32::MAX)
        .max(1)
}

/// Render markdown to HTML with GitHub Flavored Markdown support.
pub(crate) fn render_markdown(content: &str) -> String {
    let mut options = Options::default();

    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options.extension.header_ids = Some(String::new());
    options.extension.footnotes = true;

    markdown_to_html(content, &options)
}

/// Content loading errors
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const POST: &str = "---\ntitle: Spring restock\npublished_at: 2026-03-01\ntags: [News, notebooks]\n---\n\nThe **notebooks** are back.\n";

    #[test]
    fn test_parse_frontmatter_and_body() {
        let post = parse_post("2026-03-01-spring-restock", POST).unwrap();

        assert_eq!(post.slug, "spring-restock");
        assert_eq!(post.meta.title, "Spring restock");
        assert_eq!(
            post.meta.published_at,
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
        );
        assert!(!post.meta.draft);
        assert!(post.content_html.contains("<strong>notebooks</strong>"));
        assert_eq!(post.reading_time_minutes, 1);
    }

    #[test]
    fn test_missing_frontmatter_is_error() {
        let result = parse_post("plain", "no frontmatter here");
        assert!(matches!(result, Err(ContentError::Parse(_))));
    }

    #[test]
    fn test_slug_keeps_undated_names() {
        assert_eq!(slug_from_filename("about-us"), "about-us");
        assert_eq!(slug_from_filename("2026-03-01-hello"), "hello");
        assert_eq!(slug_from_filename("2026-xx-01-hello"), "2026-xx-01-hello");
    }

    #[test]
    fn test_reading_time_rounds_up() {
        let words = "word ".repeat(401);
        assert_eq!(reading_time_minutes(&words), 3);
        assert_eq!(reading_time_minutes(""), 1);
    }

    #[test]
    fn test_drafts_hidden_and_newest_first() {
        let old = parse_post("old", "---\ntitle: Old\npublished_at: 2025-01-01\n---\nbody").unwrap();
        let new = parse_post("new", "---\ntitle: New\npublished_at: 2026-01-01\n---\nbody").unwrap();
        let draft = parse_post(
            "draft",
            "---\ntitle: Draft\npublished_at: 2026-06-01\ndraft: true\n---\nbody",
        )
        .unwrap();
        let store = ContentStore::from_posts(vec![old, draft, new]);

        let slugs: Vec<&str> = store.get_published_posts().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, ["new", "old"]);
        assert!(store.get_post("draft").is_none());
    }

    #[test]
    fn test_tag_filter_is_case_insensitive() {
        let store = ContentStore::from_posts(vec![parse_post("a", POST).unwrap()]);
        assert_eq!(store.get_posts_by_tag("news").count(), 1);
        assert_eq!(store.get_posts_by_tag("recipes").count(), 0);
    }
}
