//! Markdown content: the about page and the blog.
//!
//! Files are read once at startup from `<content_dir>/pages/*.md` and
//! `<content_dir>/blog/*.md`. Each starts with YAML front matter; the body is
//! rendered with GitHub-flavoured markdown.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDate;
use comrak::{Options, markdown_to_html};
use gray_matter::{Matter, ParsedEntity, engine::YAML};
use serde::Deserialize;
use serde::de::DeserializeOwned;

/// Words per minute used for the reading-time estimate.
const WORDS_PER_MINUTE: usize = 200;

/// Front matter of a static page.
#[derive(Debug, Clone, Deserialize)]
pub struct PageMeta {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Optional banner image (normalized like catalog images).
    #[serde(default)]
    pub image: Option<String>,
}

/// Front matter of a blog post.
#[derive(Debug, Clone, Deserialize)]
pub struct PostMeta {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    pub published_at: NaiveDate,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub draft: bool,
}

#[derive(Debug, Clone)]
pub struct Page {
    pub slug: String,
    pub meta: PageMeta,
    pub content_html: String,
}

#[derive(Debug, Clone)]
pub struct Post {
    pub slug: String,
    pub meta: PostMeta,
    pub content_html: String,
    pub reading_time_minutes: usize,
}

/// In-memory store of rendered content. Cheap to clone.
#[derive(Debug, Clone, Default)]
pub struct ContentStore {
    pages: Arc<HashMap<String, Page>>,
    posts: Arc<Vec<Post>>,
}

impl ContentStore {
    /// Load all content below `content_dir`.
    ///
    /// Missing directories yield an empty store; a file that fails to parse
    /// is logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing directory cannot be listed.
    pub fn load(content_dir: &Path) -> Result<Self, ContentError> {
        let pages = read_markdown_dir(&content_dir.join("pages"))?
            .into_iter()
            .filter_map(|(stem, text)| match parse_page(&stem, &text) {
                Ok(page) => Some((page.slug.clone(), page)),
                Err(e) => {
                    tracing::error!(file = %stem, error = %e, "Skipping page");
                    None
                }
            })
            .collect();

        let mut posts: Vec<Post> = read_markdown_dir(&content_dir.join("blog"))?
            .into_iter()
            .filter_map(|(stem, text)| {
                parse_post(&stem, &text)
                    .inspect_err(|e| tracing::error!(file = %stem, error = %e, "Skipping post"))
                    .ok()
            })
            .collect();
        posts.sort_by(|a, b| b.meta.published_at.cmp(&a.meta.published_at));

        let store = Self {
            pages: Arc::new(pages),
            posts: Arc::new(posts),
        };
        tracing::info!(
            pages = store.pages.len(),
            posts = store.posts.len(),
            "Content loaded"
        );
        Ok(store)
    }

    #[must_use]
    pub fn page(&self, slug: &str) -> Option<&Page> {
        self.pages.get(slug)
    }

    /// A published post. Drafts are not reachable by slug.
    #[must_use]
    pub fn post(&self, slug: &str) -> Option<&Post> {
        self.published_posts().find(|p| p.slug == slug)
    }

    /// Published posts, newest first.
    pub fn published_posts(&self) -> impl Iterator<Item = &Post> {
        self.posts.iter().filter(|p| !p.meta.draft)
    }

    /// Up to `limit` published posts other than `exclude`.
    #[must_use]
    pub fn recent_posts(&self, limit: usize, exclude: Option<&str>) -> Vec<&Post> {
        self.published_posts()
            .filter(|p| exclude.is_none_or(|slug| p.slug != slug))
            .take(limit)
            .collect()
    }
}

fn read_markdown_dir(dir: &Path) -> Result<Vec<(String, String)>, ContentError> {
    if !dir.exists() {
        tracing::warn!(dir = %dir.display(), "Content directory does not exist");
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(|e| ContentError::Io(e.to_string()))? {
        let path = entry.map_err(|e| ContentError::Io(e.to_string()))?.path();
        if path.extension().is_none_or(|ext| ext != "md") {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()).map(String::from) else {
            continue;
        };
        match std::fs::read_to_string(&path) {
            Ok(text) => files.push((stem, text)),
            Err(e) => tracing::error!(file = %path.display(), error = %e, "Unreadable content file"),
        }
    }
    Ok(files)
}

fn front_matter<T: DeserializeOwned>(text: &str) -> Result<(T, String), ContentError> {
    let matter = Matter::<YAML>::new();
    let parsed: ParsedEntity<T> = matter
        .parse(text)
        .map_err(|e| ContentError::Parse(format!("Failed to parse front matter: {e}")))?;
    let meta = parsed
        .data
        .ok_or_else(|| ContentError::Parse("Missing front matter".to_string()))?;
    Ok((meta, parsed.content))
}

/// Parse a page; the slug is the file stem.
///
/// # Errors
///
/// Returns [`ContentError::Parse`] for missing or invalid front matter.
pub fn parse_page(stem: &str, text: &str) -> Result<Page, ContentError> {
    let (meta, body) = front_matter::<PageMeta>(text)?;
    Ok(Page {
        slug: stem.to_string(),
        meta,
        content_html: render_markdown(&body),
    })
}

/// Parse a post. A `YYYY-MM-DD-` prefix on the file stem is dropped from
/// the slug.
///
/// # Errors
///
/// Returns [`ContentError::Parse`] for missing or invalid front matter.
pub fn parse_post(stem: &str, text: &str) -> Result<Post, ContentError> {
    let (meta, body) = front_matter::<PostMeta>(text)?;
    Ok(Post {
        slug: post_slug(stem).to_string(),
        meta,
        content_html: render_markdown(&body),
        reading_time_minutes: reading_time(&body),
    })
}

fn post_slug(stem: &str) -> &str {
    match (stem.get(..10), stem.get(10..11), stem.get(11..)) {
        (Some(date), Some("-"), Some(rest))
            if !rest.is_empty() && NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok() =>
        {
            rest
        }
        _ => stem,
    }
}

/// Minutes to read `body`, never less than one.
#[must_use]
pub fn reading_time(body: &str) -> usize {
    body.split_whitespace()
        .count()
        .div_ceil(WORDS_PER_MINUTE)
        .max(1)
}

/// Render markdown to HTML with GitHub Flavored Markdown extensions.
///
/// Raw HTML is passed through: content files are trusted.
#[must_use]
pub fn render_markdown(content: &str) -> String {
    let mut options = Options::default();
    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options.extension.header_ids = Some(String::new());
    options.render.r#unsafe = true;

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
