//! Blog article types.

use chrono::{DateTime, Utc};
use jc_closet_core::ArticleId;
use serde::{Deserialize, Serialize};

/// A blog article. `content` is Markdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    #[serde(rename = "_id", alias = "id")]
    pub id: ArticleId,
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub published: bool,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}

impl Article {
    /// Excerpt, or the first paragraph of the body trimmed to `max` chars.
    #[must_use]
    pub fn summary(&self, max: usize) -> String {
        if let Some(excerpt) = self.excerpt.as_deref().filter(|e| !e.trim().is_empty()) {
            return excerpt.to_string();
        }
        let first = self
            .content
            .split("\n\n")
            .map(str::trim)
            .find(|p| !p.is_empty() && !p.starts_with('#'))
            .unwrap_or("");
        if first.chars().count() <= max {
            first.to_string()
        } else {
            let cut: String = first.chars().take(max).collect();
            format!("{}…", cut.trim_end())
        }
    }
}

/// Create/update payload for admin article forms.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleInput {
    pub title: String,
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub published: bool,
}

impl ArticleInput {
    /// Derive a URL slug from a title.
    #[must_use]
    pub fn slugify(title: &str) -> String {
        let mut slug = String::with_capacity(title.len());
        let mut dash = false;
        for c in title.trim().chars() {
            if c.is_ascii_alphanumeric() {
                slug.push(c.to_ascii_lowercase());
                dash = false;
            } else if !dash && !slug.is_empty() {
                slug.push('-');
                dash = true;
            }
        }
        slug.trim_end_matches('-').to_string()
    }
}

impl From<&Article> for ArticleInput {
    fn from(article: &Article) -> Self {
        Self {
            title: article.title.clone(),
            slug: article.slug.clone(),
            excerpt: article.excerpt.clone(),
            content: article.content.clone(),
            cover_image: article.cover_image.clone(),
            tags: article.tags.clone(),
            published: article.published,
        }
    }
}
