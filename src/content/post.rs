//! Post models

use serde::{Deserialize, Serialize};

use super::frontmatter::ResolvedFrontMatter;

/// Listing view of a post. Never carries the body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostMeta {
    /// File name without extension; the post's public identifier
    pub slug: String,

    pub title: String,

    /// Publication date as written in the front-matter
    pub date: String,

    pub excerpt: String,

    pub author: String,

    pub tags: Vec<String>,
}

impl PostMeta {
    /// Build the listing view from resolved front-matter
    pub fn new(slug: String, fm: ResolvedFrontMatter) -> Self {
        Self {
            slug,
            title: fm.title,
            date: fm.date,
            excerpt: fm.excerpt,
            author: fm.author,
            tags: fm.tags,
        }
    }

    /// Whether the post carries `tag` (case-insensitive)
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }
}

/// A post with its rendered body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    #[serde(flatten)]
    pub meta: PostMeta,

    /// Rendered HTML content
    pub content: String,
}
