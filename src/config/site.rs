//! Site configuration (_config.yml)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::sitemap::ChangeFrequency;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,

    // URL
    pub url: String,
    pub blog_path: String,

    // Directory
    pub content_dir: String,

    // Rendering
    #[serde(default)]
    pub highlight: HighlightConfig,
    #[serde(default)]
    pub markdown: MarkdownConfig,

    // Sitemap
    #[serde(default)]
    pub sitemap: SitemapConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "TESA".to_string(),

            url: "https://tesa.org".to_string(),
            blog_path: "blog".to_string(),

            content_dir: "content/blog".to_string(),

            highlight: HighlightConfig::default(),
            markdown: MarkdownConfig::default(),

            sitemap: SitemapConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {:?}", path))?;
        let config: SiteConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Invalid config {:?}", path))?;
        Ok(config)
    }
}

/// Code highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub enable: bool,
    pub theme: String,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            enable: true,
            theme: "InspiredGitHub".to_string(),
        }
    }
}

/// Markdown rendering configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkdownConfig {
    /// Pass raw HTML in post bodies through unescaped
    pub allow_html: bool,
}

/// Sitemap configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SitemapConfig {
    pub post_priority: f32,
    pub post_change_frequency: ChangeFrequency,
    pub static_pages: Vec<StaticPage>,
}

impl Default for SitemapConfig {
    fn default() -> Self {
        Self {
            post_priority: 0.6,
            post_change_frequency: ChangeFrequency::Monthly,
            static_pages: default_static_pages(),
        }
    }
}

/// A fixed marketing page listed in the sitemap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticPage {
    /// Path relative to the site root ("" is the home page)
    pub path: String,
    pub priority: f32,
    pub change_frequency: ChangeFrequency,
}

impl StaticPage {
    fn new(path: &str, priority: f32, change_frequency: ChangeFrequency) -> Self {
        Self {
            path: path.to_string(),
            priority,
            change_frequency,
        }
    }
}

fn default_static_pages() -> Vec<StaticPage> {
    vec![
        StaticPage::new("", 1.0, ChangeFrequency::Yearly),
        StaticPage::new("about", 0.8, ChangeFrequency::Monthly),
        StaticPage::new("program", 0.9, ChangeFrequency::Monthly),
        StaticPage::new("scholarships", 0.8, ChangeFrequency::Monthly),
        StaticPage::new("partnerships", 0.7, ChangeFrequency::Monthly),
        StaticPage::new("contact", 0.5, ChangeFrequency::Yearly),
        StaticPage::new("blog", 0.7, ChangeFrequency::Weekly),
    ]
}
