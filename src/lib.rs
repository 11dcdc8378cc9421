//! tesa-blog: the blog content pipeline behind the TESA website
//!
//! Posts are Markdown (`.md`) or MDX (`.mdx`) files with an optional YAML
//! front-matter block. This crate lists and renders them and feeds the
//! site's sitemap.

pub mod commands;
pub mod config;
pub mod content;
pub mod helpers;
pub mod server;
pub mod sitemap;

use anyhow::Result;
use std::path::{Path, PathBuf};

use content::{ContentStore, MarkdownRenderer, PostRepository};

/// A site rooted at a base directory
#[derive(Clone)]
pub struct Site {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Blog content directory
    pub content_dir: PathBuf,
}

impl Site {
    /// Create a site from a directory, reading `_config.yml` when present
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            tracing::debug!("No config at {:?}, using defaults", config_path);
            config::SiteConfig::default()
        };

        Ok(Self::with_config(base_dir, config))
    }

    /// Create a site with an explicit configuration
    pub fn with_config<P: AsRef<Path>>(base_dir: P, config: config::SiteConfig) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        let content_dir = base_dir.join(&config.content_dir);

        Self {
            config,
            base_dir,
            content_dir,
        }
    }

    /// A post repository over this site's content directory
    pub fn repository(&self) -> PostRepository {
        PostRepository::new(
            ContentStore::new(&self.content_dir),
            MarkdownRenderer::from_config(&self.config),
        )
    }
}
