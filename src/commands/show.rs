//! Print a single rendered post

use anyhow::{Context, Result};

use crate::content::Post;
use crate::Site;

/// Load and render the post identified by `slug`
pub fn load(site: &Site, slug: &str) -> Result<Post> {
    site.repository()
        .get_post(slug)
        .with_context(|| format!("Failed to render post {:?}", slug))?
        .ok_or_else(|| anyhow::anyhow!("Post not found: {}", slug))
}

/// Print the post's metadata and rendered HTML
pub fn run(site: &Site, slug: &str, json: bool) -> Result<()> {
    let post = load(site, slug)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&post)?);
        return Ok(());
    }

    println!("{} ({}, {})", post.meta.title, post.meta.date, post.meta.author);
    if !post.meta.tags.is_empty() {
        println!("Tags: {}", post.meta.tags.join(", "));
    }
    println!();
    print!("{}", post.content);

    Ok(())
}
