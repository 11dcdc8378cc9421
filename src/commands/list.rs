//! List blog content

use anyhow::Result;

use crate::Site;

/// List site content by type
pub fn run(site: &Site, content_type: &str, tag: Option<&str>, json: bool) -> Result<()> {
    let repo = site.repository();

    match content_type {
        "post" | "posts" => {
            let posts = match tag {
                Some(tag) => repo.list_posts_by_tag(tag),
                None => repo.list_posts(),
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&posts)?);
                return Ok(());
            }
            println!("Posts ({}):", posts.len());
            for post in posts {
                println!("  {} - {} [{}]", post.date, post.title, post.slug);
            }
        }
        "slug" | "slugs" => {
            let slugs = repo.list_slugs();
            if json {
                println!("{}", serde_json::to_string_pretty(&slugs)?);
                return Ok(());
            }
            println!("Slugs ({}):", slugs.len());
            for slug in slugs {
                println!("  {}", slug);
            }
        }
        "tag" | "tags" => {
            let tags = repo.tags();
            if json {
                let map: serde_json::Map<String, serde_json::Value> = tags
                    .into_iter()
                    .map(|(tag, count)| (tag, count.into()))
                    .collect();
                println!("{}", serde_json::to_string_pretty(&map)?);
                return Ok(());
            }
            println!("Tags ({}):", tags.len());
            for (tag, count) in tags {
                println!("  {} ({})", tag, count);
            }
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: post, slug, tag",
                content_type
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_type_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let site = Site::new(dir.path()).unwrap();
        assert!(run(&site, "category", None, false).is_err());
        assert!(run(&site, "posts", None, false).is_ok());
        assert!(run(&site, "tags", None, true).is_ok());
    }
}
