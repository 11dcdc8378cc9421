//! Generate sitemap.xml

use anyhow::Result;
use std::fs;
use std::path::Path;

use crate::sitemap::{self, Sitemap};
use crate::Site;

/// Build the sitemap XML for a site
pub fn build(site: &Site) -> String {
    let repo = site.repository();
    let entries = Sitemap::new(&site.config, &repo).entries();
    sitemap::to_xml(&entries)
}

/// Write the sitemap to `output`, or stdout when no path is given
pub fn run(site: &Site, output: Option<&Path>) -> Result<()> {
    let xml = build(site);

    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
            fs::write(path, xml)?;
            tracing::info!("Generated {:?}", path);
        }
        None => print!("{}", xml),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_sitemap() {
        let dir = tempfile::tempdir().unwrap();
        let content_dir = dir.path().join("content/blog");
        fs::create_dir_all(&content_dir).unwrap();
        fs::write(content_dir.join("spring-cohort.md"), "News").unwrap();

        let site = Site::new(dir.path()).unwrap();
        let output = dir.path().join("public/sitemap.xml");
        run(&site, Some(&output)).unwrap();

        let xml = fs::read_to_string(&output).unwrap();
        assert!(xml.contains("<loc>https://tesa.org/blog/spring-cohort</loc>"));
        assert!(xml.contains("<loc>https://tesa.org/scholarships</loc>"));
        assert_eq!(xml.matches("<url>").count(), 8);
    }
}
