//! Sitemap feed - static marketing pages plus one entry per blog post

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::SiteConfig;
use crate::content::PostRepository;
use crate::helpers::{date_xml, full_url_for, post_url};

/// How often a page is expected to change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeFrequency {
    Always,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Never,
}

impl ChangeFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeFrequency::Always => "always",
            ChangeFrequency::Hourly => "hourly",
            ChangeFrequency::Daily => "daily",
            ChangeFrequency::Weekly => "weekly",
            ChangeFrequency::Monthly => "monthly",
            ChangeFrequency::Yearly => "yearly",
            ChangeFrequency::Never => "never",
        }
    }
}

/// A single `<url>` of the sitemap
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SitemapEntry {
    pub url: String,
    /// Generation time; per-file modification times are not tracked
    pub last_modified: DateTime<Utc>,
    pub change_frequency: ChangeFrequency,
    pub priority: f32,
}

/// Builds sitemap entries for a site
pub struct Sitemap<'a> {
    config: &'a SiteConfig,
    repo: &'a PostRepository,
}

impl<'a> Sitemap<'a> {
    pub fn new(config: &'a SiteConfig, repo: &'a PostRepository) -> Self {
        Self { config, repo }
    }

    /// Static page entries followed by post entries, stamped with the current time
    pub fn entries(&self) -> Vec<SitemapEntry> {
        self.entries_at(Utc::now())
    }

    /// Static page entries followed by post entries, stamped with `now`
    pub fn entries_at(&self, now: DateTime<Utc>) -> Vec<SitemapEntry> {
        let mut entries = self.static_entries(now);
        entries.extend(self.post_entries(now));
        entries
    }

    /// Entries for the fixed marketing pages
    pub fn static_entries(&self, now: DateTime<Utc>) -> Vec<SitemapEntry> {
        self.config
            .sitemap
            .static_pages
            .iter()
            .map(|page| SitemapEntry {
                url: full_url_for(&self.config.url, &page.path),
                last_modified: now,
                change_frequency: page.change_frequency,
                priority: page.priority,
            })
            .collect()
    }

    /// One entry per post slug. Only slugs are read, never post metadata.
    pub fn post_entries(&self, now: DateTime<Utc>) -> Vec<SitemapEntry> {
        let sitemap = &self.config.sitemap;
        self.repo
            .list_slugs()
            .into_iter()
            .map(|slug| SitemapEntry {
                url: post_url(&self.config.url, &self.config.blog_path, &slug),
                last_modified: now,
                change_frequency: sitemap.post_change_frequency,
                priority: sitemap.post_priority,
            })
            .collect()
    }
}

/// Serialize entries as a sitemaps.org `urlset` document
pub fn to_xml(entries: &[SitemapEntry]) -> String {
    let mut xml = String::new();
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    xml.push('\n');
    xml.push_str(r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#);
    xml.push('\n');

    for entry in entries {
        xml.push_str("  <url>\n");
        xml.push_str(&format!("    <loc>{}</loc>\n", escape_xml(&entry.url)));
        xml.push_str(&format!(
            "    <lastmod>{}</lastmod>\n",
            date_xml(&entry.last_modified)
        ));
        xml.push_str(&format!(
            "    <changefreq>{}</changefreq>\n",
            entry.change_frequency.as_str()
        ));
        xml.push_str(&format!(
            "    <priority>{}</priority>\n",
            format_priority(entry.priority)
        ));
        xml.push_str("  </url>\n");
    }

    xml.push_str("</urlset>\n");
    xml
}

/// Shortest exact form, keeping one decimal for whole numbers (`1.0`, `0.65`)
fn format_priority(priority: f32) -> String {
    if priority.fract() == 0.0 {
        format!("{:.1}", priority)
    } else {
        priority.to_string()
    }
}

/// Escape XML special characters
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{ContentStore, MarkdownRenderer};
    use chrono::TimeZone;
    use std::fs;
    use std::path::Path;

    fn repo(dir: &Path) -> PostRepository {
        PostRepository::new(
            ContentStore::new(dir),
            MarkdownRenderer::with_options("InspiredGitHub", false, false),
        )
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_one_entry_per_slug() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.md"), "---\ntitle: A\n---\nA").unwrap();
        fs::write(dir.path().join("b.mdx"), "B").unwrap();
        fs::write(dir.path().join("readme.txt"), "not a post").unwrap();

        let config = SiteConfig::default();
        let repo = repo(dir.path());
        let sitemap = Sitemap::new(&config, &repo);

        let mut urls: Vec<_> = sitemap
            .post_entries(now())
            .into_iter()
            .map(|e| {
                assert_eq!(e.change_frequency, ChangeFrequency::Monthly);
                assert_eq!(e.priority, 0.6);
                assert_eq!(e.last_modified, now());
                e.url
            })
            .collect();
        urls.sort();
        assert_eq!(
            urls,
            vec!["https://tesa.org/blog/a", "https://tesa.org/blog/b"]
        );
        assert_eq!(sitemap.post_entries(now()).len(), repo.list_slugs().len());
    }

    #[test]
    fn test_static_pages_first() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("hello.md"), "Hello").unwrap();

        let config = SiteConfig::default();
        let repo = repo(dir.path());
        let entries = Sitemap::new(&config, &repo).entries_at(now());

        assert_eq!(entries.len(), 8);
        assert_eq!(entries[0].url, "https://tesa.org");
        assert_eq!(entries[0].priority, 1.0);
        assert_eq!(entries[6].url, "https://tesa.org/blog");
        assert_eq!(entries[7].url, "https://tesa.org/blog/hello");
    }

    #[test]
    fn test_post_tier_differs_from_static_tiers() {
        let config = SiteConfig::default();
        assert!(config.sitemap.static_pages.iter().all(|page| {
            page.priority != config.sitemap.post_priority
        }));
    }

    #[test]
    fn test_missing_content_dir_has_only_static_entries() {
        let dir = tempfile::tempdir().unwrap();
        let config = SiteConfig::default();
        let repo = repo(&dir.path().join("missing"));
        let entries = Sitemap::new(&config, &repo).entries_at(now());
        assert_eq!(entries.len(), config.sitemap.static_pages.len());
    }

    #[test]
    fn test_to_xml() {
        let entries = vec![SitemapEntry {
            url: "https://tesa.org/blog/a&b".to_string(),
            last_modified: now(),
            change_frequency: ChangeFrequency::Weekly,
            priority: 0.6,
        }];
        let xml = to_xml(&entries);
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset"));
        assert!(xml.contains("<loc>https://tesa.org/blog/a&amp;b</loc>"));
        assert!(xml.contains("<lastmod>2024-07-01T12:00:00+00:00</lastmod>"));
        assert!(xml.contains("<changefreq>weekly</changefreq>"));
        assert!(xml.contains("<priority>0.6</priority>"));
        assert!(xml.ends_with("</urlset>\n"));
    }

    #[test]
    fn test_to_xml_keeps_priority_precision() {
        let entry = |priority| SitemapEntry {
            url: "https://tesa.org".to_string(),
            last_modified: now(),
            change_frequency: ChangeFrequency::Monthly,
            priority,
        };
        let xml = to_xml(&[entry(1.0), entry(0.65), entry(0.0)]);
        assert!(xml.contains("<priority>1.0</priority>"));
        assert!(xml.contains("<priority>0.65</priority>"));
        assert!(xml.contains("<priority>0.0</priority>"));
    }

    #[test]
    fn test_entry_json_shape() {
        let entry = SitemapEntry {
            url: "https://tesa.org".to_string(),
            last_modified: now(),
            change_frequency: ChangeFrequency::Yearly,
            priority: 1.0,
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["changeFrequency"], "yearly");
        assert!(json.get("lastModified").is_some());
    }
}
