//! Post repository - slug listing, post listing and single-post lookup

use chrono::NaiveDateTime;
use std::cmp::Ordering;
use std::collections::HashMap;

use super::markdown::RenderError;
use super::store::{ContentExtension, ContentFile, ContentStore};
use super::{FrontMatter, MarkdownRenderer, Post, PostMeta};
use crate::helpers::{parse_date_string, today};

/// Reads posts from a content store on every call; nothing is cached.
pub struct PostRepository {
    store: ContentStore,
    renderer: MarkdownRenderer,
}

impl PostRepository {
    /// Create a repository over `store`, rendering bodies with `renderer`
    pub fn new(store: ContentStore, renderer: MarkdownRenderer) -> Self {
        Self { store, renderer }
    }

    /// Content files with one entry per slug, in directory order.
    ///
    /// When `x.md` and `x.mdx` both exist the `.mdx` file is kept (the same
    /// file `get_post` resolves to) and a warning is logged.
    fn content_files(&self) -> Vec<ContentFile> {
        let mut files: Vec<ContentFile> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for file in self.store.list_content_files() {
            match index.get(&file.slug) {
                Some(&i) => {
                    tracing::warn!(
                        "Duplicate slug {:?}: {:?} and {:?}; using the .{} file",
                        file.slug,
                        files[i].path,
                        file.path,
                        ContentExtension::PREFERENCE[0]
                    );
                    if file.extension == ContentExtension::PREFERENCE[0] {
                        files[i] = file;
                    }
                }
                None => {
                    index.insert(file.slug.clone(), files.len());
                    files.push(file);
                }
            }
        }

        files
    }

    /// All post slugs, in directory order
    pub fn list_slugs(&self) -> Vec<String> {
        self.content_files().into_iter().map(|f| f.slug).collect()
    }

    /// Metadata of every post, newest first.
    ///
    /// Only front-matter is read; bodies are never rendered here. Posts with
    /// equal dates keep directory order, and posts whose date cannot be
    /// parsed come last.
    pub fn list_posts(&self) -> Vec<PostMeta> {
        let today = today();

        let mut posts: Vec<(Option<NaiveDateTime>, PostMeta)> = self
            .content_files()
            .into_iter()
            .filter_map(|file| {
                let raw = self.store.read(&file)?;
                let (fm, _) = FrontMatter::parse(&raw);
                let meta = PostMeta::new(file.slug, fm.resolve(today));
                Some((parse_date_string(&meta.date), meta))
            })
            .collect();

        // sort_by is stable, so ties keep directory order
        posts.sort_by(|a, b| newest_first(a.0.as_ref(), b.0.as_ref()));

        tracing::debug!("Listed {} posts from {:?}", posts.len(), self.store.dir());

        posts.into_iter().map(|(_, meta)| meta).collect()
    }

    /// Posts tagged with `tag` (case-insensitive), newest first
    pub fn list_posts_by_tag(&self, tag: &str) -> Vec<PostMeta> {
        self.list_posts()
            .into_iter()
            .filter(|post| post.has_tag(tag))
            .collect()
    }

    /// Tags with their post counts, most used first.
    ///
    /// Tags are grouped case-insensitively, matching `list_posts_by_tag`; the
    /// first spelling seen is the one reported.
    pub fn tags(&self) -> Vec<(String, usize)> {
        let mut counts: HashMap<String, (String, usize)> = HashMap::new();
        for post in self.list_posts() {
            let mut seen_in_post: Vec<String> = Vec::new();
            for tag in post.tags {
                let key = tag.to_ascii_lowercase();
                if seen_in_post.contains(&key) {
                    continue;
                }
                seen_in_post.push(key.clone());
                counts.entry(key).or_insert((tag, 0)).1 += 1;
            }
        }

        let mut tags: Vec<_> = counts.into_values().collect();
        tags.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        tags
    }

    /// Look up a post by slug and render its body.
    ///
    /// Returns `Ok(None)` when no file matches or the content directory does
    /// not exist. Only a rendering failure is an error.
    pub fn get_post(&self, slug: &str) -> Result<Option<Post>, RenderError> {
        let Some(file) = self.store.resolve(slug) else {
            tracing::debug!("Post {:?} not found", slug);
            return Ok(None);
        };
        let Some(raw) = self.store.read(&file) else {
            return Ok(None);
        };

        let (fm, body) = FrontMatter::parse(&raw);
        let content = self.renderer.render(body)?;
        let meta = PostMeta::new(file.slug, fm.resolve(today()));

        Ok(Some(Post { meta, content }))
    }
}

fn newest_first(a: Option<&NaiveDateTime>, b: Option<&NaiveDateTime>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
