//! Content store - locates and reads blog source files

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Accepted content file extensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentExtension {
    Mdx,
    Md,
}

impl ContentExtension {
    /// Lookup order when resolving a slug to a file
    pub const PREFERENCE: [ContentExtension; 2] = [ContentExtension::Mdx, ContentExtension::Md];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentExtension::Mdx => "mdx",
            ContentExtension::Md => "md",
        }
    }

    fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("mdx") => Some(ContentExtension::Mdx),
            Some("md") => Some(ContentExtension::Md),
            _ => None,
        }
    }
}

impl fmt::Display for ContentExtension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A post source file inside the content directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentFile {
    /// File name with the extension stripped
    pub slug: String,
    pub path: PathBuf,
    pub extension: ContentExtension,
}

impl ContentFile {
    fn from_path(path: &Path) -> Option<Self> {
        let extension = ContentExtension::from_path(path)?;
        let slug = path.file_stem()?.to_str()?.to_string();
        if slug.is_empty() {
            return None;
        }
        Some(Self {
            slug,
            path: path.to_path_buf(),
            extension,
        })
    }
}

/// Read-only view of the content directory
#[derive(Debug, Clone)]
pub struct ContentStore {
    dir: PathBuf,
}

impl ContentStore {
    /// Create a store rooted at `dir`. The directory does not need to exist.
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// The content directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// List content files in directory order.
    ///
    /// A missing directory yields an empty list.
    pub fn list_content_files(&self) -> Vec<ContentFile> {
        if !self.dir.is_dir() {
            tracing::debug!("Content directory {:?} not found", self.dir);
            return Vec::new();
        }

        let mut files = Vec::new();

        for entry in WalkDir::new(&self.dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry in {:?}: {}", self.dir, e);
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            if let Some(file) = ContentFile::from_path(entry.path()) {
                files.push(file);
            }
        }

        files
    }

    /// Resolve a slug to a file, trying `.mdx` before `.md`
    pub fn resolve(&self, slug: &str) -> Option<ContentFile> {
        if !is_plain_slug(slug) {
            return None;
        }

        ContentExtension::PREFERENCE.iter().find_map(|ext| {
            let path = self.dir.join(format!("{}.{}", slug, ext));
            if path.is_file() {
                Some(ContentFile {
                    slug: slug.to_string(),
                    path,
                    extension: *ext,
                })
            } else {
                None
            }
        })
    }

    /// Read a content file, treating any failure as absent.
    ///
    /// Invalid UTF-8 is replaced rather than rejected, so every listed file
    /// can also be read.
    pub fn read(&self, file: &ContentFile) -> Option<String> {
        match fs::read(&file.path) {
            Ok(bytes) => match String::from_utf8(bytes) {
                Ok(raw) => Some(raw),
                Err(e) => {
                    tracing::warn!("{:?} is not valid UTF-8, replacing invalid bytes", file.path);
                    Some(String::from_utf8_lossy(e.as_bytes()).into_owned())
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read {:?}: {}", file.path, e);
                None
            }
        }
    }
}

/// A slug must name a file directly inside the content directory
fn is_plain_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug != "."
        && slug != ".."
        && !slug.contains(['/', '\\'])
        && !slug.contains('\0')
}
