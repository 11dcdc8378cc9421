//! Content module - discovers, parses and renders blog posts

mod frontmatter;
mod markdown;
mod post;
mod repository;
pub mod store;

pub use frontmatter::{FrontMatter, ResolvedFrontMatter, DEFAULT_AUTHOR, DEFAULT_TITLE};
pub use markdown::{MarkdownRenderer, RenderError};
pub use post::{Post, PostMeta};
pub use repository::PostRepository;
pub use store::{ContentFile, ContentStore};
