//! URL helper functions

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

/// Characters escaped in a single path segment
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Join a site base URL and a path without doubling slashes
///
/// # Examples
/// ```ignore
/// full_url_for("https://tesa.org/", "/about") // -> "https://tesa.org/about"
/// full_url_for("https://tesa.org", "")        // -> "https://tesa.org"
/// ```
pub fn full_url_for(base_url: &str, path: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let path = path.trim_matches('/');

    if path.is_empty() {
        base.to_string()
    } else {
        format!("{}/{}", base, path)
    }
}

/// URL of a blog post
pub fn post_url(base_url: &str, blog_path: &str, slug: &str) -> String {
    let blog = full_url_for(base_url, blog_path);
    format!("{}/{}", blog, encode_segment(slug))
}

/// Percent-encode a single path segment
pub fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, PATH_SEGMENT).to_string()
}
