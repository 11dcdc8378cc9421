//! Front-matter parsing

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Deserializer};
use serde_yaml::Value;

/// Title used when a post does not declare one
pub const DEFAULT_TITLE: &str = "Untitled";

/// Author used when a post does not declare one
pub const DEFAULT_AUTHOR: &str = "TESA Team";

lazy_static! {
    /// A `key: value` (or bare `key:`) line, the signature of a YAML mapping.
    /// Keys may be quoted and may have blanks before the colon.
    static ref YAML_KEY_LINE: Regex =
        Regex::new(r#"^("[^"]+"|'[^']+'|[A-Za-z0-9_-]+)\s*:(\s|$)"#).unwrap();
}

/// Deserialize any YAML value, keeping it only when it is text
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => Some(s),
        _ => None,
    })
}

/// Deserialize tags from a list of scalars or a single string
fn lenient_tags<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => Some(vec![s]),
        Value::Sequence(items) => Some(items.into_iter().filter_map(scalar_to_string).collect()),
        _ => None,
    })
}

fn scalar_to_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Front-matter block of a post.
///
/// Every recognised key is optional. A key holding a value of the wrong
/// shape is treated as if it were missing; see [`FrontMatter::resolve`]
/// for the defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    #[serde(deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub date: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub excerpt: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub author: Option<String>,
    #[serde(deserialize_with = "lenient_tags")]
    pub tags: Option<Vec<String>>,
}

/// Front-matter with every field filled in
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedFrontMatter {
    pub title: String,
    pub date: String,
    pub excerpt: String,
    pub author: String,
    pub tags: Vec<String>,
}

impl FrontMatter {
    /// Split `content` into front-matter and body.
    ///
    /// Never fails: anything that is not a well-formed YAML block at the very
    /// top of the file yields default front-matter and the whole input as body.
    pub fn parse(content: &str) -> (Self, &str) {
        let text = content.strip_prefix('\u{feff}').unwrap_or(content);

        let Some((block, body)) = split_fenced(text) else {
            return (FrontMatter::default(), text);
        };

        if block.trim().is_empty() {
            return (FrontMatter::default(), body);
        }

        // Documents that open with a thematic break are not front-matter
        if !looks_like_yaml(block) {
            return (FrontMatter::default(), text);
        }

        match serde_yaml::from_str::<FrontMatter>(block) {
            Ok(fm) => (fm, body),
            Err(e) => {
                tracing::warn!(
                    "Failed to parse YAML front-matter, treating as content: {}",
                    e
                );
                (FrontMatter::default(), text)
            }
        }
    }

    /// Fill missing fields. `today` supplies the default date.
    pub fn resolve(self, today: NaiveDate) -> ResolvedFrontMatter {
        ResolvedFrontMatter {
            title: non_blank(self.title).unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            date: non_blank(self.date)
                .unwrap_or_else(|| today.format("%Y-%m-%d").to_string()),
            excerpt: self.excerpt.unwrap_or_default(),
            author: non_blank(self.author).unwrap_or_else(|| DEFAULT_AUTHOR.to_string()),
            tags: self.tags.unwrap_or_default(),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Split a `---` fenced block off the top of `text`.
/// Returns (block, body) or None when the fences are not both present.
fn split_fenced(text: &str) -> Option<(&str, &str)> {
    let (first, mut rest) = next_line(text)?;
    if !is_fence(first) {
        return None;
    }

    let block_start = text.len() - rest.len();
    loop {
        let line_start = text.len() - rest.len();
        let (line, after) = next_line(rest)?;
        if is_fence(line) {
            return Some((&text[block_start..line_start], after));
        }
        rest = after;
    }
}

/// Next line without its terminator, and the remaining text
fn next_line(text: &str) -> Option<(&str, &str)> {
    if text.is_empty() {
        return None;
    }
    match text.find('\n') {
        Some(pos) => Some((text[..pos].trim_end_matches('\r'), &text[pos + 1..])),
        None => Some((text.trim_end_matches('\r'), "")),
    }
}

fn is_fence(line: &str) -> bool {
    line.trim_end() == "---"
}

fn looks_like_yaml(block: &str) -> bool {
    block.lines().any(|line| {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return false;
        }
        let Some(caps) = YAML_KEY_LINE.captures(trimmed) else {
            return false;
        };
        // A URL scheme is not a key
        !matches!(&caps[1], "http" | "https" | "ftp" | "mailto")
    })
}
