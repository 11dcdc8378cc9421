//! Markdown rendering with syntax highlighting

use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use std::collections::HashMap;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;
use thiserror::Error;

use crate::config::SiteConfig;

/// Theme used when the configured one is not bundled with syntect
const FALLBACK_THEME: &str = "InspiredGitHub";

/// Markdown conversion failure
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to highlight `{lang}` code block: {source}")]
    Highlight {
        lang: String,
        #[source]
        source: syntect::Error,
    },
}

/// Markdown renderer with syntax highlighting
pub struct MarkdownRenderer {
    syntax_set: SyntaxSet,
    theme: Theme,
    highlight: bool,
    allow_html: bool,
}

impl MarkdownRenderer {
    /// Create a new markdown renderer
    pub fn new() -> Self {
        Self::with_options(FALLBACK_THEME, true, false)
    }

    /// Create with custom settings
    pub fn with_options(theme: &str, highlight: bool, allow_html: bool) -> Self {
        let mut theme_set = ThemeSet::load_defaults();
        let theme = match theme_set.themes.remove(theme) {
            Some(theme) => theme,
            None => {
                tracing::warn!("Unknown highlight theme {:?}, using {}", theme, FALLBACK_THEME);
                theme_set
                    .themes
                    .remove(FALLBACK_THEME)
                    .unwrap_or_default()
            }
        };

        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme,
            highlight,
            allow_html,
        }
    }

    /// Create from the site configuration
    pub fn from_config(config: &SiteConfig) -> Self {
        Self::with_options(
            &config.highlight.theme,
            config.highlight.enable,
            config.markdown.allow_html,
        )
    }

    /// Render markdown to an HTML fragment
    pub fn render(&self, markdown: &str) -> Result<String, RenderError> {
        // Front-matter is stripped before rendering, so no metadata blocks
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_HEADING_ATTRIBUTES;
        let parser = Parser::new_ext(markdown, options);

        let mut events: Vec<Event> = Vec::new();
        let mut code_block: Option<(Option<String>, String)> = None;
        let mut heading: Option<Vec<Event>> = None;
        let mut anchors = HeadingAnchors::default();

        for event in parser {
            let event = self.sanitize(event);

            if let Some((lang, code)) = code_block.as_mut() {
                match event {
                    Event::Text(text) => code.push_str(&text),
                    Event::End(TagEnd::CodeBlock) => {
                        let html = self.render_code(code, lang.as_deref())?;
                        events.push(Event::Html(CowStr::from(html)));
                        code_block = None;
                    }
                    _ => {}
                }
                continue;
            }

            if let Some(buffer) = heading.as_mut() {
                let done = matches!(event, Event::End(TagEnd::Heading(_)));
                buffer.push(event);
                if done {
                    if let Some(buffer) = heading.take() {
                        events.extend(anchors.assign(buffer));
                    }
                }
                continue;
            }

            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let lang = match kind {
                        CodeBlockKind::Fenced(info) => fence_language(&info),
                        CodeBlockKind::Indented => None,
                    };
                    code_block = Some((lang, String::new()));
                }
                Event::Start(Tag::Heading { .. }) => {
                    heading = Some(vec![event]);
                }
                _ => events.push(event),
            }
        }

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());

        Ok(html_output)
    }

    /// Escape raw HTML unless it is allowed through
    fn sanitize<'a>(&self, event: Event<'a>) -> Event<'a> {
        if self.allow_html {
            return event;
        }
        match event {
            Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
            other => other,
        }
    }

    /// Render a code block, highlighting it when the language is known
    fn render_code(&self, code: &str, lang: Option<&str>) -> Result<String, RenderError> {
        let Some(lang) = lang else {
            return Ok(format!("<pre><code>{}</code></pre>\n", html_escape(code)));
        };

        let syntax = if self.highlight {
            self.syntax_set
                .find_syntax_by_token(lang)
                .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
        } else {
            None
        };

        let class = html_escape(lang);
        match syntax {
            Some(syntax) => {
                let highlighted =
                    highlighted_html_for_string(code, &self.syntax_set, syntax, &self.theme)
                        .map_err(|source| RenderError::Highlight {
                            lang: lang.to_string(),
                            source,
                        })?;
                Ok(format!(
                    "<div class=\"highlight language-{}\">{}</div>\n",
                    class, highlighted
                ))
            }
            None => Ok(format!(
                "<pre><code class=\"language-{}\">{}</code></pre>\n",
                class,
                html_escape(code)
            )),
        }
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// First word of a fence info string, e.g. `rust` in "```rust,ignore"
fn fence_language(info: &str) -> Option<String> {
    info.split(|c: char| c.is_whitespace() || c == ',' || c == '{')
        .next()
        .filter(|lang| !lang.is_empty())
        .map(str::to_string)
}

/// Assigns unique `id`s to headings that do not declare one
#[derive(Default)]
struct HeadingAnchors {
    seen: HashMap<String, usize>,
}

impl HeadingAnchors {
    fn assign<'a>(&mut self, mut buffer: Vec<Event<'a>>) -> Vec<Event<'a>> {
        let text: String = buffer
            .iter()
            .filter_map(|event| match event {
                Event::Text(t) | Event::Code(t) => Some(t.as_ref()),
                _ => None,
            })
            .collect();

        if let Some(Event::Start(Tag::Heading { id, .. })) = buffer.first_mut() {
            let base = match id.take() {
                Some(explicit) => explicit.to_string(),
                None => {
                    let slug = slug::slugify(&text);
                    if slug.is_empty() {
                        "section".to_string()
                    } else {
                        slug
                    }
                }
            };
            *id = Some(CowStr::from(self.unique(base)));
        }

        buffer
    }

    fn unique(&mut self, base: String) -> String {
        let count = self.seen.entry(base.clone()).or_insert(0);
        let id = if *count == 0 {
            base
        } else {
            format!("{}-{}", base, count)
        };
        *count += 1;
        id
    }
}

/// Minimal HTML escaping for text placed inside elements and attributes
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain() -> MarkdownRenderer {
        MarkdownRenderer::with_options(FALLBACK_THEME, false, false)
    }

    #[test]
    fn test_render_basic_markdown() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("# Hello World\n\nThis is a test.").unwrap();
        assert!(html.contains("<h1 id=\"hello-world\">Hello World</h1>"));
        assert!(html.contains("<p>This is a test.</p>"));
    }

    #[test]
    fn test_plain_paragraph_is_preserved() {
        let texts = [
            "Our scholarship program opens applications in the spring",
            "Hello, world! Are you ready? (Yes; it's 50% done.)",
            "2025 cohort: 40 students from 12 countries",
            "Fees & scholarships",
            "Éducation pour tous — 教育",
            "Trailing blanks are dropped   ",
        ];
        for text in texts {
            let html = plain().render(text).unwrap();
            let expected = text.trim_end().replace('&', "&amp;");
            assert_eq!(html, format!("<p>{}</p>\n", expected), "input {:?}", text);
        }
    }

    #[test]
    fn test_block_structures() {
        let markdown = "## Steps\n\n- one\n- two\n\n1. first\n\n> quoted\n";
        let html = plain().render(markdown).unwrap();
        assert!(html.contains("<h2 id=\"steps\">Steps</h2>"));
        assert!(html.contains("<ul>\n<li>one</li>\n<li>two</li>\n</ul>"));
        assert!(html.contains("<ol>\n<li>first</li>\n</ol>"));
        assert!(html.contains("<blockquote>\n<p>quoted</p>\n</blockquote>"));
    }

    #[test]
    fn test_inline_structures() {
        let html = plain()
            .render("Some *em*, **strong**, `a < b` and [a link](https://tesa.org).")
            .unwrap();
        assert!(html.contains("<em>em</em>"));
        assert!(html.contains("<strong>strong</strong>"));
        assert!(html.contains("<code>a &lt; b</code>"));
        assert!(html.contains("<a href=\"https://tesa.org\">a link</a>"));
    }

    #[test]
    fn test_code_block_escaped_once() {
        let html = plain().render("```\nif a < b && c {}\n```\n").unwrap();
        assert_eq!(
            html,
            "<pre><code>if a &lt; b &amp;&amp; c {}\n</code></pre>\n"
        );
    }

    #[test]
    fn test_unhighlighted_fence_keeps_language_class() {
        let html = plain().render("```rust\nfn main() {}\n```").unwrap();
        assert!(html.contains("<pre><code class=\"language-rust\">fn main() {}\n</code></pre>"));
    }

    #[test]
    fn test_render_highlighted_code_block() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("```rust\nfn main() {}\n```").unwrap();
        assert!(html.contains("class=\"highlight language-rust\""));
        assert!(html.contains("main"));
    }

    #[test]
    fn test_unknown_language_is_plain() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("```nosuchlang\n<x>\n```").unwrap();
        assert!(html.contains("<pre><code class=\"language-nosuchlang\">&lt;x&gt;\n</code></pre>"));
    }

    #[test]
    fn test_raw_html_escaped_by_default() {
        let html = plain().render("Hello <script>alert(1)</script>").unwrap();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_raw_html_allowed() {
        let renderer = MarkdownRenderer::with_options(FALLBACK_THEME, false, true);
        let html = renderer.render("<div class=\"note\">Hi</div>\n").unwrap();
        assert!(html.contains("<div class=\"note\">Hi</div>"));
    }

    #[test]
    fn test_heading_ids_are_unique() {
        let html = plain()
            .render("## FAQ\n\n## FAQ\n\n## Custom {#mine}\n")
            .unwrap();
        assert!(html.contains("<h2 id=\"faq\">FAQ</h2>"));
        assert!(html.contains("<h2 id=\"faq-1\">FAQ</h2>"));
        assert!(html.contains("<h2 id=\"mine\">Custom</h2>"));
    }

    #[test]
    fn test_unknown_theme_falls_back() {
        let renderer = MarkdownRenderer::with_options("no-such-theme", true, false);
        assert!(renderer.render("```rust\nlet x = 1;\n```").is_ok());
    }

    #[test]
    fn test_fence_language() {
        assert_eq!(fence_language("rust,ignore"), Some("rust".to_string()));
        assert_eq!(fence_language("js title=a.js"), Some("js".to_string()));
        assert_eq!(fence_language(""), None);
    }
}
