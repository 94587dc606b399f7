//! Conversion pipeline.

use pulldown_cmark::{Options, Parser};
use tracing::debug;

use crate::cdata::Shelf;
use crate::sanitize::Sanitizer;
use crate::toc::{TocOptions, prepend_banner, prepend_toc};
use crate::util::escape_text;
use crate::{code, footnotes, image, macros, xhtml};

/// Markdown to Confluence storage format converter.
///
/// Holds the configured sanitizer so it can be reused across pages.
pub struct MarkdownConverter {
    sanitizer: Sanitizer,
}

impl MarkdownConverter {
    #[must_use]
    pub fn new() -> Self {
        Self {
            sanitizer: Sanitizer::new(),
        }
    }

    /// Convert a Markdown document to storage format.
    ///
    /// If the first line of the rendered HTML contains `title`, it is dropped:
    /// Confluence shows the page title on its own. An empty `title` keeps the
    /// first line. `toc` prepends a table of contents, and `banner` prepends
    /// an "auto-generated" panel linking to the given source URI.
    #[must_use]
    pub fn render(
        &self,
        title: &str,
        markdown: &str,
        toc: Option<&TocOptions>,
        banner: Option<&str>,
    ) -> String {
        let html = self.to_html(markdown);
        let html = drop_title_line(&html, title);
        let mut html = Self::transform(html);

        if let Some(options) = toc {
            html = prepend_toc(&html, options);
        }
        if let Some(source) = banner {
            html = prepend_banner(&html, source);
        }
        html
    }

    /// Render Markdown to sanitized HTML, before any Confluence rewriting.
    #[must_use]
    pub fn to_html(&self, markdown: &str) -> String {
        let parser = Parser::new_ext(markdown, Options::ENABLE_TABLES);
        let mut html = String::with_capacity(markdown.len() * 2);
        pulldown_cmark::html::push_html(&mut html, parser);
        self.sanitizer.clean(&html)
    }

    /// Apply the rewrite passes to sanitized HTML.
    ///
    /// Passes run in a fixed order; each one expects the output of the previous.
    /// CDATA sections, including the code bodies written by the code pass,
    /// are never rewritten, so transforming already converted markup is a
    /// no-op.
    #[must_use]
    pub fn transform(html: &str) -> String {
        let mut shelf = Shelf::default();
        let html = shelf.stash(html);
        let html = macros::convert(&html);
        let html = code::convert(&html);
        let html = shelf.stash(&html);
        let html = xhtml::convert(&html);
        let html = image::convert(&html);
        let html = footnotes::convert(&html);
        let html = shelf.restore(&html);
        debug!("Converted {} bytes of storage format", html.len());
        html
    }
}

impl Default for MarkdownConverter {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert a Markdown document with a fresh [`MarkdownConverter`].
///
/// See [`MarkdownConverter::render`]; an empty `title` drops nothing.
#[must_use]
pub fn render(
    title: &str,
    markdown: &str,
    toc: Option<&TocOptions>,
    banner: Option<&str>,
) -> String {
    MarkdownConverter::new().render(title, markdown, toc, banner)
}

fn drop_title_line<'a>(html: &'a str, title: &str) -> &'a str {
    if title.is_empty() {
        return html;
    }
    let (first, rest) = html.split_once('\n').unwrap_or((html, ""));
    if first.contains(title) || first.contains(&escape_text(title)) {
        rest
    } else {
        html
    }
}
