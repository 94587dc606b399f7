//! Code block conversion.
//!
//! `<pre><code class="...">...</code></pre>` becomes a Confluence `code`
//! macro with line numbers and a CDATA body.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::util::unescape_entities;

static CODE_BLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<pre><code([^>]*)>(.*?)</code></pre>").unwrap());

static CLASS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"class="([^"]*)""#).unwrap());

/// Convert every code block into a `code` macro.
///
/// Entity escapes inside the block are undone, since CDATA content is literal.
pub(crate) fn convert(html: &str) -> String {
    CODE_BLOCK_RE
        .replace_all(html, |caps: &Captures<'_>| {
            let language = language(&caps[1]);
            let body = unescape_entities(&caps[2]).replace("]]>", "]]]]><![CDATA[>");
            format!(
                concat!(
                    r#"<ac:structured-macro ac:name="code">"#,
                    r#"<ac:parameter ac:name="linenumbers">true</ac:parameter>"#,
                    r#"<ac:parameter ac:name="language">{}</ac:parameter>"#,
                    "<ac:plain-text-body><![CDATA[{}]]></ac:plain-text-body>",
                    "</ac:structured-macro>",
                ),
                language, body
            )
        })
        .into_owned()
}

/// Language named by the `class` attribute, or `none`.
///
/// CommonMark renderers emit `language-<name>`; the prefix is dropped.
fn language(attrs: &str) -> String {
    CLASS_RE
        .captures(attrs)
        .and_then(|caps| caps.get(1))
        .and_then(|class| class.as_str().split_whitespace().next())
        .map(|class| class.strip_prefix("language-").unwrap_or(class))
        .filter(|lang| !lang.is_empty())
        .map_or_else(|| "none".to_owned(), unescape_entities)
}
