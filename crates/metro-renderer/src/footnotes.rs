//! Footnote-style link references.
//!
//! A definition line `[^N] ... href="URL" ...`, at the start of a line or
//! paragraph, is removed from the document. Every inline `[^N]` becomes a
//! superscript link to `URL`. When several definitions share an id, the last
//! one wins.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::debug;

static DEFINITION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(<p>)?\[\^(\d+)\](.*?)(</p>)?$").unwrap());

static HREF_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"href="([^"]*)""#).unwrap());

static REFERENCE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[\^(\d+)\]").unwrap());

static EMPTY_PARAGRAPH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<p>\s*</p>\n?").unwrap());

/// Remove footnote definitions and link their inline references.
pub(crate) fn convert(html: &str) -> String {
    let mut links: HashMap<String, String> = HashMap::new();
    let mut lines: Vec<String> = Vec::new();

    for line in html.split('\n') {
        let Some((id, href, residue)) = parse_definition(line) else {
            lines.push(line.to_owned());
            continue;
        };
        links.insert(id, href);
        if !residue.is_empty() && residue != "<p></p>" {
            lines.push(residue);
        }
    }

    if links.is_empty() {
        return html.to_owned();
    }
    debug!("Linking {} footnote reference(s)", links.len());

    let body = lines.join("\n");
    let body = EMPTY_PARAGRAPH_RE.replace_all(&body, "");
    REFERENCE_RE
        .replace_all(&body, |caps: &Captures<'_>| match links.get(&caps[1]) {
            Some(href) => format!(r#"<a href="{href}"><sup>{}</sup></a>"#, &caps[1]),
            None => caps[0].to_owned(),
        })
        .into_owned()
}

/// Parse a definition line into `(id, href, remaining paragraph tags)`.
fn parse_definition(line: &str) -> Option<(String, String, String)> {
    let caps = DEFINITION_RE.captures(line)?;
    let href = HREF_RE.captures(&caps[3])?[1].to_owned();

    let mut residue = String::new();
    if caps.get(1).is_some() {
        residue.push_str("<p>");
    }
    if caps.get(4).is_some() {
        residue.push_str("</p>");
    }
    Some((caps[2].to_owned(), href, residue))
}
