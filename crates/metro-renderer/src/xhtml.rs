//! HTML to XHTML cleanup.
//!
//! The sanitizer serializes `<col>` as an HTML void element; Confluence's
//! XHTML parser needs it closed.

use std::sync::LazyLock;

use regex::{Captures, Regex};

static COL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<col(?:\s[^>]*)?>(</col>)?").unwrap());

/// Close `<col>` tags that are not already closed.
pub(crate) fn convert(html: &str) -> String {
    COL_RE
        .replace_all(html, |caps: &Captures<'_>| {
            if caps.get(1).is_some() || caps[0].ends_with("/>") {
                caps[0].to_owned()
            } else {
                format!("{}</col>", &caps[0])
            }
        })
        .into_owned()
}
