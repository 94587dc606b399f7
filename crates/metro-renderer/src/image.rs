//! Image conversion.
//!
//! Images are uploaded as page attachments, so `<img src="images/a.png">`
//! becomes an `ac:image` referencing the attachment `a.png`.

use std::fmt::Write;
use std::sync::LazyLock;

use regex::{Captures, Regex};

static IMG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<img\b[^>]*>").unwrap());

static SRC_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"\ssrc="([^"]*)""#).unwrap());
static ALT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"\salt="([^"]*)""#).unwrap());
static WIDTH_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"\swidth="([^"]*)""#).unwrap());
static HEIGHT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\sheight="([^"]*)""#).unwrap());

/// Visual effects applied to every converted image.
const QUERY_PARAMS: &str = "effects=border-simple,blur-border";

/// Convert every `<img>` tag into an `ac:image` attachment reference.
pub(crate) fn convert(html: &str) -> String {
    IMG_RE
        .replace_all(html, |caps: &Captures<'_>| image_macro(&caps[0]))
        .into_owned()
}

fn image_macro(tag: &str) -> String {
    let mut out = format!(r#"<ac:image ac:queryparams="{QUERY_PARAMS}""#);
    if let Some(alt) = attribute(tag, &ALT_RE) {
        write!(out, r#" ac:alt="{alt}" ac:title="{alt}""#).unwrap();
    }
    if let Some(width) = attribute(tag, &WIDTH_RE) {
        write!(out, r#" ac:width="{width}""#).unwrap();
    }
    if let Some(height) = attribute(tag, &HEIGHT_RE) {
        write!(out, r#" ac:height="{height}""#).unwrap();
    }
    out.push('>');

    if let Some(src) = attribute(tag, &SRC_RE) {
        write!(out, r#"<ri:attachment ri:filename="{}" />"#, basename(&src)).unwrap();
    }

    out.push_str("</ac:image>");
    out
}

fn attribute(tag: &str, re: &Regex) -> Option<String> {
    re.captures(tag).map(|caps| caps[1].to_owned())
}

/// Last path segment of an image source.
fn basename(src: &str) -> &str {
    src.rsplit(['/', '\\']).next().unwrap_or(src)
}
