//! HTML allow-list applied to rendered Markdown before conversion.
//!
//! Anything Confluence's storage format would reject, or that the passes do
//! not expect, is removed here. Disallowed tags are stripped and their text
//! content kept.

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};

use ammonia::Builder;

/// CSS properties kept inside `style` attributes.
const STYLE_PROPERTIES: [&str; 3] = ["color", "font-family", "width"];

/// Allow-list sanitizer.
pub(crate) struct Sanitizer {
    builder: Builder<'static>,
}

impl Sanitizer {
    pub(crate) fn new() -> Self {
        let mut builder = Builder::default();

        builder.tags(HashSet::from([
            "a",
            "abbr",
            "acronym",
            "b",
            "blockquote",
            "col",
            "colgroup",
            "pre",
            "code",
            "em",
            "i",
            "li",
            "ol",
            "strong",
            "ul",
            "p",
            "h1",
            "h2",
            "h3",
            "h4",
            "h5",
            "h6",
            "img",
            "table",
            "th",
            "thead",
            "tbody",
            "tr",
            "td",
        ]));
        builder.tag_attributes(HashMap::from([
            ("a", HashSet::from(["href", "title", "id"])),
            ("abbr", HashSet::from(["title"])),
            ("acronym", HashSet::from(["title"])),
            ("col", HashSet::from(["width"])),
            ("colgroup", HashSet::from(["valign"])),
            ("img", HashSet::from(["alt", "src", "width", "height"])),
            ("th", HashSet::from(["id"])),
            ("td", HashSet::from(["headers"])),
        ]));
        builder.generic_attributes(HashSet::from(["style"]));
        builder.link_rel(None);
        builder.strip_comments(true);

        builder.attribute_filter(|_element, attribute, value| {
            if attribute.eq_ignore_ascii_case("style") {
                filter_style(value).map(Cow::Owned)
            } else {
                Some(Cow::Borrowed(value))
            }
        });

        Self { builder }
    }

    pub(crate) fn clean(&self, html: &str) -> String {
        self.builder.clean(html).to_string()
    }
}

/// Keep only allowed declarations; `None` drops the attribute.
fn filter_style(value: &str) -> Option<String> {
    let kept: Vec<&str> = value
        .split(';')
        .map(str::trim)
        .filter(|decl| {
            decl.split_once(':').is_some_and(|(property, _)| {
                let property = property.trim();
                STYLE_PROPERTIES
                    .iter()
                    .any(|allowed| property.eq_ignore_ascii_case(allowed))
            })
        })
        .collect();

    if kept.is_empty() {
        None
    } else {
        Some(kept.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_allowed_markup_kept() {
        let html = r#"<p>A <strong>bold</strong> <a href="https://x.example" title="t">link</a></p>"#;
        assert_eq!(Sanitizer::new().clean(html), html);
    }

    #[test]
    fn test_disallowed_tags_stripped() {
        let result = Sanitizer::new().clean("<p>a <span>b</span> <div>c</div></p>");
        assert!(!result.contains("<span>"));
        assert!(!result.contains("<div>"));
        assert!(result.contains('b'));
        assert!(result.contains('c'));
    }

    #[test]
    fn test_script_removed() {
        let result = Sanitizer::new().clean("<p>x</p><script>alert(1)</script>");
        assert_eq!(result, "<p>x</p>");
    }

    #[test]
    fn test_comments_removed() {
        assert_eq!(Sanitizer::new().clean("<p>a<!-- hidden -->b</p>"), "<p>ab</p>");
    }

    #[test]
    fn test_disallowed_attributes_removed() {
        let result = Sanitizer::new().clean(r#"<p class="x" onclick="y()">t</p>"#);
        assert_eq!(result, "<p>t</p>");
    }

    #[test]
    fn test_no_rel_added() {
        let result = Sanitizer::new().clean(r#"<a href="https://x.example">x</a>"#);
        assert!(!result.contains("rel="));
    }

    #[test]
    fn test_image_attributes_kept() {
        let result =
            Sanitizer::new().clean(r#"<img src="images/a.png" alt="A" width="10" loading="lazy">"#);
        assert!(result.contains(r#"src="images/a.png""#));
        assert!(result.contains(r#"alt="A""#));
        assert!(result.contains(r#"width="10""#));
        assert!(!result.contains("loading"));
    }

    #[test]
    fn test_filter_style() {
        assert_eq!(
            filter_style("color: red; position: absolute; width: 10px"),
            Some("color: red; width: 10px".to_owned())
        );
        assert_eq!(filter_style("position: fixed"), None);
        assert_eq!(filter_style(""), None);
        assert_eq!(
            filter_style("Font-Family: serif;"),
            Some("Font-Family: serif".to_owned())
        );
    }

    #[test]
    fn test_style_attribute_filtered() {
        let result = Sanitizer::new().clean(r#"<p style="color: blue; float: left">x</p>"#);
        assert_eq!(result, r#"<p style="color: blue">x</p>"#);
    }
}
