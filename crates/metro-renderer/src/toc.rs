//! Table of contents and "auto-generated" banner injection.
//!
//! Both are prepended to the converted document; the banner goes on top.

use std::fmt::Write;

use crate::util::escape_xml;

/// Table of contents macro options.
///
/// Missing fields take their defaults: levels 1 to 7, `list` layout, `disc` bullets.
/// Levels may be given as numbers or numeric strings.
/// See <https://confluence.atlassian.com/doc/table-of-contents-macro-182682099.html>.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TocOptions {
    /// Smallest heading level included.
    #[cfg_attr(feature = "serde", serde(deserialize_with = "deserialize_level"))]
    pub min_level: u8,
    /// Largest heading level included.
    #[cfg_attr(feature = "serde", serde(deserialize_with = "deserialize_level"))]
    pub max_level: u8,
    /// Layout: `list` or `flat`.
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub toc_type: String,
    /// Bullet style for list layout.
    pub style: String,
}

impl Default for TocOptions {
    fn default() -> Self {
        Self {
            min_level: 1,
            max_level: 7,
            toc_type: "list".to_owned(),
            style: "disc".to_owned(),
        }
    }
}

#[cfg(feature = "serde")]
fn deserialize_level<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::Deserialize;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawLevel {
        Number(u8),
        Text(String),
    }

    match RawLevel::deserialize(deserializer)? {
        RawLevel::Number(level) => Ok(level),
        RawLevel::Text(text) => text.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// Prepend a `toc` macro built from `options`.
pub(crate) fn prepend_toc(html: &str, options: &TocOptions) -> String {
    let mut toc = String::from("<ac:structured-macro ac:name=\"toc\">\n");
    let mut param = |name: &str, value: &str| {
        writeln!(toc, r#"<ac:parameter ac:name="{name}">{value}</ac:parameter>"#).unwrap();
    };
    param("printable", "true");
    param("style", &escape_xml(&options.style));
    param("maxLevel", &options.max_level.to_string());
    param("minLevel", &options.min_level.to_string());
    param("class", "rm-contents");
    param("exclude", "");
    param("type", &escape_xml(&options.toc_type));
    param("outline", "false");
    param("include", "");
    toc.push_str("</ac:structured-macro>");

    format!("{toc}\n{html}")
}

/// Prepend a panel telling readers the page is generated from `source`.
pub(crate) fn prepend_banner(html: &str, source: &str) -> String {
    format!(
        concat!(
            "<ac:structured-macro ac:name=\"panel\">\n",
            "<ac:parameter ac:name=\"title\">This page is auto-generated. Please do not Edit directly.</ac:parameter>\n",
            "<ac:rich-text-body>Make a suggestion or Pull Request to <a href=\"{}\"><b>the source file.</b></a></ac:rich-text-body>\n",
            "</ac:structured-macro>\n",
            "{}",
        ),
        escape_xml(source),
        html
    )
}
