//! Markdown source documents: decoding, heading title and front matter.
//!
//! Jekyll-style sources start with a YAML block between `---` lines:
//!
//! ```text
//! ---
//! title: SQL Support Summary
//! excerpt: SQL support as compared to PostgreSQL
//! toc: false
//! tags: [dml, ddl, queries]
//! ---
//! ```

use std::path::Path;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::ManifestError;

/// Title used when a document has no `# ` heading.
const DEFAULT_TITLE: &str = "Untitled";

/// Parsed front matter fields.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FrontMatter {
    pub title: Option<String>,
    pub excerpt: Option<String>,
    /// Request a table of contents with default options.
    pub toc: Option<bool>,
    pub tags: Vec<String>,
}

/// A Markdown source split into its parts.
#[derive(Debug)]
pub struct SourceDocument {
    /// Text of the first `# ` heading, or `Untitled`.
    pub heading_title: String,
    pub front_matter: FrontMatter,
    /// Markdown with the front matter block removed.
    pub markdown: String,
}

impl SourceDocument {
    /// Read and split a Markdown file.
    ///
    /// # Errors
    ///
    /// Returns `ManifestError::Io` if the file cannot be read.
    pub fn read(path: &Path) -> Result<Self, ManifestError> {
        let bytes = std::fs::read(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let text = decode(bytes);
        let doc = Self::parse(&text);
        debug!("Read {} (title {:?})", path.display(), doc.heading_title);
        Ok(doc)
    }

    #[must_use]
    pub fn parse(text: &str) -> Self {
        let heading_title = text
            .lines()
            .find_map(|line| line.strip_prefix("# "))
            .map_or_else(|| DEFAULT_TITLE.to_owned(), |title| title.trim().to_owned());

        let (front_matter, markdown) = match split_front_matter(text) {
            Some((yaml, rest)) => (parse_front_matter(yaml), rest.to_owned()),
            None => (FrontMatter::default(), text.to_owned()),
        };

        Self {
            heading_title,
            front_matter,
            markdown,
        }
    }
}

/// Decode as UTF-8, falling back to Latin-1.
fn decode(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => {
            debug!("Source is not UTF-8, decoding as Latin-1");
            err.into_bytes().into_iter().map(char::from).collect()
        }
    }
}

/// Split a leading `---` block into `(yaml, rest)`.
fn split_front_matter(text: &str) -> Option<(&str, &str)> {
    let body = text
        .strip_prefix("---\n")
        .or_else(|| text.strip_prefix("---\r\n"))?;

    let mut offset = 0;
    for line in body.split_inclusive('\n') {
        if line.trim_end() == "---" {
            return Some((&body[..offset], &body[offset + line.len()..]));
        }
        offset += line.len();
    }
    None
}

fn parse_front_matter(yaml: &str) -> FrontMatter {
    if yaml.trim().is_empty() {
        return FrontMatter::default();
    }
    serde_yaml::from_str(yaml).unwrap_or_else(|e| {
        warn!("Ignoring malformed front matter: {}", e);
        FrontMatter::default()
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_heading_title() {
        let doc = SourceDocument::parse("Intro\n\n# Getting Started  \n\nText\n");
        assert_eq!(doc.heading_title, "Getting Started");
    }

    #[test]
    fn test_heading_title_default() {
        let doc = SourceDocument::parse("## Second level only\n");
        assert_eq!(doc.heading_title, "Untitled");
    }

    #[test]
    fn test_front_matter_parsed_and_removed() {
        let text = "---\ntitle: SQL Support\nexcerpt: Summary\ntoc: false\ntags: [dml, ddl]\n---\n# Heading\nBody\n";
        let doc = SourceDocument::parse(text);
        assert_eq!(
            doc.front_matter,
            FrontMatter {
                title: Some("SQL Support".to_owned()),
                excerpt: Some("Summary".to_owned()),
                toc: Some(false),
                tags: vec!["dml".to_owned(), "ddl".to_owned()],
            }
        );
        assert_eq!(doc.markdown, "# Heading\nBody\n");
        assert_eq!(doc.heading_title, "Heading");
    }

    #[test]
    fn test_no_front_matter() {
        let doc = SourceDocument::parse("# Title\n\n---\n\nAfter a rule\n");
        assert_eq!(doc.front_matter, FrontMatter::default());
        assert_eq!(doc.markdown, "# Title\n\n---\n\nAfter a rule\n");
    }

    #[test]
    fn test_unterminated_front_matter_kept() {
        let doc = SourceDocument::parse("---\ntitle: x\n# Title\n");
        assert_eq!(doc.front_matter, FrontMatter::default());
        assert!(doc.markdown.starts_with("---\n"));
    }

    #[test]
    fn test_malformed_front_matter_ignored() {
        let doc = SourceDocument::parse("---\ntitle: [unclosed\n---\nBody\n");
        assert_eq!(doc.front_matter, FrontMatter::default());
        assert_eq!(doc.markdown, "Body\n");
    }

    #[test]
    fn test_crlf_front_matter() {
        let doc = SourceDocument::parse("---\r\ntitle: Windows\r\n---\r\nBody\r\n");
        assert_eq!(doc.front_matter.title.as_deref(), Some("Windows"));
        assert_eq!(doc.markdown, "Body\r\n");
    }

    #[test]
    fn test_decode_latin1_fallback() {
        let bytes = b"# Caf\xe9\n".to_vec();
        assert_eq!(decode(bytes), "# Caf\u{e9}\n");
    }

    #[test]
    fn test_read_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.md");
        std::fs::write(&path, b"# R\xe9sum\xe9\n\nText\n").unwrap();

        let doc = SourceDocument::read(&path).unwrap();
        assert_eq!(doc.heading_title, "R\u{e9}sum\u{e9}");
    }

    #[test]
    fn test_read_missing_file() {
        let err = SourceDocument::read(Path::new("/nonexistent/page.md")).unwrap_err();
        assert!(matches!(err, ManifestError::Io { .. }));
    }
}
