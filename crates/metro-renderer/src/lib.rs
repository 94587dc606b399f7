//! Markdown to Confluence storage format conversion.
//!
//! This crate turns a Markdown document into the XHTML dialect accepted by
//! Confluence's `body.storage` field.
//!
//! # Pipeline
//!
//! 1. Markdown is rendered to HTML with `pulldown-cmark` (tables enabled).
//! 2. The HTML is restricted to a fixed tag/attribute/style allow-list with `ammonia`.
//! 3. A leading line repeating the page title is dropped.
//! 4. Rewrite passes turn generic HTML into Confluence macros, in order:
//!    callouts and blockquote directives, code blocks, XHTML cleanup,
//!    images, footnote references.
//! 5. An optional table of contents and an optional "auto-generated" banner
//!    are prepended.
//!
//! # Extension syntax
//!
//! - `~?text?~`, `~!text!~`, `~%text%~`: info, note and warning callouts.
//! - `> Info: ...`, `> Note: ...`, `> Warning: ...`: callouts from blockquotes.
//! - `> Panel: Title` / `> Expand: Title` followed by body lines.
//! - `> ExpandAll`, `> LiveSearch`: standalone macros.
//! - `[^1] [label](https://...)` plus inline `[^1]`: superscript links.
//!
//! # Example
//!
//! ```
//! use metro_renderer::{MarkdownConverter, TocOptions};
//!
//! let converter = MarkdownConverter::new();
//! let markup = converter.render(
//!     "Guide",
//!     "# Guide\n\n> Note: remember this.\n",
//!     Some(&TocOptions::default()),
//!     None,
//! );
//! assert!(markup.contains(r#"ac:name="note""#));
//! assert!(markup.starts_with(r#"<ac:structured-macro ac:name="toc">"#));
//! ```

mod cdata;
mod code;
mod converter;
mod footnotes;
mod image;
mod macros;
mod sanitize;
mod toc;
mod util;
mod xhtml;

pub use converter::{MarkdownConverter, render};
pub use toc::TocOptions;
pub use util::escape_xml;
