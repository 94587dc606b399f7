//! Metro manifest parsing, validation and page planning.
//!
//! A manifest is a JSON file listing the pages to publish:
//!
//! ```json
//! {
//!   "pages": [
//!     {"operation": "create", "folder": "docs", "file": "guide.md", "parent_id": 123,
//!      "images": ["images/diagram.png"], "table_of_contents": {"max_level": 3},
//!      "children": [{"operation": "create", "folder": "docs", "file": "faq.md"}]},
//!     {"operation": "update", "file": "README.md", "page_id": 456},
//!     {"operation": "delete", "page_id": 789}
//!   ]
//! }
//! ```
//!
//! [`Manifest::load`] validates every page, reads and renders each Markdown
//! source to Confluence storage format, and returns ordered lists of pages
//! to create, update and delete.

mod document;
mod entry;
mod error;
mod manifest;

pub use document::{FrontMatter, SourceDocument};
pub use error::ManifestError;
pub use manifest::{Manifest, PagePlan, ParentRef};
