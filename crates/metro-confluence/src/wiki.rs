//! The operations the publisher needs from a wiki.

use std::collections::BTreeMap;

use crate::error::ConfluenceError;
use crate::types::{Ancestor, Attachment, Checksum, PageInfo};

/// Remote page store.
///
/// [`ConfluenceClient`](crate::ConfluenceClient) talks to a real server;
/// `MockWiki` (feature `mock`) keeps everything in memory.
pub trait Wiki {
    /// Title, version and space of a page.
    fn info(&self, page_id: u64) -> Result<PageInfo, ConfluenceError>;

    /// Pages above `page_id`, root first.
    fn ancestors(&self, page_id: u64) -> Result<Vec<Ancestor>, ConfluenceError>;

    /// Direct children of a page, by title.
    fn children(&self, page_id: u64) -> Result<BTreeMap<String, u64>, ConfluenceError>;

    /// Create a page under `parent_id` in space `space_key`.
    fn create_page(
        &self,
        parent_id: u64,
        space_key: &str,
        title: &str,
        body: &str,
    ) -> Result<PageInfo, ConfluenceError>;

    /// Replace a page's title and body.
    ///
    /// `version` is the current version; the new one is `version + 1`.
    /// `parent_id` keeps the page under that parent.
    fn update_page(
        &self,
        page_id: u64,
        title: &str,
        body: &str,
        version: u32,
        parent_id: Option<u64>,
    ) -> Result<PageInfo, ConfluenceError>;

    fn delete_page(&self, page_id: u64) -> Result<(), ConfluenceError>;

    /// Stored content checksum, if any.
    fn checksum(&self, page_id: u64) -> Result<Option<Checksum>, ConfluenceError>;

    /// Store a content checksum, replacing `existing` when given.
    fn set_checksum(
        &self,
        page_id: u64,
        value: &str,
        existing: Option<&Checksum>,
    ) -> Result<(), ConfluenceError>;

    /// Attachment on a page by filename.
    fn attachment(
        &self,
        page_id: u64,
        filename: &str,
    ) -> Result<Option<Attachment>, ConfluenceError>;

    /// Current content of an attachment.
    fn download(&self, attachment: &Attachment) -> Result<Vec<u8>, ConfluenceError>;

    /// Upload a new attachment, or new data for `existing`.
    fn upload_attachment(
        &self,
        page_id: u64,
        filename: &str,
        data: &[u8],
        content_type: &str,
        existing: Option<&Attachment>,
    ) -> Result<Attachment, ConfluenceError>;

    /// Browser URL of a page.
    fn page_url(&self, page_id: u64) -> String;
}
