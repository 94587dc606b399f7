//! Content property operations for Confluence API.

use serde_json::json;
use tracing::debug;

use super::ConfluenceClient;
use crate::error::ConfluenceError;
use crate::types::Checksum;

/// Property key holding the content checksum.
const CHECKSUM_KEY: &str = "checksum";

impl ConfluenceClient {
    fn checksum_url(&self, page_id: u64) -> String {
        format!("{}/{}/property/{}", self.rest_url(), page_id, CHECKSUM_KEY)
    }

    /// Get the stored checksum; a missing property is `None`.
    pub(crate) fn get_checksum(&self, page_id: u64) -> Result<Option<Checksum>, ConfluenceError> {
        match self.get(&self.checksum_url(page_id)) {
            Ok(mut body) => Ok(Some(body.read_json()?)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Create the checksum property, or bump it when `existing` is given.
    pub(crate) fn put_checksum(
        &self,
        page_id: u64,
        value: &str,
        existing: Option<&Checksum>,
    ) -> Result<(), ConfluenceError> {
        let url = self.checksum_url(page_id);
        let mut payload = json!({"key": CHECKSUM_KEY, "value": value});

        if let Some(current) = existing {
            payload["version"] = json!({"number": current.version.number + 1});
            self.put_json(&url, &payload)?;
        } else {
            self.post_json(&url, &payload)?;
        }
        debug!("Stored checksum {} for page {}", value, page_id);
        Ok(())
    }
}
