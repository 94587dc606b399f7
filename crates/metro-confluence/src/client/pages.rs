//! Page operations for Confluence API.

use std::collections::BTreeMap;

use serde_json::json;
use tracing::{debug, info};

use super::{ConfluenceClient, check};
use crate::error::ConfluenceError;
use crate::types::{Ancestor, AncestorsResponse, ChildrenResponse, PageInfo};

/// Page size for child listings; the server caps it at 200.
const CHILDREN_LIMIT: usize = 200;

impl ConfluenceClient {
    /// Get page title, version and space.
    pub(crate) fn get_page_info(&self, page_id: u64) -> Result<PageInfo, ConfluenceError> {
        let url = format!("{}/{}?expand=version,space", self.rest_url(), page_id);
        info!("Getting page {}", page_id);
        Ok(self.get(&url)?.read_json()?)
    }

    /// Get the pages above a page, root first.
    pub(crate) fn get_ancestors(&self, page_id: u64) -> Result<Vec<Ancestor>, ConfluenceError> {
        let url = format!("{}/{}?expand=ancestors", self.rest_url(), page_id);
        let response: AncestorsResponse = self.get(&url)?.read_json()?;
        Ok(response.ancestors)
    }

    /// Get direct children by title, paging through the full listing once.
    pub(crate) fn get_children(
        &self,
        page_id: u64,
    ) -> Result<BTreeMap<String, u64>, ConfluenceError> {
        if let Some(children) = self.cached_children(page_id) {
            return Ok(children);
        }

        let mut children = BTreeMap::new();
        let mut start = 0;
        loop {
            let url = format!(
                "{}/{}/child?expand=page&start={}&limit={}",
                self.rest_url(),
                page_id,
                start,
                CHILDREN_LIMIT
            );
            let response: ChildrenResponse = self.get(&url)?.read_json()?;
            let count = response.page.results.len();
            children.extend(
                response
                    .page
                    .results
                    .into_iter()
                    .map(|child| (child.title, child.id)),
            );
            if count < CHILDREN_LIMIT {
                break;
            }
            start += count;
        }

        debug!("Page {} has {} children", page_id, children.len());
        self.cache_children(page_id, children.clone());
        Ok(children)
    }

    /// Create a page under `parent_id`.
    pub(crate) fn post_page(
        &self,
        parent_id: u64,
        space_key: &str,
        title: &str,
        body: &str,
    ) -> Result<PageInfo, ConfluenceError> {
        let payload = json!({
            "type": "page",
            "title": title,
            "ancestors": [{"type": "page", "id": parent_id.to_string()}],
            "space": {"key": space_key},
            "body": {
                "storage": {
                    "value": body,
                    "representation": "storage"
                }
            }
        });

        let page: PageInfo = self.post_json(&self.rest_url(), &payload)?.read_json()?;
        self.invalidate_children(parent_id);
        info!(
            "Created page \"{}\" (id={}) under {}",
            page.title, page.id, parent_id
        );
        Ok(page)
    }

    /// Update existing page (auto-increments version).
    pub(crate) fn put_page(
        &self,
        page_id: u64,
        title: &str,
        body: &str,
        version: u32,
        parent_id: Option<u64>,
    ) -> Result<PageInfo, ConfluenceError> {
        let url = format!("{}/{}", self.rest_url(), page_id);

        let mut payload = json!({
            "id": page_id.to_string(),
            "type": "page",
            "title": title,
            "body": {
                "storage": {
                    "value": body,
                    "representation": "storage"
                }
            },
            "version": {"number": version + 1}
        });
        if let Some(parent) = parent_id {
            payload["ancestors"] = json!([{"type": "page", "id": parent.to_string()}]);
        }

        info!(
            "Updating page {} from version {} to {}",
            page_id,
            version,
            version + 1
        );
        Ok(self.put_json(&url, &payload)?.read_json()?)
    }

    /// Delete a page.
    pub(crate) fn remove_page(&self, page_id: u64) -> Result<(), ConfluenceError> {
        let url = format!("{}/{}", self.rest_url(), page_id);
        let response = self
            .agent
            .delete(&url)
            .header("Authorization", &self.authorization)
            .call()?;
        check(response)?;
        info!("Deleted page {}", page_id);
        Ok(())
    }

    /// Browser URL for a page.
    pub(crate) fn view_url(&self, page_id: u64) -> String {
        format!(
            "{}/pages/viewpage.action?pageId={}",
            self.base_url, page_id
        )
    }
}
