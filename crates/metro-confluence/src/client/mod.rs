//! Confluence REST API client.
//!
//! Sync HTTP client for Confluence Server/Data Center REST API with HTTP
//! basic authentication.

mod attachments;
mod pages;
mod properties;

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use tracing::info;
use ureq::http::Response;
use ureq::{Agent, Body};

use crate::error::ConfluenceError;
use crate::types::{Ancestor, Attachment, Checksum, PageInfo};
use crate::wiki::Wiki;

/// Confluence REST API client.
pub struct ConfluenceClient {
    agent: Agent,
    base_url: String,
    authorization: String,
    /// Children by parent id, filled on first lookup.
    children_cache: Mutex<HashMap<u64, BTreeMap<String, u64>>>,
}

impl ConfluenceClient {
    /// Create a client authenticating as `username`.
    #[must_use]
    pub fn new(base_url: &str, username: &str, password: &str, timeout: Duration) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();

        let credentials = BASE64_STANDARD.encode(format!("{username}:{password}"));

        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_owned(),
            authorization: format!("Basic {credentials}"),
            children_cache: Mutex::new(HashMap::new()),
        }
    }

    /// Server base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Server version from the application links manifest.
    ///
    /// Used to check the credentials before publishing.
    ///
    /// # Errors
    ///
    /// Returns `HttpResponse` with status 401 for bad credentials, or an XML
    /// error if the manifest cannot be parsed.
    pub fn server_version(&self) -> Result<Option<String>, ConfluenceError> {
        let url = format!("{}/rest/applinks/1.0/manifest", self.base_url);
        info!("Authenticating against {}", self.base_url);

        let response = self
            .agent
            .get(&url)
            .header("Authorization", &self.authorization)
            .header("Accept", "application/xml")
            .call()?;
        let xml = check(response)?.read_to_string()?;
        parse_manifest_version(&xml)
    }

    /// Content REST endpoint.
    fn rest_url(&self) -> String {
        format!("{}/rest/api/content", self.base_url)
    }

    fn get(&self, url: &str) -> Result<Body, ConfluenceError> {
        let response = self
            .agent
            .get(url)
            .header("Authorization", &self.authorization)
            .header("Accept", "application/json")
            .call()?;
        check(response)
    }

    fn post_json(&self, url: &str, payload: &serde_json::Value) -> Result<Body, ConfluenceError> {
        let payload_bytes = serde_json::to_vec(payload)?;
        let response = self
            .agent
            .post(url)
            .header("Authorization", &self.authorization)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .send(&payload_bytes[..])?;
        check(response)
    }

    fn put_json(&self, url: &str, payload: &serde_json::Value) -> Result<Body, ConfluenceError> {
        let payload_bytes = serde_json::to_vec(payload)?;
        let response = self
            .agent
            .put(url)
            .header("Authorization", &self.authorization)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .send(&payload_bytes[..])?;
        check(response)
    }

    fn cached_children(&self, page_id: u64) -> Option<BTreeMap<String, u64>> {
        self.children_cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&page_id)
            .cloned()
    }

    fn cache_children(&self, page_id: u64, children: BTreeMap<String, u64>) {
        self.children_cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(page_id, children);
    }

    fn invalidate_children(&self, page_id: u64) {
        self.children_cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&page_id);
    }
}

impl Wiki for ConfluenceClient {
    fn info(&self, page_id: u64) -> Result<PageInfo, ConfluenceError> {
        self.get_page_info(page_id)
    }

    fn ancestors(&self, page_id: u64) -> Result<Vec<Ancestor>, ConfluenceError> {
        self.get_ancestors(page_id)
    }

    fn children(&self, page_id: u64) -> Result<BTreeMap<String, u64>, ConfluenceError> {
        self.get_children(page_id)
    }

    fn create_page(
        &self,
        parent_id: u64,
        space_key: &str,
        title: &str,
        body: &str,
    ) -> Result<PageInfo, ConfluenceError> {
        self.post_page(parent_id, space_key, title, body)
    }

    fn update_page(
        &self,
        page_id: u64,
        title: &str,
        body: &str,
        version: u32,
        parent_id: Option<u64>,
    ) -> Result<PageInfo, ConfluenceError> {
        self.put_page(page_id, title, body, version, parent_id)
    }

    fn delete_page(&self, page_id: u64) -> Result<(), ConfluenceError> {
        self.remove_page(page_id)
    }

    fn checksum(&self, page_id: u64) -> Result<Option<Checksum>, ConfluenceError> {
        self.get_checksum(page_id)
    }

    fn set_checksum(
        &self,
        page_id: u64,
        value: &str,
        existing: Option<&Checksum>,
    ) -> Result<(), ConfluenceError> {
        self.put_checksum(page_id, value, existing)
    }

    fn attachment(
        &self,
        page_id: u64,
        filename: &str,
    ) -> Result<Option<Attachment>, ConfluenceError> {
        self.find_attachment(page_id, filename)
    }

    fn download(&self, attachment: &Attachment) -> Result<Vec<u8>, ConfluenceError> {
        self.download_attachment(attachment)
    }

    fn upload_attachment(
        &self,
        page_id: u64,
        filename: &str,
        data: &[u8],
        content_type: &str,
        existing: Option<&Attachment>,
    ) -> Result<Attachment, ConfluenceError> {
        self.post_attachment(page_id, filename, data, content_type, existing)
    }

    fn page_url(&self, page_id: u64) -> String {
        self.view_url(page_id)
    }
}

/// Turn an error status into `HttpResponse`, keeping the body for details.
fn check(response: Response<Body>) -> Result<Body, ConfluenceError> {
    let status = response.status().as_u16();
    let mut body_reader = response.into_body();

    if status >= 400 {
        let error_body = body_reader
            .read_to_string()
            .unwrap_or_else(|_| "(unable to read error body)".to_owned());
        return Err(ConfluenceError::HttpResponse {
            status,
            body: error_body,
        });
    }
    Ok(body_reader)
}

/// Text of the `<version>` element directly under the manifest root.
fn parse_manifest_version(xml: &str) -> Result<Option<String>, ConfluenceError> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut depth = 0usize;
    let mut in_version = false;
    let mut version: Option<String> = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                depth += 1;
                if depth == 2 && e.local_name().as_ref() == b"version" {
                    in_version = true;
                    version = Some(String::new());
                }
            }
            Event::End(_) => {
                in_version = false;
                depth = depth.saturating_sub(1);
            }
            Event::Text(e) if in_version => {
                let text = reader.decoder().decode(&e)?;
                if let Some(version) = version.as_mut() {
                    version.push_str(text.trim());
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(version.filter(|v| !v.is_empty()))
}
