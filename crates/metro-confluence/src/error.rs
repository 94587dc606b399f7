//! Error types for Confluence integration.

/// Error from Confluence API operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfluenceError {
    /// HTTP request failed (network error, timeout, etc).
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] ureq::Error),

    /// HTTP response error (server returned error status).
    #[error("HTTP error: {status} - {body}")]
    HttpResponse {
        /// HTTP status code.
        status: u16,
        /// Response body (may contain error details).
        body: String,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// XML parsing error.
    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// XML text decoding error.
    #[error("XML encoding error: {0}")]
    XmlEncoding(#[from] quick_xml::encoding::EncodingError),

    /// Response was well-formed but not what the API promises.
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl ConfluenceError {
    /// True for a 404 response.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::HttpResponse { status: 404, .. })
    }
}

/// Error publishing a single page.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// Confluence API error.
    #[error("Confluence API error: {0}")]
    Confluence(#[from] ConfluenceError),

    /// Reading an image or attachment failed.
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A create entry has no parent and no default parent is configured.
    #[error("No parent page for \"{0}\": set parent_id in the manifest or a default parent")]
    NoParent(String),

    /// An update entry without a target page.
    #[error("Update of \"{0}\" names no page id")]
    NoPageId(String),

    /// The planned parent was not created.
    #[error("Parent page \"{0}\" was not created")]
    ParentNotCreated(String),
}
