//! Confluence attachment types.

use serde::Deserialize;

/// Confluence attachment.
///
/// Only includes fields that are actually used.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Attachment {
    /// Attachment ID (e.g. `att12345`).
    pub id: String,
    /// Attachment filename.
    pub title: String,
    #[serde(rename = "_links", default)]
    pub links: AttachmentLinks,
}

/// Attachment links.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct AttachmentLinks {
    /// Download path relative to the server base URL.
    #[serde(default)]
    pub download: Option<String>,
}

/// Attachments API response.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct AttachmentsResponse {
    /// List of attachments.
    pub results: Vec<Attachment>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_attachments() {
        let json = r#"{"results": [{
            "id": "att42",
            "type": "attachment",
            "title": "diagram.png",
            "_links": {"download": "/download/attachments/1/diagram.png?version=1"}
        }], "size": 1}"#;
        let response: AttachmentsResponse = serde_json::from_str(json).unwrap();
        let attachment = &response.results[0];
        assert_eq!(attachment.id, "att42");
        assert_eq!(
            attachment.links.download.as_deref(),
            Some("/download/attachments/1/diagram.png?version=1")
        );
    }
}
