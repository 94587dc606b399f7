//! Page attachments: lookup by filename, download and multipart upload.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use rand::RngExt;
use tracing::info;

use super::{ConfluenceClient, check};
use crate::error::ConfluenceError;
use crate::types::{Attachment, AttachmentsResponse};

/// RFC 3986 unreserved characters stay as they are.
const QUERY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

impl ConfluenceClient {
    fn attachments_url(&self, page_id: u64) -> String {
        format!("{}/{}/child/attachment", self.rest_url(), page_id)
    }

    /// Find an attachment on a page by filename.
    pub(crate) fn find_attachment(
        &self,
        page_id: u64,
        filename: &str,
    ) -> Result<Option<Attachment>, ConfluenceError> {
        let url = format!(
            "{}?filename={}",
            self.attachments_url(page_id),
            utf8_percent_encode(filename, QUERY_ENCODE_SET)
        );
        let response: AttachmentsResponse = self.get(&url)?.read_json()?;
        Ok(response
            .results
            .into_iter()
            .find(|a| a.title == filename))
    }

    /// Download attachment content.
    pub(crate) fn download_attachment(
        &self,
        attachment: &Attachment,
    ) -> Result<Vec<u8>, ConfluenceError> {
        let path = attachment.links.download.as_deref().ok_or_else(|| {
            ConfluenceError::UnexpectedResponse(format!(
                "attachment {} has no download link",
                attachment.id
            ))
        })?;
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .agent
            .get(&url)
            .header("Authorization", &self.authorization)
            .call()?;
        Ok(check(response)?
            .with_config()
            .limit(u64::MAX)
            .read_to_vec()?)
    }

    /// Upload a new attachment, or new data for `existing`.
    pub(crate) fn post_attachment(
        &self,
        page_id: u64,
        filename: &str,
        data: &[u8],
        content_type: &str,
        existing: Option<&Attachment>,
    ) -> Result<Attachment, ConfluenceError> {
        let url = if let Some(att) = existing {
            info!(
                "Updating existing attachment '{}' (id={})",
                filename, att.id
            );
            format!("{}/{}/data", self.attachments_url(page_id), att.id)
        } else {
            info!(
                "Uploading new attachment '{}' to page {}",
                filename, page_id
            );
            self.attachments_url(page_id)
        };

        // multipart/form-data with a single `file` part
        let boundary = format!("----MetroFormBoundary{:016x}", rand::rng().random::<u64>());
        let mut body = Vec::with_capacity(data.len() + 256);
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n")
                .as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());

        let response = self
            .agent
            .post(&url)
            .header("Authorization", &self.authorization)
            .header(
                "Content-Type",
                &format!("multipart/form-data; boundary={boundary}"),
            )
            .header("X-Atlassian-Token", "no-check")
            .header("Accept", "application/json")
            .send(&body[..])?;
        let mut body_reader = check(response)?;

        // Response is a list for new uploads, single object for updates
        if existing.is_some() {
            Ok(body_reader.read_json()?)
        } else {
            let response: AttachmentsResponse = body_reader.read_json()?;
            response.results.into_iter().next().ok_or_else(|| {
                ConfluenceError::UnexpectedResponse("empty attachment response".to_owned())
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filename_query_encoding() {
        let encode = |s| utf8_percent_encode(s, QUERY_ENCODE_SET).to_string();
        assert_eq!(encode("diagram-v2_final.png"), "diagram-v2_final.png");
        assert_eq!(encode("my file&x.png"), "my%20file%26x.png");
        assert_eq!(encode("caf\u{e9}.png"), "caf%C3%A9.png");
    }
}
