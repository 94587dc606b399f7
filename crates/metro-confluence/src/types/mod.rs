//! Confluence REST API types.

mod attachment;
mod page;
mod property;

pub use attachment::{Attachment, AttachmentLinks};
pub(crate) use attachment::AttachmentsResponse;
pub use page::{Ancestor, PageInfo, Space, Version};
pub(crate) use page::{AncestorsResponse, ChildrenResponse};
pub use property::Checksum;

use serde::{Deserialize, Deserializer};

/// Confluence sends content ids as strings; accept numbers too.
pub(crate) fn deserialize_id<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(u64),
        Text(String),
    }

    match RawId::deserialize(deserializer)? {
        RawId::Number(id) => Ok(id),
        RawId::Text(text) => text.parse().map_err(serde::de::Error::custom),
    }
}
