//! Confluence page types.

use serde::Deserialize;

use super::deserialize_id;

/// Page summary returned by content endpoints.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PageInfo {
    /// Page ID.
    #[serde(deserialize_with = "deserialize_id")]
    pub id: u64,
    /// Page title.
    pub title: String,
    /// Version information.
    pub version: Version,
    /// Space the page lives in.
    #[serde(default)]
    pub space: Space,
}

/// Content version.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
pub struct Version {
    /// Version number.
    pub number: u32,
}

/// Space reference.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct Space {
    /// Space key.
    pub key: String,
}

/// A page above another in the page tree.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Ancestor {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: u64,
    pub title: String,
}

/// `GET /content/{id}?expand=ancestors`, root first.
#[derive(Debug, Deserialize)]
pub(crate) struct AncestorsResponse {
    #[serde(default)]
    pub ancestors: Vec<Ancestor>,
}

/// `GET /content/{id}/child?expand=page`.
#[derive(Debug, Deserialize)]
pub(crate) struct ChildrenResponse {
    pub page: ChildPages,
}

/// Child entries carry the same id and title fields as ancestors.
#[derive(Debug, Deserialize)]
pub(crate) struct ChildPages {
    pub results: Vec<Ancestor>,
}
