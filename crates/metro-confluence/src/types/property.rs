//! Content property types.

use serde::Deserialize;

use super::Version;

/// Content checksum stored in the `checksum` page property.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Checksum {
    /// Hex digest of the published title and body.
    pub value: String,
    /// Property version, bumped on every write.
    pub version: Version,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_property() {
        let json = r#"{"id": "77", "key": "checksum", "value": "abc123", "version": {"number": 3}}"#;
        let checksum: Checksum = serde_json::from_str(json).unwrap();
        assert_eq!(checksum.value, "abc123");
        assert_eq!(checksum.version.number, 3);
    }
}
