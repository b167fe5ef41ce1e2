//! Role-connection metadata: the per-user document and the application schema.
//!
//! Discord compares each metadata value against the thresholds a server admin
//! configures on a linked role. Values travel as strings: booleans as `"1"`
//! or `"0"`, integers and dates in their decimal / ISO 8601 form.

use crate::constants::metadata_keys;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ═══════════════════════════════════════════════════════════════════════
// Document
// ═══════════════════════════════════════════════════════════════════════

/// Flat key/value document pushed to a user's role connection.
///
/// Always regenerated in full; Discord replaces the stored document on every
/// push.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetadataDocument(BTreeMap<String, String>);

impl MetadataDocument {
    /// Create an empty document.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Set a boolean value (`"1"` / `"0"`).
    #[must_use]
    pub fn with_bool(mut self, key: &str, value: bool) -> Self {
        self.0
            .insert(key.to_string(), if value { "1" } else { "0" }.to_string());
        self
    }

    /// Set an integer value.
    #[must_use]
    pub fn with_integer(mut self, key: &str, value: i64) -> Self {
        self.0.insert(key.to_string(), value.to_string());
        self
    }

    /// Set a raw string value (dates, pre-formatted numbers).
    #[must_use]
    pub fn with_value(mut self, key: &str, value: impl Into<String>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    /// Look up a value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the document has no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over key/value pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MetadataDocument {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Body of the role-connection endpoint (`PUT` request and `GET` response).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleConnection {
    /// Name shown next to the connection on the user's profile.
    #[serde(default)]
    pub platform_name: Option<String>,

    /// Optional account name on the platform.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform_username: Option<String>,

    /// Metadata values keyed by schema key.
    #[serde(default)]
    pub metadata: MetadataDocument,
}

// ═══════════════════════════════════════════════════════════════════════
// Profile
// ═══════════════════════════════════════════════════════════════════════

/// Game-side profile attributes that feed the metadata document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedProfile {
    /// Whether the in-game profile is public.
    pub profile_visible: bool,

    /// Whether a game account is connected.
    pub connected: bool,

    /// Date the game account was connected (ISO 8601).
    pub connected_date: Option<String>,

    /// In-game level.
    pub level: Option<i64>,
}

impl LinkedProfile {
    /// Render the profile as the linked-role metadata document.
    ///
    /// Missing dates and levels are sent as `"0"`.
    ///
    /// # Examples
    ///
    /// ```
    /// use linked_roles_discord::metadata::LinkedProfile;
    ///
    /// let doc = LinkedProfile {
    ///     profile_visible: true,
    ///     connected: false,
    ///     connected_date: None,
    ///     level: None,
    /// }
    /// .to_document();
    ///
    /// assert_eq!(doc.get("viewprofile"), Some("1"));
    /// assert_eq!(doc.get("zzzconnect"), Some("0"));
    /// assert_eq!(doc.get("zzzdate"), Some("0"));
    /// assert_eq!(doc.get("zzzlevel"), Some("0"));
    /// ```
    #[must_use]
    pub fn to_document(&self) -> MetadataDocument {
        let date = self
            .connected_date
            .as_deref()
            .filter(|d| !d.is_empty())
            .unwrap_or("0");

        MetadataDocument::new()
            .with_bool(metadata_keys::VIEW_PROFILE, self.profile_visible)
            .with_bool(metadata_keys::CONNECTED, self.connected)
            .with_value(metadata_keys::CONNECTED_DATE, date)
            .with_integer(metadata_keys::LEVEL, self.level.unwrap_or(0))
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Schema
// ═══════════════════════════════════════════════════════════════════════

/// Comparison Discord applies between a user's value and a role's threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum MetadataType {
    /// Value is less than or equal to the threshold.
    IntegerLessThanOrEqual = 1,
    /// Value is greater than or equal to the threshold.
    IntegerGreaterThanOrEqual = 2,
    /// Value equals the threshold.
    IntegerEqual = 3,
    /// Value does not equal the threshold.
    IntegerNotEqual = 4,
    /// Date is less than or equal to the threshold (days ago).
    DatetimeLessThanOrEqual = 5,
    /// Date is greater than or equal to the threshold (days ago).
    DatetimeGreaterThanOrEqual = 6,
    /// Value equals the threshold (1).
    BooleanEqual = 7,
    /// Value does not equal the threshold (1).
    BooleanNotEqual = 8,
}

impl From<MetadataType> for u8 {
    fn from(kind: MetadataType) -> Self {
        kind as Self
    }
}

impl TryFrom<u8> for MetadataType {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Ok(match code {
            1 => Self::IntegerLessThanOrEqual,
            2 => Self::IntegerGreaterThanOrEqual,
            3 => Self::IntegerEqual,
            4 => Self::IntegerNotEqual,
            5 => Self::DatetimeLessThanOrEqual,
            6 => Self::DatetimeGreaterThanOrEqual,
            7 => Self::BooleanEqual,
            8 => Self::BooleanNotEqual,
            other => return Err(format!("unknown role connection metadata type: {other}")),
        })
    }
}

/// One field declaration in the application's role-connection schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataField {
    /// Document key (`a-z`, `0-9`, `_`, at most 50 characters).
    pub key: String,

    /// Field name shown to server admins.
    pub name: String,

    /// Field description shown to server admins.
    pub description: String,

    /// Comparison type.
    #[serde(rename = "type")]
    pub kind: MetadataType,
}

impl MetadataField {
    /// Declare a field.
    #[must_use]
    pub fn new(key: &str, name: &str, description: &str, kind: MetadataType) -> Self {
        Self {
            key: key.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            kind,
        }
    }
}

/// Schema matching the document produced by [`LinkedProfile::to_document`].
#[must_use]
pub fn default_schema() -> Vec<MetadataField> {
    vec![
        MetadataField::new(
            metadata_keys::VIEW_PROFILE,
            "Public profile",
            "Profile is publicly visible",
            MetadataType::BooleanEqual,
        ),
        MetadataField::new(
            metadata_keys::CONNECTED,
            "Game linked",
            "Game account is connected",
            MetadataType::BooleanEqual,
        ),
        MetadataField::new(
            metadata_keys::CONNECTED_DATE,
            "Linked since",
            "Days since the game account was connected",
            MetadataType::DatetimeGreaterThanOrEqual,
        ),
        MetadataField::new(
            metadata_keys::LEVEL,
            "Level",
            "In-game level is at least",
            MetadataType::IntegerGreaterThanOrEqual,
        ),
    ]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_document_serializes_as_flat_object() {
        let doc = MetadataDocument::new()
            .with_bool("viewprofile", true)
            .with_integer("zzzlevel", 42);
        assert_eq!(
            serde_json::to_value(&doc).unwrap(),
            json!({"viewprofile": "1", "zzzlevel": "42"})
        );
    }

    #[test]
    fn test_full_profile_document() {
        let doc = LinkedProfile {
            profile_visible: false,
            connected: true,
            connected_date: Some("2024-07-04".to_string()),
            level: Some(55),
        }
        .to_document();

        let expected: MetadataDocument = [
            ("viewprofile", "0"),
            ("zzzconnect", "1"),
            ("zzzdate", "2024-07-04"),
            ("zzzlevel", "55"),
        ]
        .into_iter()
        .collect();
        assert_eq!(doc, expected);
    }

    #[test]
    fn test_missing_profile_is_all_zero() {
        let doc = LinkedProfile::default().to_document();
        assert_eq!(doc.len(), 4);
        assert!(doc.iter().all(|(_, v)| v == "0"));
    }

    #[test]
    fn test_role_connection_body() {
        let body = RoleConnection {
            platform_name: Some("MIYABI".to_string()),
            platform_username: None,
            metadata: LinkedProfile::default().to_document(),
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "platform_name": "MIYABI",
                "metadata": {"viewprofile": "0", "zzzconnect": "0", "zzzdate": "0", "zzzlevel": "0"}
            })
        );
    }

    #[test]
    fn test_schema_wire_format() {
        let schema = serde_json::to_value(default_schema()).unwrap();
        assert_eq!(schema[0]["key"], "viewprofile");
        assert_eq!(schema[0]["type"], 7);
        assert_eq!(schema[2]["type"], 6);
        assert_eq!(schema[3]["type"], 2);
    }

    #[test]
    fn test_metadata_type_codes() {
        for code in 1..=8u8 {
            let kind = MetadataType::try_from(code).unwrap();
            assert_eq!(u8::from(kind), code);
        }
        assert!(MetadataType::try_from(0).is_err());
        assert!(MetadataType::try_from(9).is_err());
    }
}
