//! Wire types for items published to the remote search index.
//!
//! An [`ExternalItem`] serializes to the JSON body the index API expects for
//! its replace-by-id operation: `{id, properties, content, acl}`.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ExternalItem
// ---------------------------------------------------------------------------

/// One publishable record, addressed by `id` within a connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalItem {
    /// Stable identifier derived from the source document's relative path.
    pub id: String,
    /// Searchable/retrievable properties declared by the connection schema.
    pub properties: ItemProperties,
    /// Plain-text content payload.
    pub content: ItemContent,
    /// Access grants controlling search visibility.
    pub acl: Vec<AclEntry>,
}

/// The property bag declared by the connection schema. `title` and
/// `description` are always present (empty string when the source document
/// omits them) — the remote schema requires both fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemProperties {
    pub title: String,
    pub description: String,
    pub url: String,
    pub icon_url: String,
}

/// Content payload. The type is fixed to plain text; no HTML or markdown is
/// ever published.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemContent {
    pub value: String,
    #[serde(rename = "type")]
    pub content_type: ContentType,
}

impl ItemContent {
    /// Wrap already-stripped plain text.
    pub fn text(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            content_type: ContentType::Text,
        }
    }
}

/// Content encoding accepted by the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Text,
}

// ---------------------------------------------------------------------------
// ACL
// ---------------------------------------------------------------------------

/// A single access grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AclEntry {
    pub access_type: AccessType,
    #[serde(rename = "type")]
    pub principal_type: PrincipalType,
    /// Principal identifier (`"everyone"`, a user id, or a group id).
    pub value: String,
}

impl AclEntry {
    /// The default grant: visible to everyone.
    pub fn everyone() -> Self {
        Self {
            access_type: AccessType::Grant,
            principal_type: PrincipalType::Everyone,
            value: "everyone".into(),
        }
    }

    /// Grant visibility to a single user principal.
    pub fn user(id: impl Into<String>) -> Self {
        Self {
            access_type: AccessType::Grant,
            principal_type: PrincipalType::User,
            value: id.into(),
        }
    }

    /// Grant visibility to a group principal.
    pub fn group(id: impl Into<String>) -> Self {
        Self {
            access_type: AccessType::Grant,
            principal_type: PrincipalType::Group,
            value: id.into(),
        }
    }
}

/// Grant is the only access type this pipeline emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessType {
    Grant,
}

/// Principal kinds recognized by the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrincipalType {
    Everyone,
    User,
    Group,
}
