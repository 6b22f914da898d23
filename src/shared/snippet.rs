//! Snippet Data Structures
//!
//! A snippet is a stored code fragment owned by one user. It can live in a
//! folder, be marked favorite, be shared to groups, and be soft-deleted into
//! the archive (`deleted_at` set) before being removed for good.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// A stored code snippet
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Snippet {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub folder_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub code: String,
    /// Canonical lower-case language name
    pub language: String,
    pub tags: Vec<String>,
    pub is_favorite: bool,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Set while the snippet sits in the archive
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Snippet {
    /// Whether the snippet has been soft-deleted
    pub fn is_archived(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Request body for creating a snippet
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CreateSnippetRequest {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub code: String,
    /// Defaults to `plaintext`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<Uuid>,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default)]
    pub is_public: bool,
}

/// Partial update; absent fields are left untouched
///
/// `description` and `folder_id` distinguish "absent" (`None`) from an
/// explicit JSON `null` (`Some(None)`), which clears the value.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateSnippetRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub folder_id: Option<Option<Uuid>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
}

/// Deserialize a present-but-null field as `Some(None)`
pub fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Sort order for snippet listings
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SnippetSort {
    /// Most recently updated first
    #[default]
    Updated,
    /// Most recently created first
    Created,
    /// Alphabetical by title
    Title,
}

/// Filters for listing snippets
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct SnippetQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favorite: Option<bool>,
    /// Case-insensitive substring match on title, description and code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<SnippetSort>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
}

/// Response for snippet listings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ListSnippetsResponse {
    pub snippets: Vec<Snippet>,
    /// Number of snippets matching the filters, ignoring pagination
    pub total: i64,
    pub has_more: bool,
}

/// Per-user dashboard counters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct SnippetStats {
    pub total: i64,
    pub favorites: i64,
    pub archived: i64,
    pub folders: i64,
    pub by_language: BTreeMap<String, i64>,
}
