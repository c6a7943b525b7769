use chrono::{DateTime, Utc};
use rolegate_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Validated resource-type name.
///
/// Names are case-normalized to lowercase so permission rows keyed by type
/// name match regardless of how callers spell the reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceTypeName(String);

impl ResourceTypeName {
    /// Creates a validated, lowercased resource-type name.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let normalized = value.trim().to_lowercase();

        if normalized.is_empty() {
            return Err(AppError::Validation(
                "resource type name must not be empty or whitespace".to_owned(),
            ));
        }

        Ok(Self(normalized))
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<ResourceTypeName> for String {
    fn from(value: ResourceTypeName) -> Self {
        value.0
    }
}

impl std::fmt::Display for ResourceTypeName {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// A category of protected object against which permissions are evaluated.
///
/// Deletion is soft: `is_active` flips to false and existing grant rows are
/// left untouched, but inactive types stop counting for permission checks and
/// for default-grant provisioning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceType {
    /// Unique, lowercased type name.
    pub name: ResourceTypeName,
    /// Human-readable description.
    pub description: String,
    /// Soft-delete flag.
    pub is_active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}
