use crate::storage::UserContext;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Reference to another record or to an external actor (user, group, calendar, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Lookup {
    #[serde(default)]
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Lookup {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: Some(name.into()),
        }
    }

    /// Reference by id only.
    pub fn id(id: i64) -> Self {
        Self { id, name: None }
    }
}

/// Server-owned audit fields, flattened into every record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct Audit {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<Lookup>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<Lookup>,
}

impl Audit {
    pub fn stamp_created(&mut self, user: &UserContext, at: DateTime<Utc>) {
        self.created_at = Some(at);
        self.created_by = Some(user.lookup());
        self.updated_at = Some(at);
        self.updated_by = Some(user.lookup());
    }

    pub fn stamp_updated(&mut self, user: &UserContext, at: DateTime<Utc>) {
        self.updated_at = Some(at);
        self.updated_by = Some(user.lookup());
    }
}
