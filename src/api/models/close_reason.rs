use super::entity::{catalog_entity, require_name, tidy_text};
use super::lookup::Audit;
use crate::storage::RecordKind;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A named set of close reasons a case can be resolved with.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct CloseReasonGroup {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub audit: Audit,
}

impl CloseReasonGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    fn check(&mut self) -> Result<(), String> {
        require_name(&mut self.name, "Close reason group")?;
        tidy_text(&mut self.description);
        Ok(())
    }
}

catalog_entity!(
    CloseReasonGroup,
    kind: RecordKind::CloseReasonGroup,
    mutable: ["name", "description"],
    search: ["name", "description"],
);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct CloseReason {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub close_reason_group_id: i64,
    #[serde(flatten)]
    pub audit: Audit,
}

impl CloseReason {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    fn check(&mut self) -> Result<(), String> {
        require_name(&mut self.name, "Close reason")?;
        tidy_text(&mut self.description);
        Ok(())
    }
}

catalog_entity!(
    CloseReason,
    kind: RecordKind::CloseReason,
    mutable: ["name", "description"],
    search: ["name", "description"],
    parent: close_reason_group_id,
);
