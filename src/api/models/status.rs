use super::entity::{catalog_entity, require_name, tidy_text};
use super::lookup::Audit;
use crate::storage::RecordKind;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Case status. The lifecycle stages of a status are its conditions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct Status {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub audit: Audit,
}

impl Status {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    fn check(&mut self) -> Result<(), String> {
        require_name(&mut self.name, "Status")?;
        tidy_text(&mut self.description);
        Ok(())
    }
}

catalog_entity!(
    Status,
    kind: RecordKind::Status,
    mutable: ["name", "description"],
    search: ["name", "description"],
);

/// A stage within a status. New cases start in the initial condition; a final
/// condition closes the case.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct StatusCondition {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub initial: bool,
    #[serde(rename = "final")]
    pub is_final: bool,
    pub status_id: i64,
    #[serde(flatten)]
    pub audit: Audit,
}

impl StatusCondition {
    pub fn new(name: impl Into<String>, initial: bool, is_final: bool) -> Self {
        Self {
            name: name.into(),
            initial,
            is_final,
            ..Default::default()
        }
    }

    fn check(&mut self) -> Result<(), String> {
        require_name(&mut self.name, "Status condition")?;
        tidy_text(&mut self.description);
        if self.initial && self.is_final {
            return Err("A status condition cannot be both initial and final".to_string());
        }
        Ok(())
    }
}

catalog_entity!(
    StatusCondition,
    kind: RecordKind::StatusCondition,
    mutable: ["name", "description", "initial", "final"],
    search: ["name", "description"],
    parent: status_id,
);
