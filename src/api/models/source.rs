use super::entity::{catalog_entity, require_name, tidy_text};
use super::enums::SourceType;
use super::lookup::Audit;
use crate::storage::RecordKind;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Channel a case came in through.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct Source {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub source_type: Option<SourceType>,
    #[serde(flatten)]
    pub audit: Audit,
}

impl Source {
    pub fn new(name: impl Into<String>, source_type: SourceType) -> Self {
        Self {
            name: name.into(),
            source_type: Some(source_type),
            ..Default::default()
        }
    }

    fn check(&mut self) -> Result<(), String> {
        require_name(&mut self.name, "Source")?;
        tidy_text(&mut self.description);
        if self.source_type.is_none() {
            return Err("Source type is required".to_string());
        }
        Ok(())
    }
}

catalog_entity!(
    Source,
    kind: RecordKind::Source,
    mutable: ["name", "description", "type"],
    search: ["name", "description"],
);
