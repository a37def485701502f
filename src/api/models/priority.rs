use super::entity::{catalog_entity, check_color, require_name, tidy_text};
use super::lookup::Audit;
use crate::storage::RecordKind;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Case priority, shown with its color in case lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct Priority {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(flatten)]
    pub audit: Audit,
}

impl Priority {
    pub fn new(name: impl Into<String>, color: Option<&str>) -> Self {
        Self {
            name: name.into(),
            color: color.map(str::to_string),
            ..Default::default()
        }
    }

    fn check(&mut self) -> Result<(), String> {
        require_name(&mut self.name, "Priority")?;
        tidy_text(&mut self.description);
        tidy_text(&mut self.color);
        check_color(self.color.as_deref())
    }
}

catalog_entity!(
    Priority,
    kind: RecordKind::Priority,
    mutable: ["name", "description", "color"],
    search: ["name", "description"],
);
