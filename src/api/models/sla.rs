use super::entity::{catalog_entity, check_times, require_name, tidy_text};
use super::lookup::{Audit, Lookup};
use crate::storage::RecordKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use utoipa::ToSchema;

/// Service level agreement. Times are in minutes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct Sla {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_from: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_to: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calendar: Option<Lookup>,
    pub reaction_time: i64,
    pub resolution_time: i64,
    #[serde(flatten)]
    pub audit: Audit,
}

impl Sla {
    pub fn new(name: impl Into<String>, reaction_time: i64, resolution_time: i64) -> Self {
        Self {
            name: name.into(),
            reaction_time,
            resolution_time,
            ..Default::default()
        }
    }

    fn check(&mut self) -> Result<(), String> {
        require_name(&mut self.name, "SLA")?;
        tidy_text(&mut self.description);
        check_times(self.reaction_time, self.resolution_time)?;
        if let (Some(from), Some(to)) = (self.valid_from, self.valid_to)
            && to <= from
        {
            return Err("valid_to must be after valid_from".to_string());
        }
        Ok(())
    }
}

catalog_entity!(
    Sla,
    kind: RecordKind::Sla,
    mutable: [
        "name",
        "description",
        "valid_from",
        "valid_to",
        "calendar",
        "reaction_time",
        "resolution_time",
    ],
    search: ["name", "description"],
);

/// Priority-specific override of an SLA's times.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct SlaCondition {
    pub id: i64,
    pub name: String,
    pub priorities: Vec<Lookup>,
    pub reaction_time: i64,
    pub resolution_time: i64,
    pub sla_id: i64,
    #[serde(flatten)]
    pub audit: Audit,
}

impl SlaCondition {
    pub fn new(
        name: impl Into<String>,
        priorities: Vec<Lookup>,
        reaction_time: i64,
        resolution_time: i64,
    ) -> Self {
        Self {
            name: name.into(),
            priorities,
            reaction_time,
            resolution_time,
            ..Default::default()
        }
    }

    pub fn covers(&self, priority_id: i64) -> bool {
        self.priorities.iter().any(|p| p.id == priority_id)
    }

    fn check(&mut self) -> Result<(), String> {
        require_name(&mut self.name, "SLA condition")?;
        check_times(self.reaction_time, self.resolution_time)?;
        let mut seen = HashSet::new();
        for p in &self.priorities {
            if p.id <= 0 {
                return Err("SLA condition priorities must reference a priority id".to_string());
            }
            if !seen.insert(p.id) {
                return Err(format!("Priority {} is listed twice", p.id));
            }
        }
        Ok(())
    }
}

catalog_entity!(
    SlaCondition,
    kind: RecordKind::SlaCondition,
    mutable: ["name", "priorities", "reaction_time", "resolution_time"],
    search: ["name"],
    parent: sla_id,
);
