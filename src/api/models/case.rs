use super::entity::{Entity, tidy_text};
use super::etag::Etag;
use super::lookup::{Audit, Lookup};
use crate::storage::RecordKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// How a case was closed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct CloseInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub close_result: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub close_reason: Option<Lookup>,
}

/// Customer rating left on a case.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct RateInfo {
    pub rating: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating_comment: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct Case {
    pub id: i64,
    pub ver: i32,
    pub etag: String,
    pub name: String,
    pub subject: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_info: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Lookup>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_condition: Option<Lookup>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub close_reason_group: Option<Lookup>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub close: Option<CloseInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate: Option<RateInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Lookup>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<Lookup>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sla: Option<Lookup>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sla_condition: Option<Lookup>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<Lookup>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<Lookup>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<Lookup>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<Lookup>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reporter: Option<Lookup>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub impacted: Option<Lookup>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub planned_reaction_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub planned_resolve_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub audit: Audit,
}

impl Case {
    /// Reference field names accepted as list filters (`?status=1,2`).
    pub const LOOKUP_FILTERS: &'static [&'static str] =
        &["status", "priority", "source", "assignee", "reporter", "sla"];

    pub fn close_reason(&self) -> Option<&Lookup> {
        self.close.as_ref().and_then(|c| c.close_reason.as_ref())
    }
}

impl Entity for Case {
    const KIND: RecordKind = RecordKind::Case;
    const MUTABLE_FIELDS: &'static [&'static str] = &[
        "subject",
        "description",
        "contact_info",
        "status",
        "status_condition",
        "close_reason_group",
        "close",
        "rate",
        "priority",
        "source",
        "sla",
        "service",
        "group",
        "author",
        "assignee",
        "reporter",
        "impacted",
    ];
    const SEARCH_FIELDS: &'static [&'static str] = &["name", "subject", "description"];

    fn id(&self) -> i64 {
        self.id
    }

    fn assign_identity(&mut self, id: i64, ver: i32) {
        self.id = id;
        self.ver = ver;
        self.etag = Etag::new(Self::KIND, id, ver).encode();
    }

    fn audit_mut(&mut self) -> &mut Audit {
        &mut self.audit
    }

    fn label(&self) -> Option<String> {
        Some(self.name.clone())
    }

    fn sanitize(&mut self) -> Result<(), String> {
        self.subject = self.subject.trim().to_string();
        if self.subject.is_empty() {
            return Err("Case subject is required".to_string());
        }
        tidy_text(&mut self.description);
        tidy_text(&mut self.contact_info);
        if self.source.as_ref().is_none_or(|s| s.id <= 0) {
            return Err("Case source is required".to_string());
        }
        if self.status.as_ref().is_none_or(|s| s.id <= 0) {
            return Err("Case status is required".to_string());
        }
        if let Some(rate) = &self.rate
            && !(0..=5).contains(&rate.rating)
        {
            return Err("Case rating must be between 0 and 5".to_string());
        }
        Ok(())
    }
}
