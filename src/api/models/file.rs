use super::entity::Entity;
use super::lookup::Audit;
use crate::storage::RecordKind;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Metadata of a file attached to a case. Content is held by the file storage service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct CaseFile {
    pub id: i64,
    pub uuid: String,
    pub case_id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime: Option<String>,
    pub size: i64,
    #[serde(flatten)]
    pub audit: Audit,
}

impl Entity for CaseFile {
    const KIND: RecordKind = RecordKind::CaseFile;
    const MUTABLE_FIELDS: &'static [&'static str] = &["uuid", "name", "mime", "size"];
    const SEARCH_FIELDS: &'static [&'static str] = &["name", "mime"];

    fn id(&self) -> i64 {
        self.id
    }

    fn assign_identity(&mut self, id: i64, _ver: i32) {
        self.id = id;
    }

    fn attach_to(&mut self, parent_id: i64) {
        self.case_id = parent_id;
    }

    fn audit_mut(&mut self) -> &mut Audit {
        &mut self.audit
    }

    fn sanitize(&mut self) -> Result<(), String> {
        self.name = self.name.trim().to_string();
        if self.name.is_empty() {
            return Err("File name is required".to_string());
        }
        if self.size < 0 {
            return Err("File size cannot be negative".to_string());
        }
        if self.uuid.trim().is_empty() {
            self.uuid = uuid::Uuid::new_v4().to_string();
        }
        Ok(())
    }
}
