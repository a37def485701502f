use super::entity::Entity;
use super::enums::CommunicationType;
use super::etag::Etag;
use super::lookup::Audit;
use crate::storage::RecordKind;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A call, chat or email linked to a case. The conversation itself lives in
/// the communication service; only its id is kept here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct CaseCommunication {
    pub id: i64,
    pub ver: i32,
    pub etag: String,
    pub case_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub communication_type: Option<CommunicationType>,
    pub communication_id: String,
    #[serde(flatten)]
    pub audit: Audit,
}

impl CaseCommunication {
    pub fn new(communication_type: CommunicationType, communication_id: impl Into<String>) -> Self {
        Self {
            communication_type: Some(communication_type),
            communication_id: communication_id.into(),
            ..Default::default()
        }
    }

    pub fn same_link(&self, other: &CaseCommunication) -> bool {
        self.communication_type == other.communication_type
            && self.communication_id == other.communication_id
    }
}

impl Entity for CaseCommunication {
    const KIND: RecordKind = RecordKind::CaseCommunication;
    const MUTABLE_FIELDS: &'static [&'static str] = &["communication_type", "communication_id"];
    const SEARCH_FIELDS: &'static [&'static str] = &["communication_id"];

    fn id(&self) -> i64 {
        self.id
    }

    fn assign_identity(&mut self, id: i64, ver: i32) {
        self.id = id;
        self.ver = ver;
        self.etag = Etag::new(Self::KIND, id, ver).encode();
    }

    fn attach_to(&mut self, parent_id: i64) {
        self.case_id = parent_id;
    }

    fn audit_mut(&mut self) -> &mut Audit {
        &mut self.audit
    }

    fn sanitize(&mut self) -> Result<(), String> {
        if self.communication_type.is_none() {
            return Err("communication_type is required".to_string());
        }
        self.communication_id = self.communication_id.trim().to_string();
        if self.communication_id.is_empty() {
            return Err("communication_id is required".to_string());
        }
        Ok(())
    }
}
