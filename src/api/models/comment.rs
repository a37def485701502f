use super::entity::Entity;
use super::etag::Etag;
use super::lookup::{Audit, Lookup};
use crate::storage::RecordKind;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct CaseComment {
    pub id: i64,
    pub ver: i32,
    pub etag: String,
    pub case_id: i64,
    pub text: String,
    pub edited: bool,
    /// Computed per caller on read; never stored as meaningful state.
    pub can_edit: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<Lookup>,
    #[serde(flatten)]
    pub audit: Audit,
}

impl CaseComment {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn is_authored_by(&self, user_id: i64) -> bool {
        self.author.as_ref().is_some_and(|a| a.id == user_id)
    }
}

impl Entity for CaseComment {
    const KIND: RecordKind = RecordKind::CaseComment;
    const MUTABLE_FIELDS: &'static [&'static str] = &["text"];
    const SEARCH_FIELDS: &'static [&'static str] = &["text"];

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
        if self.text.trim().is_empty() {
            return Err("Comment text is required".to_string());
        }
        Ok(())
    }
}
