use super::entity::Entity;
use super::enums::RelationType;
use super::etag::Etag;
use super::lookup::{Audit, Lookup};
use crate::storage::RecordKind;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A link between two cases, stored under the primary case.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct RelatedCase {
    pub id: i64,
    pub ver: i32,
    pub etag: String,
    pub primary_case: Lookup,
    pub related_case: Lookup,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relation_type: Option<RelationType>,
    #[serde(flatten)]
    pub audit: Audit,
}

impl RelatedCase {
    pub fn new(related_case: i64, relation_type: RelationType) -> Self {
        Self {
            related_case: Lookup::id(related_case),
            relation_type: Some(relation_type),
            ..Default::default()
        }
    }

    /// The relation as seen from the related case.
    pub fn inverted(&self) -> Self {
        Self {
            primary_case: self.related_case.clone(),
            related_case: self.primary_case.clone(),
            relation_type: self.relation_type.map(RelationType::inverse),
            ..self.clone()
        }
    }

    /// Whether this relation joins the two cases, in either direction.
    pub fn joins(&self, a: i64, b: i64) -> bool {
        (self.primary_case.id == a && self.related_case.id == b)
            || (self.primary_case.id == b && self.related_case.id == a)
    }
}

impl Entity for RelatedCase {
    const KIND: RecordKind = RecordKind::RelatedCase;
    const MUTABLE_FIELDS: &'static [&'static str] = &["related_case", "relation_type"];
    const SEARCH_FIELDS: &'static [&'static str] = &["related_case.name", "primary_case.name"];

    fn id(&self) -> i64 {
        self.id
    }

    fn assign_identity(&mut self, id: i64, ver: i32) {
        self.id = id;
        self.ver = ver;
        self.etag = Etag::new(Self::KIND, id, ver).encode();
    }

    fn attach_to(&mut self, parent_id: i64) {
        self.primary_case = Lookup::id(parent_id);
    }

    fn audit_mut(&mut self) -> &mut Audit {
        &mut self.audit
    }

    fn sanitize(&mut self) -> Result<(), String> {
        if self.related_case.id <= 0 {
            return Err("related_case is required".to_string());
        }
        if self.relation_type.is_none() {
            return Err("relation_type is required".to_string());
        }
        if self.primary_case.id == self.related_case.id {
            return Err("A case cannot be related to itself".to_string());
        }
        Ok(())
    }
}
