use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SourceType {
    Call,
    Chat,
    SocialMedia,
    Email,
    Api,
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommunicationType {
    Call,
    Chat,
    Email,
}

impl CommunicationType {
    pub const ALL: [CommunicationType; 3] = [
        CommunicationType::Call,
        CommunicationType::Chat,
        CommunicationType::Email,
    ];

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "CALL" => Some(CommunicationType::Call),
            "CHAT" => Some(CommunicationType::Chat),
            "EMAIL" => Some(CommunicationType::Email),
            _ => None,
        }
    }
}

/// How a related case relates to the primary case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationType {
    Duplicates,
    IsDuplicatedBy,
    Blocks,
    IsBlockedBy,
    Causes,
    IsCausedBy,
    IsChildOf,
    IsParentOf,
    RelatesTo,
}

impl RelationType {
    /// The same relation seen from the other case.
    pub fn inverse(self) -> Self {
        match self {
            RelationType::Duplicates => RelationType::IsDuplicatedBy,
            RelationType::IsDuplicatedBy => RelationType::Duplicates,
            RelationType::Blocks => RelationType::IsBlockedBy,
            RelationType::IsBlockedBy => RelationType::Blocks,
            RelationType::Causes => RelationType::IsCausedBy,
            RelationType::IsCausedBy => RelationType::Causes,
            RelationType::IsChildOf => RelationType::IsParentOf,
            RelationType::IsParentOf => RelationType::IsChildOf,
            RelationType::RelatesTo => RelationType::RelatesTo,
        }
    }
}
