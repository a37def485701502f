use super::enums::CommunicationType;
use super::lookup::Lookup;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TimelineEvent {
    #[serde(rename = "type")]
    pub event_type: CommunicationType,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<Lookup>,
    pub communication_id: String,
    pub etag: String,
}

/// Events of one UTC day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DayTimeline {
    /// Start of the day, milliseconds since the epoch.
    pub day_timestamp: i64,
    pub calls_count: u64,
    pub chats_count: u64,
    pub emails_count: u64,
    pub items: Vec<TimelineEvent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EventTypeCounter {
    pub event_type: CommunicationType,
    pub count: u64,
    pub date_from: DateTime<Utc>,
    pub date_to: DateTime<Utc>,
}
