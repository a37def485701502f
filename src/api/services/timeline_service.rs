//! Case timeline: linked communications grouped by UTC day.

use super::communication_service::CommunicationService;
use super::error::{ServiceError, ServiceResult};
use super::field_mask::parse_list;
use super::query::PageLimits;
use crate::models::{CommunicationType, DayTimeline, EventTypeCounter, Page, TimelineEvent};
use crate::storage::StorageBackend;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use utoipa::IntoParams;

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TimelineParams {
    /// Page number, starting at 1
    pub page: Option<u32>,
    /// Days per page
    pub size: Option<u32>,
    /// Comma-separated event types (CALL, CHAT, EMAIL)
    #[serde(rename = "type")]
    pub event_type: Option<String>,
}

impl TimelineParams {
    fn event_types(&self) -> ServiceResult<Vec<CommunicationType>> {
        parse_list(self.event_type.as_deref())
            .iter()
            .map(|t| {
                CommunicationType::parse(t)
                    .ok_or_else(|| ServiceError::validation(format!("Unknown event type '{}'", t)))
            })
            .collect()
    }
}

pub struct TimelineService {
    communications: CommunicationService,
    limits: PageLimits,
}

impl TimelineService {
    pub fn new(storage: Arc<dyn StorageBackend>, limits: PageLimits) -> Self {
        Self {
            communications: CommunicationService::new(storage),
            limits,
        }
    }

    async fn events(&self, case_id: i64) -> ServiceResult<Vec<TimelineEvent>> {
        Ok(self
            .communications
            .all(case_id)
            .await?
            .into_iter()
            .filter_map(|link| {
                Some(TimelineEvent {
                    event_type: link.communication_type?,
                    created_at: link.audit.created_at.unwrap_or_default(),
                    created_by: link.audit.created_by,
                    communication_id: link.communication_id,
                    etag: link.etag,
                })
            })
            .collect())
    }

    /// Days with events, newest first.
    pub async fn timeline(
        &self,
        case_id: i64,
        params: &TimelineParams,
    ) -> ServiceResult<Page<DayTimeline>> {
        let types = params.event_types()?;
        let mut days: BTreeMap<NaiveDate, Vec<TimelineEvent>> = BTreeMap::new();
        for event in self.events(case_id).await? {
            if types.is_empty() || types.contains(&event.event_type) {
                days.entry(event.created_at.date_naive())
                    .or_default()
                    .push(event);
            }
        }

        let page = params.page.unwrap_or(1).max(1);
        let size = match params.size {
            None | Some(0) => self.limits.default_size,
            Some(s) => s.min(self.limits.max_size),
        } as usize;
        let skip = (page as usize - 1).saturating_mul(size);
        let next = days.len() > skip.saturating_add(size);

        let items = days
            .into_iter()
            .rev()
            .skip(skip)
            .take(size)
            .map(|(day, events)| day_timeline(day, events))
            .collect();
        Ok(Page { page, next, items })
    }

    /// Per-type event counts with the span they cover.
    pub async fn counter(&self, case_id: i64) -> ServiceResult<Vec<EventTypeCounter>> {
        let events = self.events(case_id).await?;
        Ok(CommunicationType::ALL
            .into_iter()
            .filter_map(|event_type| {
                let times: Vec<DateTime<Utc>> = events
                    .iter()
                    .filter(|e| e.event_type == event_type)
                    .map(|e| e.created_at)
                    .collect();
                Some(EventTypeCounter {
                    event_type,
                    count: times.len() as u64,
                    date_from: *times.iter().min()?,
                    date_to: *times.iter().max()?,
                })
            })
            .collect())
    }
}

fn day_timeline(day: NaiveDate, mut events: Vec<TimelineEvent>) -> DayTimeline {
    events.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    let count = |t: CommunicationType| events.iter().filter(|e| e.event_type == t).count() as u64;
    DayTimeline {
        day_timestamp: day
            .and_hms_opt(0, 0, 0)
            .map(|d| d.and_utc().timestamp_millis())
            .unwrap_or_default(),
        calls_count: count(CommunicationType::Call),
        chats_count: count(CommunicationType::Chat),
        emails_count: count(CommunicationType::Email),
        items: events,
    }
}
