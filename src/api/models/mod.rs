// Models module - case records, catalogs and the shared reference types

pub mod case;
pub mod close_reason;
pub mod comment;
pub mod communication;
pub mod entity;
pub mod enums;
pub mod etag;
pub mod file;
pub mod lookup;
pub mod paging;
pub mod priority;
pub mod related_case;
pub mod sla;
pub mod source;
pub mod status;
pub mod timeline;

pub use case::{Case, CloseInfo, RateInfo};
pub use close_reason::{CloseReason, CloseReasonGroup};
pub use comment::CaseComment;
pub use communication::CaseCommunication;
pub use entity::Entity;
pub use enums::{CommunicationType, RelationType, SourceType};
pub use etag::{Etag, EtagError, RecordRef};
pub use file::CaseFile;
pub use lookup::{Audit, Lookup};
pub use paging::Page;
pub use priority::Priority;
pub use related_case::RelatedCase;
pub use sla::{Sla, SlaCondition};
pub use source::Source;
pub use status::{Status, StatusCondition};
pub use timeline::{DayTimeline, EventTypeCounter, TimelineEvent};
