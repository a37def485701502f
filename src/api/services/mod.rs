//! Services module - business rules for cases and their catalogs.

pub mod case_service;
pub mod catalog_service;
pub mod comment_service;
pub mod communication_service;
pub mod error;
pub mod field_mask;
pub mod file_service;
pub mod jwt_service;
pub mod query;
pub mod related_case_service;
pub mod timeline_service;

// Re-export for convenience
pub use case_service::{CASE_EMBEDS, CaseSearchParams, CaseService};
pub use catalog_service::{CatalogRules, CatalogService};
pub use comment_service::CommentService;
pub use communication_service::CommunicationService;
pub use error::{ServiceError, ServiceResult};
pub use field_mask::UpdateMode;
pub use file_service::FileService;
pub use jwt_service::{Claims, JwtService, SharedJwtService};
pub use query::{ListParams, ListQuery, PageLimits};
pub use related_case_service::RelatedCaseService;
pub use timeline_service::{TimelineParams, TimelineService};
