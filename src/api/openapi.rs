//! OpenAPI specification definition.
//!
//! Aggregates the case route handlers and schemas for OpenAPI documentation generation.

use utoipa::{Modify, OpenApi};
#[derive(OpenApi)]
#[openapi(
    paths(
        // Cases
        crate::routes::cases::search_cases,
        crate::routes::cases::locate_case,
        crate::routes::cases::create_case,
        crate::routes::cases::update_case,
        crate::routes::cases::patch_case,
        crate::routes::cases::delete_case,
        // Related cases
        crate::routes::related_cases::list_related_cases,
        crate::routes::related_cases::merge_related_cases,
        crate::routes::related_cases::reset_related_cases,
        crate::routes::related_cases::locate_related_case,
        crate::routes::related_cases::update_related_case,
        crate::routes::related_cases::patch_related_case,
        crate::routes::related_cases::delete_related_case,
        // Comments
        crate::routes::comments::list_comments,
        crate::routes::comments::publish_comments,
        crate::routes::comments::locate_comment,
        crate::routes::comments::update_comment,
        crate::routes::comments::patch_comment,
        crate::routes::comments::delete_comment,
        // Communications
        crate::routes::communications::list_communications,
        crate::routes::communications::link_communications,
        crate::routes::communications::unlink_communication,
        // Files
        crate::routes::files::list_files,
        crate::routes::files::attach_file,
        crate::routes::files::delete_file,
        // Timeline
        crate::routes::timeline::get_timeline,
        crate::routes::timeline::get_timeline_counter,
        // Catalogs
        crate::routes::catalogs::priorities::list,
        crate::routes::catalogs::priorities::create,
        crate::routes::catalogs::priorities::locate,
        crate::routes::catalogs::priorities::update,
        crate::routes::catalogs::priorities::patch,
        crate::routes::catalogs::priorities::delete,
        crate::routes::catalogs::sources::list,
        crate::routes::catalogs::sources::create,
        crate::routes::catalogs::sources::locate,
        crate::routes::catalogs::sources::update,
        crate::routes::catalogs::sources::patch,
        crate::routes::catalogs::sources::delete,
        crate::routes::catalogs::statuses::list,
        crate::routes::catalogs::statuses::create,
        crate::routes::catalogs::statuses::locate,
        crate::routes::catalogs::statuses::update,
        crate::routes::catalogs::statuses::patch,
        crate::routes::catalogs::statuses::delete,
        crate::routes::catalogs::status_conditions::list,
        crate::routes::catalogs::status_conditions::create,
        crate::routes::catalogs::status_conditions::locate,
        crate::routes::catalogs::status_conditions::update,
        crate::routes::catalogs::status_conditions::patch,
        crate::routes::catalogs::status_conditions::delete,
        crate::routes::catalogs::close_reason_groups::list,
        crate::routes::catalogs::close_reason_groups::create,
        crate::routes::catalogs::close_reason_groups::locate,
        crate::routes::catalogs::close_reason_groups::update,
        crate::routes::catalogs::close_reason_groups::patch,
        crate::routes::catalogs::close_reason_groups::delete,
        crate::routes::catalogs::close_reasons::list,
        crate::routes::catalogs::close_reasons::create,
        crate::routes::catalogs::close_reasons::locate,
        crate::routes::catalogs::close_reasons::update,
        crate::routes::catalogs::close_reasons::patch,
        crate::routes::catalogs::close_reasons::delete,
        crate::routes::catalogs::slas::list,
        crate::routes::catalogs::slas::create,
        crate::routes::catalogs::slas::locate,
        crate::routes::catalogs::slas::update,
        crate::routes::catalogs::slas::patch,
        crate::routes::catalogs::slas::delete,
        crate::routes::catalogs::sla_conditions::list,
        crate::routes::catalogs::sla_conditions::create,
        crate::routes::catalogs::sla_conditions::locate,
        crate::routes::catalogs::sla_conditions::update,
        crate::routes::catalogs::sla_conditions::patch,
        crate::routes::catalogs::sla_conditions::delete,
        // OpenAPI
        crate::routes::openapi::serve_openapi_json,
    ),
    components(schemas(
        crate::models::Lookup,
        crate::models::Audit,
        crate::models::Case,
        crate::models::CloseInfo,
        crate::models::RateInfo,
        crate::models::RelatedCase,
        crate::models::RelationType,
        crate::models::CaseComment,
        crate::models::CaseCommunication,
        crate::models::CommunicationType,
        crate::models::CaseFile,
        crate::models::DayTimeline,
        crate::models::TimelineEvent,
        crate::models::EventTypeCounter,
        // Catalogs
        crate::models::Priority,
        crate::models::Source,
        crate::models::SourceType,
        crate::models::Status,
        crate::models::StatusCondition,
        crate::models::CloseReasonGroup,
        crate::models::CloseReason,
        crate::models::Sla,
        crate::models::SlaCondition,
        crate::routes::communications::UnlinkResponse,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "Cases", description = "Case search and CRUD"),
        (name = "Related cases", description = "Relations between cases"),
        (name = "Comments", description = "Case comments"),
        (name = "Communications", description = "Calls, chats and emails linked to cases"),
        (name = "Files", description = "Case file metadata"),
        (name = "Timeline", description = "Case activity by day"),
        (name = "Priorities", description = "Case priority catalog"),
        (name = "Sources", description = "Case source catalog"),
        (name = "Statuses", description = "Case statuses and their conditions"),
        (name = "Close reasons", description = "Close reason groups and their reasons"),
        (name = "SLAs", description = "Service level agreements and their conditions"),
        (name = "OpenAPI", description = "OpenAPI specification"),
    ),
    info(
        title = "Cases API",
        description = "Customer-support cases, their comments, communications, files and catalogs",
        version = "1.0.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8081", description = "Local development server")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        // Update version to match Cargo.toml version
        openapi.info.version = env!("CARGO_PKG_VERSION").to_string();

        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::new);
        use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
