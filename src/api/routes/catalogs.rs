//! Catalog routes: priorities, sources, statuses, close reasons and SLAs.
//!
//! Every catalog exposes the same five operations, so the handlers are
//! generic over the record type. Each catalog gets a module of thin,
//! documented handlers that delegate to them. Child catalogs (status
//! conditions, close reasons, SLA conditions) take their parent id as the
//! first path segment; a parent's item segment must carry the same name.

use axum::{Router, extract::State, response::Json, routing::get};
use serde_json::Value;
use tracing::info;

use super::app_state::AppState;
use super::auth_context::AuthContext;
use super::cases::PatchParams;
use super::error::ApiResult;
use super::extract::{ApiJson, ApiPath, ApiQuery};
use crate::models::{
    CloseReason, CloseReasonGroup, Entity, Page, Priority, Sla, SlaCondition, Source, Status,
    StatusCondition,
};
use crate::services::{CatalogRules, ListParams, ListQuery, UpdateMode};

/// Documented endpoints of a top-level catalog.
macro_rules! catalog_endpoints {
    (
        $module:ident, $ty:ident,
        name: $name:tt,
        tag: $tag:tt,
        collection: $collection:tt,
        item: $item:tt,
        id: $id:tt $(,)?
    ) => {
        pub mod $module {
            use super::*;

            pub fn router() -> Router<AppState> {
                Router::new()
                    .route($collection, get(list).post(create))
                    .route(
                        $item,
                        get(locate).put(update).patch(patch).delete(delete),
                    )
            }

            #[utoipa::path(
                get,
                path = $collection,
                operation_id = concat!("list_", $name),
                tag = $tag,
                params(ListParams),
                responses((status = 200, description = "Page of records", body = Object)),
                security(("bearer_auth" = []))
            )]
            pub async fn list(
                state: State<AppState>,
                auth: AuthContext,
                params: ApiQuery<ListParams>,
            ) -> ApiResult<Json<Page<Value>>> {
                list_records::<$ty>(state, auth, params).await
            }

            #[utoipa::path(
                post,
                path = $collection,
                operation_id = concat!("create_", $name),
                tag = $tag,
                request_body = $ty,
                responses(
                    (status = 200, description = "Created record", body = $ty),
                    (status = 400, description = "Invalid input")
                ),
                security(("bearer_auth" = []))
            )]
            pub async fn create(
                state: State<AppState>,
                auth: AuthContext,
                body: ApiJson<Value>,
            ) -> ApiResult<Json<$ty>> {
                create_record::<$ty>(state, auth, body).await
            }

            #[utoipa::path(
                get,
                path = $item,
                operation_id = concat!("locate_", $name),
                tag = $tag,
                params(($id = i64, Path, description = "Record id")),
                responses(
                    (status = 200, description = "The record", body = $ty),
                    (status = 404, description = "Record not found")
                ),
                security(("bearer_auth" = []))
            )]
            pub async fn locate(
                state: State<AppState>,
                auth: AuthContext,
                id: ApiPath<i64>,
            ) -> ApiResult<Json<$ty>> {
                locate_record::<$ty>(state, auth, id).await
            }

            #[utoipa::path(
                put,
                path = $item,
                operation_id = concat!("update_", $name),
                tag = $tag,
                params(($id = i64, Path, description = "Record id")),
                request_body = $ty,
                responses(
                    (status = 200, description = "Updated record", body = $ty),
                    (status = 404, description = "Record not found")
                ),
                security(("bearer_auth" = []))
            )]
            pub async fn update(
                state: State<AppState>,
                auth: AuthContext,
                id: ApiPath<i64>,
                body: ApiJson<Value>,
            ) -> ApiResult<Json<$ty>> {
                update_record::<$ty>(state, auth, id, body).await
            }

            #[utoipa::path(
                patch,
                path = $item,
                operation_id = concat!("patch_", $name),
                tag = $tag,
                params(($id = i64, Path, description = "Record id"), PatchParams),
                request_body = $ty,
                responses(
                    (status = 200, description = "Updated record", body = $ty),
                    (status = 404, description = "Record not found")
                ),
                security(("bearer_auth" = []))
            )]
            pub async fn patch(
                state: State<AppState>,
                auth: AuthContext,
                id: ApiPath<i64>,
                params: ApiQuery<PatchParams>,
                body: ApiJson<Value>,
            ) -> ApiResult<Json<$ty>> {
                patch_record::<$ty>(state, auth, id, params, body).await
            }

            #[utoipa::path(
                delete,
                path = $item,
                operation_id = concat!("delete_", $name),
                tag = $tag,
                params(($id = i64, Path, description = "Record id")),
                responses(
                    (status = 200, description = "Deleted record", body = $ty),
                    (status = 404, description = "Record not found")
                ),
                security(("bearer_auth" = []))
            )]
            pub async fn delete(
                state: State<AppState>,
                auth: AuthContext,
                id: ApiPath<i64>,
            ) -> ApiResult<Json<$ty>> {
                delete_record::<$ty>(state, auth, id).await
            }
        }
    };
}

/// Documented endpoints of a catalog nested under a parent record.
macro_rules! child_catalog_endpoints {
    (
        $module:ident, $ty:ident,
        name: $name:tt,
        tag: $tag:tt,
        collection: $collection:tt,
        item: $item:tt,
        parent: $parent:tt $(,)?
    ) => {
        pub mod $module {
            use super::*;

            pub fn router() -> Router<AppState> {
                Router::new()
                    .route($collection, get(list).post(create))
                    .route(
                        $item,
                        get(locate).put(update).patch(patch).delete(delete),
                    )
            }

            #[utoipa::path(
                get,
                path = $collection,
                operation_id = concat!("list_", $name),
                tag = $tag,
                params(($parent = i64, Path, description = "Parent id"), ListParams),
                responses(
                    (status = 200, description = "Page of records", body = Object),
                    (status = 404, description = "Parent not found")
                ),
                security(("bearer_auth" = []))
            )]
            pub async fn list(
                state: State<AppState>,
                auth: AuthContext,
                parent: ApiPath<i64>,
                params: ApiQuery<ListParams>,
            ) -> ApiResult<Json<Page<Value>>> {
                list_children::<$ty>(state, auth, parent, params).await
            }

            #[utoipa::path(
                post,
                path = $collection,
                operation_id = concat!("create_", $name),
                tag = $tag,
                params(($parent = i64, Path, description = "Parent id")),
                request_body = $ty,
                responses(
                    (status = 200, description = "Created record", body = $ty),
                    (status = 400, description = "Invalid input"),
                    (status = 404, description = "Parent not found")
                ),
                security(("bearer_auth" = []))
            )]
            pub async fn create(
                state: State<AppState>,
                auth: AuthContext,
                parent: ApiPath<i64>,
                body: ApiJson<Value>,
            ) -> ApiResult<Json<$ty>> {
                create_child::<$ty>(state, auth, parent, body).await
            }

            #[utoipa::path(
                get,
                path = $item,
                operation_id = concat!("locate_", $name),
                tag = $tag,
                params(
                    ($parent = i64, Path, description = "Parent id"),
                    ("id" = i64, Path, description = "Record id")
                ),
                responses(
                    (status = 200, description = "The record", body = $ty),
                    (status = 404, description = "Record not found")
                ),
                security(("bearer_auth" = []))
            )]
            pub async fn locate(
                state: State<AppState>,
                auth: AuthContext,
                ids: ApiPath<(i64, i64)>,
            ) -> ApiResult<Json<$ty>> {
                locate_child::<$ty>(state, auth, ids).await
            }

            #[utoipa::path(
                put,
                path = $item,
                operation_id = concat!("update_", $name),
                tag = $tag,
                params(
                    ($parent = i64, Path, description = "Parent id"),
                    ("id" = i64, Path, description = "Record id")
                ),
                request_body = $ty,
                responses(
                    (status = 200, description = "Updated record", body = $ty),
                    (status = 404, description = "Record not found")
                ),
                security(("bearer_auth" = []))
            )]
            pub async fn update(
                state: State<AppState>,
                auth: AuthContext,
                ids: ApiPath<(i64, i64)>,
                body: ApiJson<Value>,
            ) -> ApiResult<Json<$ty>> {
                update_child::<$ty>(state, auth, ids, body).await
            }

            #[utoipa::path(
                patch,
                path = $item,
                operation_id = concat!("patch_", $name),
                tag = $tag,
                params(
                    ($parent = i64, Path, description = "Parent id"),
                    ("id" = i64, Path, description = "Record id"),
                    PatchParams
                ),
                request_body = $ty,
                responses(
                    (status = 200, description = "Updated record", body = $ty),
                    (status = 404, description = "Record not found")
                ),
                security(("bearer_auth" = []))
            )]
            pub async fn patch(
                state: State<AppState>,
                auth: AuthContext,
                ids: ApiPath<(i64, i64)>,
                params: ApiQuery<PatchParams>,
                body: ApiJson<Value>,
            ) -> ApiResult<Json<$ty>> {
                patch_child::<$ty>(state, auth, ids, params, body).await
            }

            #[utoipa::path(
                delete,
                path = $item,
                operation_id = concat!("delete_", $name),
                tag = $tag,
                params(
                    ($parent = i64, Path, description = "Parent id"),
                    ("id" = i64, Path, description = "Record id")
                ),
                responses(
                    (status = 200, description = "Deleted record", body = $ty),
                    (status = 404, description = "Record not found")
                ),
                security(("bearer_auth" = []))
            )]
            pub async fn delete(
                state: State<AppState>,
                auth: AuthContext,
                ids: ApiPath<(i64, i64)>,
            ) -> ApiResult<Json<$ty>> {
                delete_child::<$ty>(state, auth, ids).await
            }
        }
    };
}

catalog_endpoints!(
    priorities, Priority,
    name: "priority",
    tag: "Priorities",
    collection: "/cases/priorities",
    item: "/cases/priorities/{id}",
    id: "id",
);

catalog_endpoints!(
    sources, Source,
    name: "source",
    tag: "Sources",
    collection: "/cases/sources",
    item: "/cases/sources/{id}",
    id: "id",
);

catalog_endpoints!(
    statuses, Status,
    name: "status",
    tag: "Statuses",
    collection: "/cases/statuses",
    item: "/cases/statuses/{status_id}",
    id: "status_id",
);

child_catalog_endpoints!(
    status_conditions, StatusCondition,
    name: "status_condition",
    tag: "Statuses",
    collection: "/cases/statuses/{status_id}/status",
    item: "/cases/statuses/{status_id}/status/{id}",
    parent: "status_id",
);

catalog_endpoints!(
    close_reason_groups, CloseReasonGroup,
    name: "close_reason_group",
    tag: "Close reasons",
    collection: "/cases/close_reason_groups",
    item: "/cases/close_reason_groups/{close_reason_group_id}",
    id: "close_reason_group_id",
);

child_catalog_endpoints!(
    close_reasons, CloseReason,
    name: "close_reason",
    tag: "Close reasons",
    collection: "/cases/close_reason_groups/{close_reason_group_id}/close_reasons",
    item: "/cases/close_reason_groups/{close_reason_group_id}/close_reasons/{id}",
    parent: "close_reason_group_id",
);

catalog_endpoints!(
    slas, Sla,
    name: "sla",
    tag: "SLAs",
    collection: "/cases/slas",
    item: "/cases/slas/{sla_id}",
    id: "sla_id",
);

child_catalog_endpoints!(
    sla_conditions, SlaCondition,
    name: "sla_condition",
    tag: "SLAs",
    collection: "/cases/slas/{sla_id}/sla_conditions",
    item: "/cases/slas/{sla_id}/sla_conditions/{id}",
    parent: "sla_id",
);

/// Create the router for every catalog under /cases
pub fn catalogs_router() -> Router<AppState> {
    Router::new()
        .merge(priorities::router())
        .merge(sources::router())
        .merge(statuses::router())
        .merge(status_conditions::router())
        .merge(close_reason_groups::router())
        .merge(close_reasons::router())
        .merge(slas::router())
        .merge(sla_conditions::router())
}

async fn list_records<T: CatalogRules>(
    State(state): State<AppState>,
    _auth: AuthContext,
    ApiQuery(params): ApiQuery<ListParams>,
) -> ApiResult<Json<Page<Value>>> {
    let query = ListQuery::new(&params, state.page_limits())?;
    Ok(Json(state.catalog::<T>().list(None, &query).await?))
}

async fn create_record<T: CatalogRules>(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiJson(body): ApiJson<Value>,
) -> ApiResult<Json<T>> {
    let record = state.catalog::<T>().create(None, &body, &auth.user).await?;
    info!("[POST {}] User {} created {}", T::KIND, auth.user.user_id, record.id());
    Ok(Json(record))
}

async fn locate_record<T: CatalogRules>(
    State(state): State<AppState>,
    _auth: AuthContext,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<T>> {
    Ok(Json(state.catalog::<T>().locate(None, id).await?))
}

async fn update_record<T: CatalogRules>(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(id): ApiPath<i64>,
    ApiJson(body): ApiJson<Value>,
) -> ApiResult<Json<T>> {
    Ok(Json(
        state
            .catalog::<T>()
            .update(None, id, &body, &UpdateMode::Replace, &auth.user)
            .await?,
    ))
}

async fn patch_record<T: CatalogRules>(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(id): ApiPath<i64>,
    ApiQuery(params): ApiQuery<PatchParams>,
    ApiJson(body): ApiJson<Value>,
) -> ApiResult<Json<T>> {
    Ok(Json(
        state
            .catalog::<T>()
            .update(None, id, &body, &params.mode(), &auth.user)
            .await?,
    ))
}

async fn delete_record<T: CatalogRules>(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<T>> {
    let removed = state.catalog::<T>().delete(None, id).await?;
    info!("[DELETE {}] User {} deleted {}", T::KIND, auth.user.user_id, id);
    Ok(Json(removed))
}

async fn list_children<T: CatalogRules>(
    State(state): State<AppState>,
    _auth: AuthContext,
    ApiPath(parent_id): ApiPath<i64>,
    ApiQuery(params): ApiQuery<ListParams>,
) -> ApiResult<Json<Page<Value>>> {
    let query = ListQuery::new(&params, state.page_limits())?;
    Ok(Json(state.catalog::<T>().list(Some(parent_id), &query).await?))
}

async fn create_child<T: CatalogRules>(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(parent_id): ApiPath<i64>,
    ApiJson(body): ApiJson<Value>,
) -> ApiResult<Json<T>> {
    let record = state
        .catalog::<T>()
        .create(Some(parent_id), &body, &auth.user)
        .await?;
    info!(
        "[POST {}] User {} created {} under {}",
        T::KIND,
        auth.user.user_id,
        record.id(),
        parent_id
    );
    Ok(Json(record))
}

async fn locate_child<T: CatalogRules>(
    State(state): State<AppState>,
    _auth: AuthContext,
    ApiPath((parent_id, id)): ApiPath<(i64, i64)>,
) -> ApiResult<Json<T>> {
    Ok(Json(state.catalog::<T>().locate(Some(parent_id), id).await?))
}

async fn update_child<T: CatalogRules>(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath((parent_id, id)): ApiPath<(i64, i64)>,
    ApiJson(body): ApiJson<Value>,
) -> ApiResult<Json<T>> {
    Ok(Json(
        state
            .catalog::<T>()
            .update(Some(parent_id), id, &body, &UpdateMode::Replace, &auth.user)
            .await?,
    ))
}

async fn patch_child<T: CatalogRules>(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath((parent_id, id)): ApiPath<(i64, i64)>,
    ApiQuery(params): ApiQuery<PatchParams>,
    ApiJson(body): ApiJson<Value>,
) -> ApiResult<Json<T>> {
    Ok(Json(
        state
            .catalog::<T>()
            .update(Some(parent_id), id, &body, &params.mode(), &auth.user)
            .await?,
    ))
}

async fn delete_child<T: CatalogRules>(
    State(state): State<AppState>,
    _auth: AuthContext,
    ApiPath((parent_id, id)): ApiPath<(i64, i64)>,
) -> ApiResult<Json<T>> {
    Ok(Json(state.catalog::<T>().delete(Some(parent_id), id).await?))
}
