//! The pagination wrapper around the listing engine: resolves who may read
//! what, injects the workspace scope condition and maps entities to their
//! public DTO shape. The only place cross-cutting authorization is applied;
//! the engine itself has no notion of tenancy.

use sqlx::postgres::PgRow;
use sqlx::FromRow;

use crate::database::manager::DatabaseManager;
use crate::error::ApiError;
use crate::filter::{FieldValue, FilterFields, FilterRequest, PagedQuery, ResultPage};
use crate::middleware::auth::AuthUser;

use super::workspace_access::{self, WorkspaceAccessMode};

/// Workspace-scoped listing: parse, authorize, scope, execute, map.
///
/// Request-shape validation runs before any store access; the workspace
/// lookup is the first store call, and the listing queries only run once
/// every predicate has compiled.
pub async fn workspace_page<E, D, F>(
    user: &AuthUser,
    workspace_id: i64,
    mode: WorkspaceAccessMode,
    table: &'static str,
    fields: &'static FilterFields,
    raw_query: Option<&str>,
    to_dto: F,
) -> Result<ResultPage<D>, ApiError>
where
    E: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    F: FnMut(E) -> D,
{
    let request = FilterRequest::parse(raw_query.unwrap_or(""))?;
    let workspace = workspace_access::get_accessible_workspace(user, workspace_id, mode).await?;

    let db = DatabaseManager::executor().await?;
    let page = PagedQuery::<E>::new(table, fields, &request)
        .scope("workspace_id", FieldValue::Long(workspace.id))
        .fetch_page(&db)
        .await?;

    Ok(page.map(to_dto))
}

/// Workspace-independent listing, restricted to administrators.
pub async fn admin_page<E, D, F>(
    user: &AuthUser,
    table: &'static str,
    fields: &'static FilterFields,
    raw_query: Option<&str>,
    to_dto: F,
) -> Result<ResultPage<D>, ApiError>
where
    E: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    F: FnMut(E) -> D,
{
    if !user.admin {
        return Err(ApiError::forbidden("Administrator access required"));
    }

    let request = FilterRequest::parse(raw_query.unwrap_or(""))?;
    let db = DatabaseManager::executor().await?;
    let page = PagedQuery::<E>::new(table, fields, &request)
        .fetch_page(&db)
        .await?;

    Ok(page.map(to_dto))
}
