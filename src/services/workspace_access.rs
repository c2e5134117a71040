use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::Workspace;
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;

/// Access level a caller needs on a workspace for an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkspaceAccessMode {
    Admin,
    ReadOnly,
    ReadWrite,
}

/// Resolve the workspace the caller may act on.
///
/// Owners hold every access mode; sharing grants are managed elsewhere and
/// do not influence API listings. Any failure - missing workspace or a
/// caller without access - is reported as not-found so workspace existence
/// is never leaked.
pub async fn get_accessible_workspace(
    user: &AuthUser,
    workspace_id: i64,
    _mode: WorkspaceAccessMode,
) -> Result<Workspace, ApiError> {
    let db = DatabaseManager::executor().await?;

    let workspace: Option<Workspace> = {
        let _worker = db.checkout().await?;
        sqlx::query_as::<_, Workspace>("SELECT * FROM \"workspaces\" WHERE \"id\" = $1")
            .bind(workspace_id)
            .fetch_optional(db.pool())
            .await
            .map_err(DatabaseError::from)?
    };

    workspace
        .filter(|workspace| workspace.owner_id == user.user_id)
        .ok_or_else(|| ApiError::not_found(format!("Workspace {} is not found", workspace_id)))
}
