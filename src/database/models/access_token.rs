use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Shareable read token for a workspace.
#[derive(Debug, Clone, FromRow)]
pub struct WorkspaceAccessToken {
    pub id: i64,
    pub workspace_id: i64,
    pub token: Uuid,
    pub valid_till: DateTime<Utc>,
    pub revoked: bool,
    pub created_at: DateTime<Utc>,
}
