use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// A workspace-level tax; the rate is stored in basis points.
#[derive(Debug, Clone, FromRow)]
pub struct Tax {
    pub id: i64,
    pub workspace_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub rate_in_bps: i32,
    pub created_at: DateTime<Utc>,
}
