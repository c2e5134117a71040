use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct Workspace {
    pub id: i64,
    pub owner_id: i64,
    pub name: String,
    pub default_currency: String,
    pub created_at: DateTime<Utc>,
}
