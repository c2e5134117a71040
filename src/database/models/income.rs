use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct Income {
    pub id: i64,
    pub workspace_id: i64,
    pub title: String,
    pub currency: String,
    pub amount_cents: i64,
    pub date_received: NaiveDate,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}
