use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

/// Money amounts are integer cents in the workspace currency.
#[derive(Debug, Clone, FromRow)]
pub struct Expense {
    pub id: i64,
    pub workspace_id: i64,
    pub title: String,
    pub currency: String,
    pub amount_cents: i64,
    pub date_paid: NaiveDate,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}
