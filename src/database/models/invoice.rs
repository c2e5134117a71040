use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

/// Invoice lifecycle states as stored in the `status` column.
pub const INVOICE_STATUSES: &[&str] = &["draft", "sent", "paid", "overdue", "cancelled"];

#[derive(Debug, Clone, FromRow)]
pub struct Invoice {
    pub id: i64,
    pub workspace_id: i64,
    pub customer_id: i64,
    pub title: String,
    pub currency: String,
    pub amount_cents: i64,
    pub date_issued: NaiveDate,
    pub due_date: NaiveDate,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}
