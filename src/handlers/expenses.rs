use axum::extract::{Extension, Path, RawQuery};
use axum::Json;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use serde::Serialize;

use crate::database::models::Expense;
use crate::error::ApiError;
use crate::filter::{FilterFields, Operator, ResultPage, SortDirection, ValueKind};
use crate::middleware::auth::AuthUser;
use crate::services::listing;
use crate::services::workspace_access::WorkspaceAccessMode;

pub static EXPENSE_FIELDS: Lazy<FilterFields> = Lazy::new(|| {
    FilterFields::builder()
        .field("freeSearchText", ValueKind::String, |field| {
            field.op(Operator::Eq, |value, conditions| {
                conditions.contains_ignore_case(&["title", "notes"], value)
            })
        })
        .field("datePaid", ValueKind::Date, |field| {
            field
                .op(Operator::Eq, |value, conditions| {
                    conditions.compare("date_paid", "=", value)
                })
                .op(Operator::Goe, |value, conditions| {
                    conditions.compare("date_paid", ">=", value)
                })
                .op(Operator::Loe, |value, conditions| {
                    conditions.compare("date_paid", "<=", value)
                })
        })
        .sort_by("datePaid", r#""date_paid""#)
        .default_sort(r#""date_paid""#, SortDirection::Desc)
        .default_sort(r#""id""#, SortDirection::Desc)
        .build()
});

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseDto {
    pub id: i64,
    pub title: String,
    pub currency: String,
    pub amount_cents: i64,
    pub date_paid: NaiveDate,
    pub notes: Option<String>,
}

impl From<Expense> for ExpenseDto {
    fn from(expense: Expense) -> Self {
        Self {
            id: expense.id,
            title: expense.title,
            currency: expense.currency,
            amount_cents: expense.amount_cents,
            date_paid: expense.date_paid,
            notes: expense.notes,
        }
    }
}

/// GET /api/workspaces/:workspace_id/expenses
pub async fn list_expenses(
    Extension(user): Extension<AuthUser>,
    Path(workspace_id): Path<i64>,
    RawQuery(query): RawQuery,
) -> Result<Json<ResultPage<ExpenseDto>>, ApiError> {
    let page = listing::workspace_page::<Expense, _, _>(
        &user,
        workspace_id,
        WorkspaceAccessMode::ReadOnly,
        "expenses",
        &EXPENSE_FIELDS,
        query.as_deref(),
        ExpenseDto::from,
    )
    .await?;
    Ok(Json(page))
}
