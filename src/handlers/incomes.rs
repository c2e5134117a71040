use axum::extract::{Extension, Path, RawQuery};
use axum::Json;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use serde::Serialize;

use crate::database::models::Income;
use crate::error::ApiError;
use crate::filter::{FilterFields, Operator, ResultPage, SortDirection, ValueKind};
use crate::middleware::auth::AuthUser;
use crate::services::listing;
use crate::services::workspace_access::WorkspaceAccessMode;

pub static INCOME_FIELDS: Lazy<FilterFields> = Lazy::new(|| {
    FilterFields::builder()
        .field("freeSearchText", ValueKind::String, |field| {
            field.op(Operator::Eq, |value, conditions| {
                conditions.contains_ignore_case(&["title", "notes"], value)
            })
        })
        .field("dateReceived", ValueKind::Date, |field| {
            field
                .op(Operator::Eq, |value, conditions| {
                    conditions.compare("date_received", "=", value)
                })
                .op(Operator::Goe, |value, conditions| {
                    conditions.compare("date_received", ">=", value)
                })
                .op(Operator::Loe, |value, conditions| {
                    conditions.compare("date_received", "<=", value)
                })
        })
        .sort_by("dateReceived", r#""date_received""#)
        .default_sort(r#""date_received""#, SortDirection::Desc)
        .default_sort(r#""id""#, SortDirection::Desc)
        .build()
});

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeDto {
    pub id: i64,
    pub title: String,
    pub currency: String,
    pub amount_cents: i64,
    pub date_received: NaiveDate,
    pub notes: Option<String>,
}

impl From<Income> for IncomeDto {
    fn from(income: Income) -> Self {
        Self {
            id: income.id,
            title: income.title,
            currency: income.currency,
            amount_cents: income.amount_cents,
            date_received: income.date_received,
            notes: income.notes,
        }
    }
}

/// GET /api/workspaces/:workspace_id/incomes
pub async fn list_incomes(
    Extension(user): Extension<AuthUser>,
    Path(workspace_id): Path<i64>,
    RawQuery(query): RawQuery,
) -> Result<Json<ResultPage<IncomeDto>>, ApiError> {
    let page = listing::workspace_page::<Income, _, _>(
        &user,
        workspace_id,
        WorkspaceAccessMode::ReadOnly,
        "incomes",
        &INCOME_FIELDS,
        query.as_deref(),
        IncomeDto::from,
    )
    .await?;
    Ok(Json(page))
}
