use axum::extract::{Extension, Path, RawQuery};
use axum::Json;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use serde::Serialize;

use crate::database::models::invoice::{Invoice, INVOICE_STATUSES};
use crate::error::ApiError;
use crate::filter::{FilterFields, Operator, ResultPage, SortDirection, ValueKind};
use crate::middleware::auth::AuthUser;
use crate::services::listing;
use crate::services::workspace_access::WorkspaceAccessMode;

pub static INVOICE_FIELDS: Lazy<FilterFields> = Lazy::new(|| {
    FilterFields::builder()
        .field("freeSearchText", ValueKind::String, |field| {
            field.op(Operator::Eq, |value, conditions| {
                conditions.contains_ignore_case(&["title", "notes"], value)
            })
        })
        .field(
            "status",
            ValueKind::Enum {
                name: "InvoiceStatus",
                values: INVOICE_STATUSES,
            },
            |field| {
                field
                    .op(Operator::Eq, |value, conditions| {
                        conditions.compare("status", "=", value)
                    })
                    .op_list(Operator::In, |values, conditions| {
                        conditions.one_of("status", values)
                    })
            },
        )
        .field("customerId", ValueKind::Long, |field| {
            field
                .op(Operator::Eq, |value, conditions| {
                    conditions.compare("customer_id", "=", value)
                })
                .op_list(Operator::In, |values, conditions| {
                    conditions.one_of("customer_id", values)
                })
        })
        .field("dateIssued", ValueKind::Date, |field| {
            field
                .op(Operator::Eq, |value, conditions| {
                    conditions.compare("date_issued", "=", value)
                })
                .op(Operator::Goe, |value, conditions| {
                    conditions.compare("date_issued", ">=", value)
                })
                .op(Operator::Loe, |value, conditions| {
                    conditions.compare("date_issued", "<=", value)
                })
        })
        .sort_by("dateIssued", r#""date_issued""#)
        .default_sort(r#""date_issued""#, SortDirection::Desc)
        .default_sort(r#""id""#, SortDirection::Desc)
        .build()
});

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDto {
    pub id: i64,
    pub customer_id: i64,
    pub title: String,
    pub currency: String,
    pub amount_cents: i64,
    pub date_issued: NaiveDate,
    pub due_date: NaiveDate,
    pub status: String,
    pub notes: Option<String>,
}

impl From<Invoice> for InvoiceDto {
    fn from(invoice: Invoice) -> Self {
        Self {
            id: invoice.id,
            customer_id: invoice.customer_id,
            title: invoice.title,
            currency: invoice.currency,
            amount_cents: invoice.amount_cents,
            date_issued: invoice.date_issued,
            due_date: invoice.due_date,
            status: invoice.status,
            notes: invoice.notes,
        }
    }
}

/// GET /api/workspaces/:workspace_id/invoices
pub async fn list_invoices(
    Extension(user): Extension<AuthUser>,
    Path(workspace_id): Path<i64>,
    RawQuery(query): RawQuery,
) -> Result<Json<ResultPage<InvoiceDto>>, ApiError> {
    let page = listing::workspace_page::<Invoice, _, _>(
        &user,
        workspace_id,
        WorkspaceAccessMode::ReadOnly,
        "invoices",
        &INVOICE_FIELDS,
        query.as_deref(),
        InvoiceDto::from,
    )
    .await?;
    Ok(Json(page))
}
