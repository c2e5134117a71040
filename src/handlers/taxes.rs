use axum::extract::{Extension, Path, RawQuery};
use axum::Json;
use once_cell::sync::Lazy;
use serde::Serialize;

use crate::database::models::Tax;
use crate::error::ApiError;
use crate::filter::{FilterFields, Operator, ResultPage, SortDirection, ValueKind};
use crate::middleware::auth::AuthUser;
use crate::services::listing;
use crate::services::workspace_access::WorkspaceAccessMode;

/// Field catalog for the taxes listing. `eq` on `title` is a search box:
/// case-insensitive containment, not literal equality.
pub static TAX_FIELDS: Lazy<FilterFields> = Lazy::new(|| {
    FilterFields::builder()
        .field("title", ValueKind::String, |field| {
            field.op(Operator::Eq, |value, conditions| {
                conditions.contains_ignore_case(&["title"], value)
            })
        })
        .sort_by("title", r#"lower("title")"#)
        .default_sort(r#"lower("title")"#, SortDirection::Asc)
        .build()
});

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxDto {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub rate_in_bps: i32,
}

impl From<Tax> for TaxDto {
    fn from(tax: Tax) -> Self {
        Self {
            id: tax.id,
            title: tax.title,
            description: tax.description,
            rate_in_bps: tax.rate_in_bps,
        }
    }
}

/// GET /api/workspaces/:workspace_id/taxes
pub async fn list_taxes(
    Extension(user): Extension<AuthUser>,
    Path(workspace_id): Path<i64>,
    RawQuery(query): RawQuery,
) -> Result<Json<ResultPage<TaxDto>>, ApiError> {
    let page = listing::workspace_page::<Tax, _, _>(
        &user,
        workspace_id,
        WorkspaceAccessMode::ReadOnly,
        "taxes",
        &TAX_FIELDS,
        query.as_deref(),
        TaxDto::from,
    )
    .await?;
    Ok(Json(page))
}
