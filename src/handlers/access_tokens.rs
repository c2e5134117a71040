use axum::extract::{Extension, Path, RawQuery};
use axum::Json;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::Serialize;
use uuid::Uuid;

use crate::database::models::WorkspaceAccessToken;
use crate::error::ApiError;
use crate::filter::{FilterFields, Operator, ResultPage, SortDirection, ValueKind};
use crate::middleware::auth::AuthUser;
use crate::services::listing;
use crate::services::workspace_access::WorkspaceAccessMode;

pub static ACCESS_TOKEN_FIELDS: Lazy<FilterFields> = Lazy::new(|| {
    FilterFields::builder()
        .field("validTill", ValueKind::Timestamp, |field| {
            field
                .op(Operator::Goe, |value, conditions| {
                    conditions.compare("valid_till", ">=", value)
                })
                .op(Operator::Loe, |value, conditions| {
                    conditions.compare("valid_till", "<=", value)
                })
        })
        .sort_by("validTill", r#""valid_till""#)
        .default_sort(r#""valid_till""#, SortDirection::Desc)
        .default_sort(r#""id""#, SortDirection::Desc)
        .build()
});

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenDto {
    pub id: i64,
    pub token: Uuid,
    pub valid_till: DateTime<Utc>,
    pub revoked: bool,
}

impl From<WorkspaceAccessToken> for AccessTokenDto {
    fn from(token: WorkspaceAccessToken) -> Self {
        Self {
            id: token.id,
            token: token.token,
            valid_till: token.valid_till,
            revoked: token.revoked,
        }
    }
}

/// GET /api/workspaces/:workspace_id/access-tokens
pub async fn list_access_tokens(
    Extension(user): Extension<AuthUser>,
    Path(workspace_id): Path<i64>,
    RawQuery(query): RawQuery,
) -> Result<Json<ResultPage<AccessTokenDto>>, ApiError> {
    let page = listing::workspace_page::<WorkspaceAccessToken, _, _>(
        &user,
        workspace_id,
        WorkspaceAccessMode::ReadWrite,
        "workspace_access_tokens",
        &ACCESS_TOKEN_FIELDS,
        query.as_deref(),
        AccessTokenDto::from,
    )
    .await?;
    Ok(Json(page))
}
