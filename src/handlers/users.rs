use axum::extract::{Extension, RawQuery};
use axum::Json;
use once_cell::sync::Lazy;
use serde::Serialize;

use crate::database::models::User;
use crate::error::ApiError;
use crate::filter::{FilterFields, Operator, ResultPage, SortDirection, ValueKind};
use crate::middleware::auth::AuthUser;
use crate::services::listing;

/// Field catalog for the platform users listing (administrators only).
pub static USER_FIELDS: Lazy<FilterFields> = Lazy::new(|| {
    FilterFields::builder()
        .field("userName", ValueKind::String, |field| {
            field.op(Operator::Eq, |value, conditions| {
                conditions.contains_ignore_case(&["user_name"], value)
            })
        })
        .sort_by("userName", r#"lower("user_name")"#)
        .default_sort(r#"lower("user_name")"#, SortDirection::Asc)
        .build()
});

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: i64,
    pub user_name: String,
    pub admin: bool,
    pub activated: bool,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            user_name: user.user_name,
            admin: user.admin,
            activated: user.activated,
        }
    }
}

/// GET /api/users - workspace-independent, admin only
pub async fn list_users(
    Extension(user): Extension<AuthUser>,
    RawQuery(query): RawQuery,
) -> Result<Json<ResultPage<UserDto>>, ApiError> {
    let page = listing::admin_page::<User, _, _>(
        &user,
        "users",
        &USER_FIELDS,
        query.as_deref(),
        UserDto::from,
    )
    .await?;
    Ok(Json(page))
}
