use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};

use crate::auth::{generate_jwt, Claims};
use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::User;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub user_name: String,
    pub password: String,
}

/// POST /api/auth/login - verify credentials and issue a JWT
pub async fn login(Json(request): Json<LoginRequest>) -> Result<Json<Value>, ApiError> {
    let db = DatabaseManager::executor().await?;

    let user: Option<User> = {
        let _worker = db.checkout().await?;
        sqlx::query_as::<_, User>("SELECT * FROM \"users\" WHERE \"user_name\" = $1")
            .bind(&request.user_name)
            .fetch_optional(db.pool())
            .await
            .map_err(DatabaseError::from)?
    };

    // Same response for unknown user, wrong password and inactive account.
    let user = user
        .filter(|user| user.activated)
        .ok_or_else(|| ApiError::unauthorized("Invalid login credentials"))?;
    if password_digest(&request.password) != user.password_hash {
        return Err(ApiError::unauthorized("Invalid login credentials"));
    }

    let claims = Claims::new(user.id, user.user_name.clone(), user.admin);
    let token = generate_jwt(&claims).map_err(|e| {
        tracing::error!("token generation failed: {}", e);
        ApiError::internal_server_error("Failed to issue token")
    })?;

    Ok(Json(json!({
        "token": token,
        "user": {
            "id": user.id,
            "userName": user.user_name,
            "admin": user.admin
        }
    })))
}

pub fn password_digest(password: &str) -> String {
    format!("{:x}", Sha256::digest(password.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_digest_is_stable_hex() {
        let digest = password_digest("secret");
        assert_eq!(digest.len(), 64);
        assert_eq!(digest, password_digest("secret"));
        assert_ne!(digest, password_digest("Secret"));
    }
}
