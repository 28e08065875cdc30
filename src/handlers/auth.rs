use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};

use crate::entities::user::{self, UserRole};
use crate::error::AppResult;
use crate::services::{accounts, tokens};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Email or username.
    #[serde(alias = "email", alias = "username")]
    pub login: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserInfo,
}

#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub role: UserRole,
}

impl From<user::Model> for UserInfo {
    fn from(u: user::Model) -> Self {
        Self {
            id: u.id,
            username: u.username,
            email: u.email,
            role: u.role,
        }
    }
}

/// Exchange credentials for the user's token, creating it on first login
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let user = accounts::authenticate(&state.db, &payload.login, &payload.password).await?;
    let (token, _) = tokens::get_or_create(&state.db, user.id).await?;

    Ok(Json(AuthResponse {
        token: token.key,
        user: user.into(),
    }))
}

pub async fn me(Extension(user): Extension<user::Model>) -> Json<UserInfo> {
    Json(user.into())
}
