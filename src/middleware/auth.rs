use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use crate::entities::user;
use crate::error::{AppError, AppResult};
use crate::services::tokens;
use crate::AppState;

/// Resolve the bearer token to its user and store the user in the request
/// extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    mut request: Request,
    next: Next,
) -> AppResult<Response> {
    let user = tokens::lookup(&state.db, auth.token())
        .await
        .map_err(|e| match e {
            AppError::NotFound(_) => AppError::Unauthorized("Invalid token".to_string()),
            other => other,
        })?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Require a propietario or empleado
pub async fn require_staff(request: Request, next: Next) -> AppResult<Response> {
    let user = request
        .extensions()
        .get::<user::Model>()
        .ok_or_else(|| AppError::Unauthorized("No authentication found".to_string()))?;

    if !user.role.is_staff() {
        return Err(AppError::Forbidden("Staff access required".to_string()));
    }

    Ok(next.run(request).await)
}
