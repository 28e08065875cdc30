use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};

use crate::entities::{notificacion, notificacion_config, user};
use crate::error::AppResult;
use crate::pagination::{paginate, Page, PageParams};
use crate::services::notificaciones::{self, ConfigUpdate};
use crate::AppState;

pub async fn list_notificaciones(
    State(state): State<AppState>,
    Extension(user): Extension<user::Model>,
    Query(params): Query<PageParams>,
) -> AppResult<Json<Page<notificacion::Model>>> {
    let page = paginate(
        &state.db,
        notificaciones::for_user(user.id),
        &params,
        state.config.page_size,
    )
    .await?;
    Ok(Json(page))
}

pub async fn mark_read(
    State(state): State<AppState>,
    Extension(user): Extension<user::Model>,
    Path(notificacion_id): Path<i32>,
) -> AppResult<Json<notificacion::Model>> {
    let notificacion = notificaciones::mark_read(&state.db, user.id, notificacion_id).await?;
    Ok(Json(notificacion))
}

pub async fn get_config(
    State(state): State<AppState>,
    Extension(user): Extension<user::Model>,
) -> AppResult<Json<notificacion_config::Model>> {
    Ok(Json(notificaciones::config_for(&state.db, user.id).await?))
}

pub async fn update_config(
    State(state): State<AppState>,
    Extension(user): Extension<user::Model>,
    Json(payload): Json<ConfigUpdate>,
) -> AppResult<Json<notificacion_config::Model>> {
    let config = notificaciones::update_config(&state.db, user.id, payload).await?;
    tracing::debug!(user_id = user.id, "Notification preferences updated");
    Ok(Json(config))
}
