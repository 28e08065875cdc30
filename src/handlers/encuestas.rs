use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};

use crate::entities::{encuesta, user};
use crate::error::AppResult;
use crate::pagination::{paginate, Page, PageParams};
use crate::services::{accounts, encuestas};
use crate::AppState;

/// Surveys of the authenticated client
pub async fn list_encuestas(
    State(state): State<AppState>,
    Extension(user): Extension<user::Model>,
    Query(params): Query<PageParams>,
) -> AppResult<Json<Page<encuesta::Model>>> {
    let cliente = accounts::cliente_for_user(&state.db, user.id).await?;
    let page = paginate(
        &state.db,
        encuestas::for_cliente(cliente.id),
        &params,
        state.config.page_size,
    )
    .await?;
    Ok(Json(page))
}

pub async fn responder(
    State(state): State<AppState>,
    Extension(user): Extension<user::Model>,
    Path(encuesta_id): Path<i32>,
    Json(payload): Json<encuestas::Answer>,
) -> AppResult<Json<encuesta::Model>> {
    let cliente = accounts::cliente_for_user(&state.db, user.id).await?;
    let encuesta = encuestas::answer(&state.db, cliente.id, encuesta_id, payload).await?;
    tracing::info!(encuesta_id, "Encuesta answered");
    Ok(Json(encuesta))
}
