use std::collections::HashMap;

use axum::{
    extract::{Query, State},
    Json,
};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::Serialize;

use crate::entities::{cliente, user};
use crate::error::AppResult;
use crate::pagination::{paginate, Page, PageParams};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct ClienteResponse {
    pub id: i32,
    pub nombre_completo: String,
    pub telefono: Option<String>,
    pub email: String,
}

/// List clients (staff only), paginated
pub async fn list_clientes(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> AppResult<Json<Page<ClienteResponse>>> {
    let page = paginate(
        &state.db,
        cliente::Entity::find().order_by_asc(cliente::Column::Id),
        &params,
        state.config.page_size,
    )
    .await?;

    let user_ids: Vec<i32> = page.results.iter().map(|c| c.user_id).collect();
    let emails: HashMap<i32, String> = user::Entity::find()
        .filter(user::Column::Id.is_in(user_ids))
        .all(&state.db)
        .await?
        .into_iter()
        .map(|u| (u.id, u.email))
        .collect();

    Ok(Json(page.map(|c| ClienteResponse {
        id: c.id,
        email: emails.get(&c.user_id).cloned().unwrap_or_default(),
        nombre_completo: c.nombre_completo,
        telefono: c.telefono,
    })))
}
