use std::collections::HashMap;

use axum::{extract::State, Json};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::Serialize;

use crate::entities::{categoria_servicio, servicio};
use crate::error::AppResult;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct ServicioResponse {
    pub id: i32,
    pub nombre: String,
    pub categoria: String,
    pub precio: Decimal,
    pub descuento_reasignacion: Decimal,
    pub duracion_minutos: i32,
}

pub async fn list_categorias(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<categoria_servicio::Model>>> {
    let categorias = categoria_servicio::Entity::find()
        .order_by_asc(categoria_servicio::Column::Nombre)
        .all(&state.db)
        .await?;
    Ok(Json(categorias))
}

/// Services currently offered
pub async fn list_servicios(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<ServicioResponse>>> {
    let servicios = servicio::Entity::find()
        .filter(servicio::Column::Activo.eq(true))
        .order_by_asc(servicio::Column::Nombre)
        .all(&state.db)
        .await?;
    let categorias: HashMap<i32, String> = categoria_servicio::Entity::find()
        .all(&state.db)
        .await?
        .into_iter()
        .map(|c| (c.id, c.nombre))
        .collect();

    let responses = servicios
        .into_iter()
        .map(|s| ServicioResponse {
            id: s.id,
            categoria: categorias.get(&s.categoria_id).cloned().unwrap_or_default(),
            nombre: s.nombre,
            precio: s.precio,
            descuento_reasignacion: s.descuento_reasignacion,
            duracion_minutos: s.duracion_minutos,
        })
        .collect();

    Ok(Json(responses))
}
