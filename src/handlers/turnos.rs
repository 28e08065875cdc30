use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, DatabaseConnection, QueryFilter};
use serde::Deserialize;

use crate::entities::turno::{self, EstadoTurno};
use crate::entities::user::{self, UserRole};
use crate::error::{AppError, AppResult};
use crate::pagination::{paginate, Page, PageParams};
use crate::services::{accounts, turnos};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateTurnoRequest {
    /// Required for staff, ignored for clients who always book for themselves.
    pub cliente_id: Option<i32>,
    pub empleado_id: i32,
    pub servicio_id: i32,
    pub fecha_hora: DateTime<Utc>,
    pub notas_cliente: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EstadoRequest {
    pub estado: EstadoTurno,
}

/// Fetch a turno only if `user` may see it
async fn visible_turno(
    db: &DatabaseConnection,
    user: &user::Model,
    turno_id: i32,
) -> AppResult<turno::Model> {
    turnos::visible_to(db, user)
        .await?
        .filter(turno::Column::Id.eq(turno_id))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Turno not found".to_string()))
}

pub async fn list_turnos(
    State(state): State<AppState>,
    Extension(user): Extension<user::Model>,
    Query(params): Query<PageParams>,
) -> AppResult<Json<Page<turno::Model>>> {
    let query = turnos::visible_to(&state.db, &user).await?;
    let page = paginate(&state.db, query, &params, state.config.page_size).await?;
    Ok(Json(page))
}

pub async fn create_turno(
    State(state): State<AppState>,
    Extension(user): Extension<user::Model>,
    Json(payload): Json<CreateTurnoRequest>,
) -> AppResult<(StatusCode, Json<turno::Model>)> {
    let cliente_id = match user.role {
        UserRole::Cliente => accounts::cliente_for_user(&state.db, user.id).await?.id,
        _ => payload
            .cliente_id
            .ok_or_else(|| AppError::BadRequest("cliente_id is required".to_string()))?,
    };

    let turno = turnos::create_turno(
        &state.db,
        &state.signals,
        turnos::NewTurno {
            cliente_id,
            empleado_id: payload.empleado_id,
            servicio_id: payload.servicio_id,
            fecha_hora: payload.fecha_hora,
            notas_cliente: payload.notas_cliente,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(turno)))
}

/// Clients may only cancel their own turnos; staff drive the rest of the
/// lifecycle.
pub async fn update_estado(
    State(state): State<AppState>,
    Extension(user): Extension<user::Model>,
    Path(turno_id): Path<i32>,
    Json(payload): Json<EstadoRequest>,
) -> AppResult<Json<turno::Model>> {
    visible_turno(&state.db, &user, turno_id).await?;

    if user.role == UserRole::Cliente && payload.estado != EstadoTurno::Cancelado {
        return Err(AppError::Forbidden(
            "Clients can only cancel their turnos".to_string(),
        ));
    }

    let turno = turnos::change_estado(&state.db, &state.signals, turno_id, payload.estado).await?;
    Ok(Json(turno))
}

pub async fn reassign_turno(
    State(state): State<AppState>,
    Extension(user): Extension<user::Model>,
    Path(turno_id): Path<i32>,
    Json(payload): Json<turnos::Reassignment>,
) -> AppResult<Json<turno::Model>> {
    if !user.role.is_staff() {
        return Err(AppError::Forbidden("Staff access required".to_string()));
    }
    visible_turno(&state.db, &user, turno_id).await?;

    let turno = turnos::reassign_turno(&state.db, &state.signals, turno_id, payload).await?;
    Ok(Json(turno))
}
