use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    Select, Set,
};
use serde::Deserialize;

use crate::entities::{encuesta, turno};
use crate::error::{AppError, AppResult};

#[derive(Debug, Deserialize)]
pub struct Answer {
    pub puntuacion: i32,
    pub comentario: Option<String>,
}

/// Survey for a completed turno. Creating it twice returns the first one;
/// the flag tells whether this call created it.
pub async fn create_for_turno(
    db: &DatabaseConnection,
    turno: &turno::Model,
) -> AppResult<(encuesta::Model, bool)> {
    let existing = encuesta::Entity::find()
        .filter(encuesta::Column::TurnoId.eq(turno.id))
        .one(db)
        .await?;
    if let Some(encuesta) = existing {
        return Ok((encuesta, false));
    }

    let encuesta = encuesta::ActiveModel {
        turno_id: Set(turno.id),
        cliente_id: Set(turno.cliente_id),
        puntuacion: Set(None),
        comentario: Set(None),
        respondida_at: Set(None),
        created_at: Set(Utc::now().into()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    Ok((encuesta, true))
}

pub fn for_cliente(cliente_id: i32) -> Select<encuesta::Entity> {
    encuesta::Entity::find()
        .filter(encuesta::Column::ClienteId.eq(cliente_id))
        .order_by_desc(encuesta::Column::Id)
}

pub async fn answer(
    db: &DatabaseConnection,
    cliente_id: i32,
    encuesta_id: i32,
    answer: Answer,
) -> AppResult<encuesta::Model> {
    if !(1..=5).contains(&answer.puntuacion) {
        return Err(AppError::BadRequest(
            "puntuacion must be between 1 and 5".to_string(),
        ));
    }

    let encuesta = encuesta::Entity::find_by_id(encuesta_id)
        .filter(encuesta::Column::ClienteId.eq(cliente_id))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Encuesta not found".to_string()))?;

    if encuesta.respondida_at.is_some() {
        return Err(AppError::Conflict("Encuesta already answered".to_string()));
    }

    let comentario = answer
        .comentario
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty());

    let mut active: encuesta::ActiveModel = encuesta.into();
    active.puntuacion = Set(Some(answer.puntuacion));
    active.comentario = Set(comentario);
    active.respondida_at = Set(Some(Utc::now().into()));
    Ok(active.update(db).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::turno::EstadoTurno;
    use crate::services::turnos::{change_estado, create_turno, NewTurno};
    use crate::test_support::{salon, Salon};
    use chrono::Duration;
    use sea_orm::PaginatorTrait;

    async fn completed_turno(s: &Salon) -> turno::Model {
        let turno = create_turno(
            &s.db,
            &s.signals,
            NewTurno {
                cliente_id: s.cliente.id,
                empleado_id: s.empleado.id,
                servicio_id: s.servicio.id,
                fecha_hora: Utc::now() + Duration::days(2),
                notas_cliente: None,
            },
        )
        .await
        .unwrap();
        change_estado(&s.db, &s.signals, turno.id, EstadoTurno::Confirmado)
            .await
            .unwrap();
        change_estado(&s.db, &s.signals, turno.id, EstadoTurno::Completado)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_for_turno_is_idempotent() {
        let s = salon().await;
        let turno = completed_turno(&s).await;

        // The completion signal already created it
        let (encuesta, created) = create_for_turno(&s.db, &turno).await.unwrap();
        assert!(!created);
        assert_eq!(encuesta.cliente_id, s.cliente.id);
        assert_eq!(for_cliente(s.cliente.id).count(&s.db).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_answer_validates_and_only_once() {
        let s = salon().await;
        let turno = completed_turno(&s).await;
        let (encuesta, _) = create_for_turno(&s.db, &turno).await.unwrap();

        let err = answer(
            &s.db,
            s.cliente.id,
            encuesta.id,
            Answer {
                puntuacion: 6,
                comentario: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        let answered = answer(
            &s.db,
            s.cliente.id,
            encuesta.id,
            Answer {
                puntuacion: 4,
                comentario: Some("  muy bien ".to_string()),
            },
        )
        .await
        .unwrap();
        assert_eq!(answered.puntuacion, Some(4));
        assert_eq!(answered.comentario.as_deref(), Some("muy bien"));
        assert!(answered.respondida_at.is_some());

        let err = answer(
            &s.db,
            s.cliente.id,
            encuesta.id,
            Answer {
                puntuacion: 3,
                comentario: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_other_clients_cannot_answer() {
        let s = salon().await;
        let turno = completed_turno(&s).await;
        let (encuesta, _) = create_for_turno(&s.db, &turno).await.unwrap();

        let err = answer(
            &s.db,
            s.cliente.id + 100,
            encuesta.id,
            Answer {
                puntuacion: 5,
                comentario: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
