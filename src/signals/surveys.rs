use sea_orm::{DatabaseConnection, EntityTrait};

use super::{DomainEvent, Receiver};
use crate::entities::cliente;
use crate::entities::notificacion::TipoNotificacion;
use crate::error::{AppError, AppResult};
use crate::services::{encuestas, notificaciones};

/// Opens a satisfaction survey for every completed turno.
pub struct SurveyReceiver;

#[async_trait::async_trait]
impl Receiver for SurveyReceiver {
    fn name(&self) -> &'static str {
        "encuestas"
    }

    async fn receive(&self, db: &DatabaseConnection, event: &DomainEvent) -> AppResult<()> {
        let DomainEvent::TurnoCompletado(turno) = event else {
            return Ok(());
        };

        let (encuesta, created) = encuestas::create_for_turno(db, turno).await?;
        if !created {
            return Ok(());
        }

        let cliente = cliente::Entity::find_by_id(turno.cliente_id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound("Cliente not found".to_string()))?;

        notificaciones::notify(
            db,
            cliente.user_id,
            TipoNotificacion::Encuesta,
            "¿Cómo fue tu turno?",
            &format!(
                "Contanos qué te pareció tu visita respondiendo la encuesta #{}.",
                encuesta.id
            ),
        )
        .await?;

        tracing::info!(turno_id = turno.id, encuesta_id = encuesta.id, "Encuesta created");
        Ok(())
    }
}
