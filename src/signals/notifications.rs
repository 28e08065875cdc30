use sea_orm::{DatabaseConnection, EntityTrait};

use super::{DomainEvent, Receiver};
use crate::entities::notificacion::TipoNotificacion;
use crate::entities::{cliente, empleado, servicio};
use crate::error::{AppError, AppResult};
use crate::services::notificaciones;

/// Tells clients and employees about changes to their turnos.
pub struct NotificationReceiver;

#[async_trait::async_trait]
impl Receiver for NotificationReceiver {
    fn name(&self) -> &'static str {
        "notificaciones"
    }

    async fn receive(&self, db: &DatabaseConnection, event: &DomainEvent) -> AppResult<()> {
        let turno = event.turno();

        let cliente = cliente::Entity::find_by_id(turno.cliente_id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound("Cliente not found".to_string()))?;
        let empleado = empleado::Entity::find_by_id(turno.empleado_id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound("Empleado not found".to_string()))?;
        let servicio = servicio::Entity::find_by_id(turno.servicio_id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound("Servicio not found".to_string()))?;

        let cuando = turno.fecha_hora.format("%d/%m/%Y %H:%M").to_string();

        match event {
            DomainEvent::TurnoCreado(_) => {
                notificaciones::notify(
                    db,
                    cliente.user_id,
                    TipoNotificacion::TurnoCreado,
                    "Turno reservado",
                    &format!("Tu turno de {} quedó reservado para el {}.", servicio.nombre, cuando),
                )
                .await?;
                notificaciones::notify(
                    db,
                    empleado.user_id,
                    TipoNotificacion::TurnoCreado,
                    "Nuevo turno asignado",
                    &format!(
                        "{} reservó {} para el {}.",
                        cliente.nombre_completo, servicio.nombre, cuando
                    ),
                )
                .await?;
            }
            DomainEvent::TurnoConfirmado(_) => {
                notificaciones::notify(
                    db,
                    cliente.user_id,
                    TipoNotificacion::TurnoConfirmado,
                    "Turno confirmado",
                    &format!("Tu turno de {} del {} está confirmado.", servicio.nombre, cuando),
                )
                .await?;
            }
            DomainEvent::TurnoCancelado(_) => {
                let mensaje = format!("El turno de {} del {} fue cancelado.", servicio.nombre, cuando);
                notificaciones::notify(
                    db,
                    cliente.user_id,
                    TipoNotificacion::TurnoCancelado,
                    "Turno cancelado",
                    &mensaje,
                )
                .await?;
                notificaciones::notify(
                    db,
                    empleado.user_id,
                    TipoNotificacion::TurnoCancelado,
                    "Turno cancelado",
                    &mensaje,
                )
                .await?;
            }
            DomainEvent::TurnoReasignado { anterior, .. } => {
                let mensaje = format!(
                    "El turno de {} se movió del {} al {}. Precio final: ${}.",
                    servicio.nombre,
                    anterior.format("%d/%m/%Y %H:%M"),
                    cuando,
                    turno.precio_final
                );
                notificaciones::notify(
                    db,
                    cliente.user_id,
                    TipoNotificacion::TurnoReasignado,
                    "Turno reasignado",
                    &mensaje,
                )
                .await?;
                notificaciones::notify(
                    db,
                    empleado.user_id,
                    TipoNotificacion::TurnoReasignado,
                    "Turno reasignado",
                    &mensaje,
                )
                .await?;
            }
            // Completion is followed up by the survey receiver
            DomainEvent::TurnoCompletado(_) => {}
        }

        Ok(())
    }
}
