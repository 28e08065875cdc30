use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    Select, Set,
};
use serde::Deserialize;

use crate::entities::turno::{self, EstadoTurno};
use crate::entities::user::{self, UserRole};
use crate::entities::{cliente, empleado, servicio};
use crate::error::{AppError, AppResult};
use crate::services::accounts;
use crate::signals::{DomainEvent, SignalRegistry};

#[derive(Debug, Clone, Deserialize)]
pub struct NewTurno {
    pub cliente_id: i32,
    pub empleado_id: i32,
    pub servicio_id: i32,
    pub fecha_hora: DateTime<Utc>,
    pub notas_cliente: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Reassignment {
    pub fecha_hora: DateTime<Utc>,
    /// Keep the current empleado when absent.
    pub empleado_id: Option<i32>,
}

/// Price of a reassigned turno: the base price minus the service's fixed
/// reassignment discount, never below zero. Always computed from the base
/// price so repeated reassignments do not stack.
pub fn reassignment_price(precio: Decimal, descuento: Decimal) -> Decimal {
    (precio - descuento.max(Decimal::ZERO)).max(Decimal::ZERO)
}

/// Turnos visible to `user`: everything for a propietario, their own agenda
/// for an empleado, their own bookings for a cliente.
pub async fn visible_to(
    db: &DatabaseConnection,
    user: &user::Model,
) -> AppResult<Select<turno::Entity>> {
    let query = turno::Entity::find().order_by_asc(turno::Column::FechaHora);
    let query = match user.role {
        UserRole::Propietario => query,
        UserRole::Empleado => {
            let empleado = accounts::empleado_for_user(db, user.id).await?;
            query.filter(turno::Column::EmpleadoId.eq(empleado.id))
        }
        UserRole::Cliente => {
            let cliente = accounts::cliente_for_user(db, user.id).await?;
            query.filter(turno::Column::ClienteId.eq(cliente.id))
        }
    };
    Ok(query)
}

async fn active_empleado(db: &DatabaseConnection, empleado_id: i32) -> AppResult<empleado::Model> {
    let empleado = empleado::Entity::find_by_id(empleado_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Empleado not found".to_string()))?;
    if !empleado.activo {
        return Err(AppError::BadRequest("Empleado is not active".to_string()));
    }
    Ok(empleado)
}

async fn find_servicio(db: &DatabaseConnection, servicio_id: i32) -> AppResult<servicio::Model> {
    servicio::Entity::find_by_id(servicio_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Servicio not found".to_string()))
}

/// An empleado holds at most one non-cancelled turno per `fecha_hora`.
async fn ensure_slot_free(
    db: &DatabaseConnection,
    empleado_id: i32,
    fecha_hora: DateTimeWithTimeZone,
    except: Option<i32>,
) -> AppResult<()> {
    let mut query = turno::Entity::find()
        .filter(turno::Column::EmpleadoId.eq(empleado_id))
        .filter(turno::Column::FechaHora.eq(fecha_hora))
        .filter(turno::Column::Estado.ne(EstadoTurno::Cancelado));
    if let Some(id) = except {
        query = query.filter(turno::Column::Id.ne(id));
    }

    if query.one(db).await?.is_some() {
        return Err(AppError::Conflict(
            "Empleado already has a turno at that time".to_string(),
        ));
    }
    Ok(())
}

pub async fn create_turno(
    db: &DatabaseConnection,
    signals: &SignalRegistry,
    new: NewTurno,
) -> AppResult<turno::Model> {
    if new.fecha_hora < Utc::now() {
        return Err(AppError::BadRequest("Cannot book a turno in the past".to_string()));
    }

    cliente::Entity::find_by_id(new.cliente_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Cliente not found".to_string()))?;
    active_empleado(db, new.empleado_id).await?;
    let servicio = find_servicio(db, new.servicio_id).await?;
    if !servicio.activo {
        return Err(AppError::BadRequest("Servicio is not offered anymore".to_string()));
    }

    let fecha_hora: DateTimeWithTimeZone = new.fecha_hora.into();
    ensure_slot_free(db, new.empleado_id, fecha_hora, None).await?;

    let notas_cliente = new
        .notas_cliente
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty());

    let turno = turno::ActiveModel {
        cliente_id: Set(new.cliente_id),
        empleado_id: Set(new.empleado_id),
        servicio_id: Set(new.servicio_id),
        fecha_hora: Set(fecha_hora),
        estado: Set(EstadoTurno::Pendiente),
        precio_final: Set(servicio.precio),
        notas_cliente: Set(notas_cliente),
        created_at: Set(Utc::now().into()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    tracing::info!(turno_id = turno.id, empleado_id = turno.empleado_id, "Turno created");
    signals.send(db, &DomainEvent::TurnoCreado(turno.clone())).await;
    Ok(turno)
}

pub async fn change_estado(
    db: &DatabaseConnection,
    signals: &SignalRegistry,
    turno_id: i32,
    next: EstadoTurno,
) -> AppResult<turno::Model> {
    let turno = turno::Entity::find_by_id(turno_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Turno not found".to_string()))?;

    if !turno.estado.can_transition_to(next) {
        return Err(AppError::BadRequest(format!(
            "Cannot change turno from {} to {}",
            turno.estado, next
        )));
    }

    let mut active: turno::ActiveModel = turno.into();
    active.estado = Set(next);
    let turno = active.update(db).await?;

    tracing::info!(turno_id = turno.id, estado = %next, "Turno estado changed");

    let event = match next {
        EstadoTurno::Confirmado => Some(DomainEvent::TurnoConfirmado(turno.clone())),
        EstadoTurno::Completado => Some(DomainEvent::TurnoCompletado(turno.clone())),
        EstadoTurno::Cancelado => Some(DomainEvent::TurnoCancelado(turno.clone())),
        EstadoTurno::Pendiente => None,
    };
    if let Some(event) = event {
        signals.send(db, &event).await;
    }

    Ok(turno)
}

/// Move an open turno to another slot and apply the service's reassignment
/// discount.
pub async fn reassign_turno(
    db: &DatabaseConnection,
    signals: &SignalRegistry,
    turno_id: i32,
    reassignment: Reassignment,
) -> AppResult<turno::Model> {
    let turno = turno::Entity::find_by_id(turno_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Turno not found".to_string()))?;

    if turno.estado.is_terminal() {
        return Err(AppError::BadRequest(format!(
            "Cannot reassign a {} turno",
            turno.estado
        )));
    }

    let nueva_fecha: DateTimeWithTimeZone = reassignment.fecha_hora.into();
    if nueva_fecha == turno.fecha_hora {
        return Err(AppError::BadRequest("Turno is already in that slot".to_string()));
    }
    if reassignment.fecha_hora < Utc::now() {
        return Err(AppError::BadRequest("Cannot move a turno to the past".to_string()));
    }

    let empleado_id = reassignment.empleado_id.unwrap_or(turno.empleado_id);
    if empleado_id != turno.empleado_id {
        active_empleado(db, empleado_id).await?;
    }
    ensure_slot_free(db, empleado_id, nueva_fecha, Some(turno.id)).await?;

    let servicio = find_servicio(db, turno.servicio_id).await?;
    let anterior = turno.fecha_hora;

    let mut active: turno::ActiveModel = turno.into();
    active.fecha_hora = Set(nueva_fecha);
    active.empleado_id = Set(empleado_id);
    active.precio_final = Set(reassignment_price(
        servicio.precio,
        servicio.descuento_reasignacion,
    ));
    let turno = active.update(db).await?;

    tracing::info!(turno_id = turno.id, precio_final = %turno.precio_final, "Turno reassigned");
    signals
        .send(
            db,
            &DomainEvent::TurnoReasignado {
                turno: turno.clone(),
                anterior,
            },
        )
        .await;
    Ok(turno)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{encuesta, notificacion};
    use crate::entities::notificacion::TipoNotificacion;
    use crate::test_support::{salon, Salon};
    use chrono::Duration;
    use sea_orm::PaginatorTrait;

    fn tomorrow_at(hour: u32) -> DateTime<Utc> {
        let day = (Utc::now() + Duration::days(1)).date_naive();
        day.and_hms_opt(hour, 0, 0).unwrap().and_utc()
    }

    fn new_turno(s: &Salon, hour: u32) -> NewTurno {
        NewTurno {
            cliente_id: s.cliente.id,
            empleado_id: s.empleado.id,
            servicio_id: s.servicio.id,
            fecha_hora: tomorrow_at(hour),
            notas_cliente: Some("  pelo largo ".to_string()),
        }
    }

    #[test]
    fn test_reassignment_price() {
        assert_eq!(
            reassignment_price(Decimal::new(1500, 0), Decimal::new(200, 0)),
            Decimal::new(1300, 0)
        );
        assert_eq!(
            reassignment_price(Decimal::new(1500, 0), Decimal::new(2000, 0)),
            Decimal::ZERO
        );
        assert_eq!(
            reassignment_price(Decimal::new(1500, 0), Decimal::new(-50, 0)),
            Decimal::new(1500, 0)
        );
    }

    #[tokio::test]
    async fn test_create_sets_base_price_and_notifies() {
        let s = salon().await;
        let turno = create_turno(&s.db, &s.signals, new_turno(&s, 10)).await.unwrap();

        assert_eq!(turno.estado, EstadoTurno::Pendiente);
        assert_eq!(turno.precio_final, s.servicio.precio);
        assert_eq!(turno.notas_cliente.as_deref(), Some("pelo largo"));

        let para_cliente = notificacion::Entity::find()
            .filter(notificacion::Column::UserId.eq(s.cliente_user.id))
            .filter(notificacion::Column::Tipo.eq(TipoNotificacion::TurnoCreado))
            .count(&s.db)
            .await
            .unwrap();
        let para_empleado = notificacion::Entity::find()
            .filter(notificacion::Column::UserId.eq(s.empleado_user.id))
            .count(&s.db)
            .await
            .unwrap();
        assert_eq!(para_cliente, 1);
        assert_eq!(para_empleado, 1);
    }

    #[tokio::test]
    async fn test_double_booking_conflicts() {
        let s = salon().await;
        create_turno(&s.db, &s.signals, new_turno(&s, 10)).await.unwrap();
        let err = create_turno(&s.db, &s.signals, new_turno(&s, 10))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_cancelled_slot_can_be_booked_again() {
        let s = salon().await;
        let first = create_turno(&s.db, &s.signals, new_turno(&s, 10)).await.unwrap();
        change_estado(&s.db, &s.signals, first.id, EstadoTurno::Cancelado)
            .await
            .unwrap();
        assert!(create_turno(&s.db, &s.signals, new_turno(&s, 10)).await.is_ok());
    }

    #[tokio::test]
    async fn test_past_turno_rejected() {
        let s = salon().await;
        let mut new = new_turno(&s, 10);
        new.fecha_hora = Utc::now() - Duration::hours(1);
        assert!(matches!(
            create_turno(&s.db, &s.signals, new).await,
            Err(AppError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_reassignment_discount_does_not_stack() {
        let s = salon().await;
        let turno = create_turno(&s.db, &s.signals, new_turno(&s, 10)).await.unwrap();

        let moved = reassign_turno(
            &s.db,
            &s.signals,
            turno.id,
            Reassignment { fecha_hora: tomorrow_at(12), empleado_id: None },
        )
        .await
        .unwrap();
        assert_eq!(moved.precio_final, Decimal::new(1300, 0));

        let moved_again = reassign_turno(
            &s.db,
            &s.signals,
            turno.id,
            Reassignment { fecha_hora: tomorrow_at(15), empleado_id: None },
        )
        .await
        .unwrap();
        assert_eq!(moved_again.precio_final, Decimal::new(1300, 0));
    }

    #[tokio::test]
    async fn test_reassign_to_same_slot_rejected() {
        let s = salon().await;
        let turno = create_turno(&s.db, &s.signals, new_turno(&s, 10)).await.unwrap();
        let err = reassign_turno(
            &s.db,
            &s.signals,
            turno.id,
            Reassignment { fecha_hora: tomorrow_at(10), empleado_id: None },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_invalid_transition_rejected() {
        let s = salon().await;
        let turno = create_turno(&s.db, &s.signals, new_turno(&s, 10)).await.unwrap();
        let err = change_estado(&s.db, &s.signals, turno.id, EstadoTurno::Completado)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_completing_creates_one_survey() {
        let s = salon().await;
        let turno = create_turno(&s.db, &s.signals, new_turno(&s, 10)).await.unwrap();
        change_estado(&s.db, &s.signals, turno.id, EstadoTurno::Confirmado)
            .await
            .unwrap();
        let done = change_estado(&s.db, &s.signals, turno.id, EstadoTurno::Completado)
            .await
            .unwrap();

        // Replaying the event must not open a second survey
        s.signals
            .send(&s.db, &DomainEvent::TurnoCompletado(done))
            .await;

        let encuestas = encuesta::Entity::find()
            .filter(encuesta::Column::TurnoId.eq(turno.id))
            .count(&s.db)
            .await
            .unwrap();
        assert_eq!(encuestas, 1);

        let invitaciones = notificacion::Entity::find()
            .filter(notificacion::Column::Tipo.eq(TipoNotificacion::Encuesta))
            .count(&s.db)
            .await
            .unwrap();
        assert_eq!(invitaciones, 1);
    }

    #[tokio::test]
    async fn test_visible_to_cliente_only_own() {
        let s = salon().await;
        create_turno(&s.db, &s.signals, new_turno(&s, 10)).await.unwrap();

        let own = visible_to(&s.db, &s.cliente_user)
            .await
            .unwrap()
            .all(&s.db)
            .await
            .unwrap();
        assert_eq!(own.len(), 1);

        let (_, otro) = crate::services::accounts::register_cliente(
            &s.db,
            crate::services::accounts::NewUser {
                username: "otro".to_string(),
                email: "otro@example.com".to_string(),
                password: "secreto".to_string(),
                role: UserRole::Cliente,
            },
            "Otro Cliente",
            None,
        )
        .await
        .unwrap();
        let otro_user = user::Entity::find_by_id(otro.user_id)
            .one(&s.db)
            .await
            .unwrap()
            .unwrap();
        let ajenos = visible_to(&s.db, &otro_user)
            .await
            .unwrap()
            .all(&s.db)
            .await
            .unwrap();
        assert!(ajenos.is_empty());
    }
}
