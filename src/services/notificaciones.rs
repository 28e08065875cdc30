use chrono::{DateTime, Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    Select, Set,
};
use serde::Deserialize;

use crate::entities::notificacion::{self, TipoNotificacion};
use crate::entities::turno::{self, EstadoTurno};
use crate::entities::{cliente, notificacion_config, servicio};
use crate::error::{AppError, AppResult};

/// Partial update of a user's notification preferences.
#[derive(Debug, Default, Deserialize)]
pub struct ConfigUpdate {
    pub turno_creado: Option<bool>,
    pub turno_confirmado: Option<bool>,
    pub turno_cancelado: Option<bool>,
    pub turno_reasignado: Option<bool>,
    pub recordatorio: Option<bool>,
    pub encuesta: Option<bool>,
}

/// Preferences of `user_id`, created with every type enabled on first access.
pub async fn config_for(
    db: &DatabaseConnection,
    user_id: i32,
) -> AppResult<notificacion_config::Model> {
    let existing = notificacion_config::Entity::find()
        .filter(notificacion_config::Column::UserId.eq(user_id))
        .one(db)
        .await?;
    if let Some(config) = existing {
        return Ok(config);
    }

    let config = notificacion_config::ActiveModel {
        user_id: Set(user_id),
        turno_creado: Set(true),
        turno_confirmado: Set(true),
        turno_cancelado: Set(true),
        turno_reasignado: Set(true),
        recordatorio: Set(true),
        encuesta: Set(true),
        ..Default::default()
    };
    Ok(config.insert(db).await?)
}

pub async fn update_config(
    db: &DatabaseConnection,
    user_id: i32,
    update: ConfigUpdate,
) -> AppResult<notificacion_config::Model> {
    let config = config_for(db, user_id).await?;
    let mut active: notificacion_config::ActiveModel = config.into();

    if let Some(v) = update.turno_creado {
        active.turno_creado = Set(v);
    }
    if let Some(v) = update.turno_confirmado {
        active.turno_confirmado = Set(v);
    }
    if let Some(v) = update.turno_cancelado {
        active.turno_cancelado = Set(v);
    }
    if let Some(v) = update.turno_reasignado {
        active.turno_reasignado = Set(v);
    }
    if let Some(v) = update.recordatorio {
        active.recordatorio = Set(v);
    }
    if let Some(v) = update.encuesta {
        active.encuesta = Set(v);
    }

    Ok(active.update(db).await?)
}

/// Store a notification for `user_id` unless their preferences turn `tipo` off.
///
/// Only signal receivers and the reminder sweep create notifications.
pub(crate) async fn notify(
    db: &DatabaseConnection,
    user_id: i32,
    tipo: TipoNotificacion,
    titulo: &str,
    mensaje: &str,
) -> AppResult<Option<notificacion::Model>> {
    let config = config_for(db, user_id).await?;
    if !config.allows(tipo) {
        tracing::debug!(user_id, %tipo, "Notification disabled by user preferences");
        return Ok(None);
    }

    let notificacion = notificacion::ActiveModel {
        user_id: Set(user_id),
        tipo: Set(tipo),
        titulo: Set(titulo.to_string()),
        mensaje: Set(mensaje.to_string()),
        leida: Set(false),
        leida_at: Set(None),
        created_at: Set(Utc::now().into()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    Ok(Some(notificacion))
}

/// Newest first.
pub fn for_user(user_id: i32) -> Select<notificacion::Entity> {
    notificacion::Entity::find()
        .filter(notificacion::Column::UserId.eq(user_id))
        .order_by_desc(notificacion::Column::CreatedAt)
        .order_by_desc(notificacion::Column::Id)
}

pub async fn mark_read(
    db: &DatabaseConnection,
    user_id: i32,
    notificacion_id: i32,
) -> AppResult<notificacion::Model> {
    let notificacion = notificacion::Entity::find_by_id(notificacion_id)
        .filter(notificacion::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Notificacion not found".to_string()))?;

    if notificacion.leida {
        return Ok(notificacion);
    }

    let mut active: notificacion::ActiveModel = notificacion.into();
    active.leida = Set(true);
    active.leida_at = Set(Some(Utc::now().into()));
    Ok(active.update(db).await?)
}

/// Window of `hours` ahead for [`send_reminders`].
pub fn reminder_window(hours: i64) -> AppResult<Duration> {
    if hours <= 0 {
        return Err(AppError::BadRequest("Reminder window must be positive".to_string()));
    }
    Duration::try_hours(hours)
        .ok_or_else(|| AppError::BadRequest(format!("{} hours is out of range", hours)))
}

/// Remind clients of open turnos starting within `window` after `now`.
/// Each turno is reminded at most once. Returns the number of reminders sent.
pub async fn send_reminders(
    db: &DatabaseConnection,
    now: DateTime<Utc>,
    window: Duration,
) -> AppResult<usize> {
    let hasta = now
        .checked_add_signed(window)
        .ok_or_else(|| AppError::BadRequest("Reminder window is out of range".to_string()))?;
    let desde: sea_orm::prelude::DateTimeWithTimeZone = now.into();
    let hasta: sea_orm::prelude::DateTimeWithTimeZone = hasta.into();

    let turnos = turno::Entity::find()
        .filter(turno::Column::FechaHora.gte(desde))
        .filter(turno::Column::FechaHora.lte(hasta))
        .filter(turno::Column::Estado.is_in([EstadoTurno::Pendiente, EstadoTurno::Confirmado]))
        .find_also_related(servicio::Entity)
        .all(db)
        .await?;

    let mut sent = 0;
    for (turno, servicio) in turnos {
        let Some(cliente) = cliente::Entity::find_by_id(turno.cliente_id).one(db).await? else {
            continue;
        };

        let titulo = format!("Recordatorio de turno #{}", turno.id);
        let already_sent = notificacion::Entity::find()
            .filter(notificacion::Column::UserId.eq(cliente.user_id))
            .filter(notificacion::Column::Tipo.eq(TipoNotificacion::Recordatorio))
            .filter(notificacion::Column::Titulo.eq(titulo.as_str()))
            .one(db)
            .await?
            .is_some();
        if already_sent {
            continue;
        }

        let servicio = servicio
            .map(|s| s.nombre)
            .unwrap_or_else(|| "tu servicio".to_string());
        let mensaje = format!(
            "Te esperamos el {} para {}.",
            turno.fecha_hora.format("%d/%m/%Y %H:%M"),
            servicio
        );

        if notify(db, cliente.user_id, TipoNotificacion::Recordatorio, &titulo, &mensaje)
            .await?
            .is_some()
        {
            sent += 1;
        }
    }

    tracing::info!(sent, "Reminders sent");
    Ok(sent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connect_in_memory;
    use crate::entities::user::UserRole;
    use crate::services::accounts::{create_user, NewUser};
    use crate::services::turnos::{change_estado, create_turno, NewTurno};
    use crate::test_support::{salon, Salon};
    use sea_orm::{DbErr, PaginatorTrait};

    async fn owner(db: &DatabaseConnection) -> i32 {
        create_user(
            db,
            NewUser {
                username: "ana".to_string(),
                email: "ana@example.com".to_string(),
                password: "secreto".to_string(),
                role: UserRole::Cliente,
            },
        )
        .await
        .unwrap()
        .id
    }

    #[tokio::test]
    async fn test_notify_respects_preferences() {
        let db = connect_in_memory().await.unwrap();
        let user_id = owner(&db).await;

        update_config(
            &db,
            user_id,
            ConfigUpdate {
                turno_confirmado: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let skipped = notify(&db, user_id, TipoNotificacion::TurnoConfirmado, "t", "m")
            .await
            .unwrap();
        let stored = notify(&db, user_id, TipoNotificacion::TurnoCreado, "t", "m")
            .await
            .unwrap();

        assert!(skipped.is_none());
        assert!(stored.is_some());
        assert_eq!(for_user(user_id).all(&db).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_mark_read_sets_timestamp() {
        let db = connect_in_memory().await.unwrap();
        let user_id = owner(&db).await;
        let n = notify(&db, user_id, TipoNotificacion::TurnoCreado, "t", "m")
            .await
            .unwrap()
            .unwrap();

        let read = mark_read(&db, user_id, n.id).await.unwrap();
        assert!(read.leida);
        assert!(read.leida_at.is_some());
        assert_eq!(read.titulo, "t");
    }

    #[tokio::test]
    async fn test_mark_read_of_someone_else() {
        let db = connect_in_memory().await.unwrap();
        let user_id = owner(&db).await;
        let n = notify(&db, user_id, TipoNotificacion::TurnoCreado, "t", "m")
            .await
            .unwrap()
            .unwrap();

        assert!(matches!(
            mark_read(&db, user_id + 1, n.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_content_cannot_be_edited() {
        let db = connect_in_memory().await.unwrap();
        let user_id = owner(&db).await;
        let n = notify(&db, user_id, TipoNotificacion::TurnoCreado, "t", "m")
            .await
            .unwrap()
            .unwrap();

        let mut active: notificacion::ActiveModel = n.into();
        active.mensaje = Set("otro mensaje".to_string());
        let err = active.update(&db).await.unwrap_err();
        assert!(matches!(err, DbErr::Custom(_)));
    }

    async fn turno_in(s: &Salon, hours: i64) -> turno::Model {
        create_turno(
            &s.db,
            &s.signals,
            NewTurno {
                cliente_id: s.cliente.id,
                empleado_id: s.empleado.id,
                servicio_id: s.servicio.id,
                fecha_hora: Utc::now() + Duration::hours(hours),
                notas_cliente: None,
            },
        )
        .await
        .unwrap()
    }

    async fn reminders_for(s: &Salon) -> u64 {
        for_user(s.cliente_user.id)
            .filter(notificacion::Column::Tipo.eq(TipoNotificacion::Recordatorio))
            .count(&s.db)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_reminders_only_inside_window_and_once() {
        let s = salon().await;
        let soon = turno_in(&s, 3).await;
        turno_in(&s, 48).await;

        let sent = send_reminders(&s.db, Utc::now(), Duration::hours(24)).await.unwrap();
        assert_eq!(sent, 1);
        let again = send_reminders(&s.db, Utc::now(), Duration::hours(24)).await.unwrap();
        assert_eq!(again, 0);

        let reminders = for_user(s.cliente_user.id)
            .filter(notificacion::Column::Tipo.eq(TipoNotificacion::Recordatorio))
            .all(&s.db)
            .await
            .unwrap();
        assert_eq!(reminders.len(), 1);
        assert_eq!(reminders[0].titulo, format!("Recordatorio de turno #{}", soon.id));
        assert!(reminders[0].mensaje.contains("Corte"));
    }

    #[tokio::test]
    async fn test_reminders_skip_closed_turnos() {
        let s = salon().await;
        let cancelado = turno_in(&s, 2).await;
        change_estado(&s.db, &s.signals, cancelado.id, EstadoTurno::Cancelado)
            .await
            .unwrap();
        let completado = turno_in(&s, 4).await;
        change_estado(&s.db, &s.signals, completado.id, EstadoTurno::Confirmado)
            .await
            .unwrap();
        change_estado(&s.db, &s.signals, completado.id, EstadoTurno::Completado)
            .await
            .unwrap();

        let sent = send_reminders(&s.db, Utc::now(), Duration::hours(24)).await.unwrap();
        assert_eq!(sent, 0);
        assert_eq!(reminders_for(&s).await, 0);
    }

    #[tokio::test]
    async fn test_reminders_respect_preference() {
        let s = salon().await;
        update_config(
            &s.db,
            s.cliente_user.id,
            ConfigUpdate {
                recordatorio: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        turno_in(&s, 3).await;

        let sent = send_reminders(&s.db, Utc::now(), Duration::hours(24)).await.unwrap();
        assert_eq!(sent, 0);
        assert_eq!(reminders_for(&s).await, 0);
    }

    #[tokio::test]
    async fn test_reminder_window_out_of_range() {
        assert_eq!(reminder_window(24).unwrap(), Duration::hours(24));
        assert!(matches!(reminder_window(0), Err(AppError::BadRequest(_))));
        assert!(matches!(reminder_window(i64::MAX), Err(AppError::BadRequest(_))));

        let s = salon().await;
        let huge = Duration::try_days(i64::MAX / 86_400_000).unwrap();
        assert!(matches!(
            send_reminders(&s.db, Utc::now(), huge).await,
            Err(AppError::BadRequest(_))
        ));
    }
}
