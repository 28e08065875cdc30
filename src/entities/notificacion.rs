use std::fmt;

use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(30))")]
#[serde(rename_all = "snake_case")]
pub enum TipoNotificacion {
    #[sea_orm(string_value = "turno_creado")]
    TurnoCreado,
    #[sea_orm(string_value = "turno_confirmado")]
    TurnoConfirmado,
    #[sea_orm(string_value = "turno_cancelado")]
    TurnoCancelado,
    #[sea_orm(string_value = "turno_reasignado")]
    TurnoReasignado,
    #[sea_orm(string_value = "recordatorio")]
    Recordatorio,
    #[sea_orm(string_value = "encuesta")]
    Encuesta,
}

impl fmt::Display for TipoNotificacion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TipoNotificacion::TurnoCreado => "turno_creado",
            TipoNotificacion::TurnoConfirmado => "turno_confirmado",
            TipoNotificacion::TurnoCancelado => "turno_cancelado",
            TipoNotificacion::TurnoReasignado => "turno_reasignado",
            TipoNotificacion::Recordatorio => "recordatorio",
            TipoNotificacion::Encuesta => "encuesta",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "emails_notificacion")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub tipo: TipoNotificacion,
    pub titulo: String,
    pub mensaje: String,
    pub leida: bool,
    pub leida_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

/// Notifications are written once by the signal receivers. Afterwards only the
/// read flag may change.
#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        if !insert && touches_content(&self) {
            return Err(DbErr::Custom(
                "notificaciones are immutable once created".to_string(),
            ));
        }
        Ok(self)
    }
}

fn touches_content(model: &ActiveModel) -> bool {
    matches!(model.user_id, ActiveValue::Set(_))
        || matches!(model.tipo, ActiveValue::Set(_))
        || matches!(model.titulo, ActiveValue::Set(_))
        || matches!(model.mensaje, ActiveValue::Set(_))
        || matches!(model.created_at, ActiveValue::Set(_))
}
