use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::notificacion::TipoNotificacion;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "emails_notificacionconfig")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub user_id: i32,
    pub turno_creado: bool,
    pub turno_confirmado: bool,
    pub turno_cancelado: bool,
    pub turno_reasignado: bool,
    pub recordatorio: bool,
    pub encuesta: bool,
}

impl Model {
    /// Whether the user wants notifications of this type.
    pub fn allows(&self, tipo: TipoNotificacion) -> bool {
        match tipo {
            TipoNotificacion::TurnoCreado => self.turno_creado,
            TipoNotificacion::TurnoConfirmado => self.turno_confirmado,
            TipoNotificacion::TurnoCancelado => self.turno_cancelado,
            TipoNotificacion::TurnoReasignado => self.turno_reasignado,
            TipoNotificacion::Recordatorio => self.recordatorio,
            TipoNotificacion::Encuesta => self.encuesta,
        }
    }
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

impl ActiveModelBehavior for ActiveModel {}
