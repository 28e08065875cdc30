use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "encuestas_encuesta")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub turno_id: i32,
    pub cliente_id: i32,
    pub puntuacion: Option<i32>,
    pub comentario: Option<String>,
    pub respondida_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::turno::Entity",
        from = "Column::TurnoId",
        to = "super::turno::Column::Id"
    )]
    Turno,
    #[sea_orm(
        belongs_to = "super::cliente::Entity",
        from = "Column::ClienteId",
        to = "super::cliente::Column::Id"
    )]
    Cliente,
}

impl Related<super::turno::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Turno.def()
    }
}

impl Related<super::cliente::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cliente.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
