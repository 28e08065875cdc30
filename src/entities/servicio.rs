use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "servicios_servicio")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub nombre: String,
    pub precio: Decimal,
    pub duracion_minutos: i32,
    pub activo: bool,
    pub categoria_id: i32,
    /// Fixed amount taken off `precio` when a turno is moved to another slot.
    pub descuento_reasignacion: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::categoria_servicio::Entity",
        from = "Column::CategoriaId",
        to = "super::categoria_servicio::Column::Id"
    )]
    Categoria,
    #[sea_orm(has_many = "super::turno::Entity")]
    Turnos,
}

impl Related<super::categoria_servicio::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Categoria.def()
    }
}

impl Related<super::turno::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Turnos.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
