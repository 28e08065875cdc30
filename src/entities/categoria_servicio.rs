use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "servicios_categoriaservicio")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub nombre: String,
    pub descripcion: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::servicio::Entity")]
    Servicios,
}

impl Related<super::servicio::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Servicios.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
