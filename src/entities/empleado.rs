use std::str::FromStr;

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(30))")]
#[serde(rename_all = "lowercase")]
pub enum Especialidad {
    #[sea_orm(string_value = "peluqueria")]
    Peluqueria,
    #[sea_orm(string_value = "manicuria")]
    Manicuria,
    #[sea_orm(string_value = "estetica")]
    Estetica,
    #[sea_orm(string_value = "masajes")]
    Masajes,
    #[sea_orm(string_value = "maquillaje")]
    Maquillaje,
}

impl Especialidad {
    pub fn as_str(&self) -> &'static str {
        match self {
            Especialidad::Peluqueria => "peluqueria",
            Especialidad::Manicuria => "manicuria",
            Especialidad::Estetica => "estetica",
            Especialidad::Masajes => "masajes",
            Especialidad::Maquillaje => "maquillaje",
        }
    }
}

impl FromStr for Especialidad {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "peluqueria" => Ok(Especialidad::Peluqueria),
            "manicuria" => Ok(Especialidad::Manicuria),
            "estetica" => Ok(Especialidad::Estetica),
            "masajes" => Ok(Especialidad::Masajes),
            "maquillaje" => Ok(Especialidad::Maquillaje),
            other => Err(format!("unknown especialidad '{}'", other)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "empleados_empleado")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub user_id: i32,
    pub especialidad: Especialidad,
    pub activo: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    #[sea_orm(has_many = "super::turno::Entity")]
    Turnos,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::turno::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Turnos.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
