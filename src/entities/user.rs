use std::fmt;
use std::str::FromStr;

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[sea_orm(string_value = "propietario")]
    Propietario,
    #[sea_orm(string_value = "empleado")]
    Empleado,
    #[sea_orm(string_value = "cliente")]
    Cliente,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Propietario => "propietario",
            UserRole::Empleado => "empleado",
            UserRole::Cliente => "cliente",
        }
    }

    /// Propietarios and empleados can see every client of the salon.
    pub fn is_staff(&self) -> bool {
        matches!(self, UserRole::Propietario | UserRole::Empleado)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "propietario" => Ok(UserRole::Propietario),
            "empleado" => Ok(UserRole::Empleado),
            "cliente" => Ok(UserRole::Cliente),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users_user")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub username: String,
    #[sea_orm(unique)]
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub role: UserRole,
    pub is_active: bool,
    pub date_joined: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::token::Entity")]
    Token,
    #[sea_orm(has_one = "super::cliente::Entity")]
    Cliente,
    #[sea_orm(has_one = "super::empleado::Entity")]
    Empleado,
    #[sea_orm(has_many = "super::notificacion::Entity")]
    Notificaciones,
}

impl Related<super::token::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Token.def()
    }
}

impl Related<super::cliente::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cliente.def()
    }
}

impl Related<super::empleado::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Empleado.def()
    }
}

impl Related<super::notificacion::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Notificaciones.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse_is_case_insensitive() {
        assert_eq!("Propietario".parse::<UserRole>(), Ok(UserRole::Propietario));
        assert_eq!(" cliente ".parse::<UserRole>(), Ok(UserRole::Cliente));
        assert!("admin".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_staff_roles() {
        assert!(UserRole::Propietario.is_staff());
        assert!(UserRole::Empleado.is_staff());
        assert!(!UserRole::Cliente.is_staff());
    }
}
