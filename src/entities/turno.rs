use std::fmt;
use std::str::FromStr;

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "lowercase")]
pub enum EstadoTurno {
    #[sea_orm(string_value = "pendiente")]
    Pendiente,
    #[sea_orm(string_value = "confirmado")]
    Confirmado,
    #[sea_orm(string_value = "completado")]
    Completado,
    #[sea_orm(string_value = "cancelado")]
    Cancelado,
}

impl EstadoTurno {
    pub fn as_str(&self) -> &'static str {
        match self {
            EstadoTurno::Pendiente => "pendiente",
            EstadoTurno::Confirmado => "confirmado",
            EstadoTurno::Completado => "completado",
            EstadoTurno::Cancelado => "cancelado",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, EstadoTurno::Completado | EstadoTurno::Cancelado)
    }

    /// pendiente -> confirmado | cancelado, confirmado -> completado | cancelado.
    pub fn can_transition_to(&self, next: EstadoTurno) -> bool {
        matches!(
            (self, next),
            (EstadoTurno::Pendiente, EstadoTurno::Confirmado)
                | (EstadoTurno::Pendiente, EstadoTurno::Cancelado)
                | (EstadoTurno::Confirmado, EstadoTurno::Completado)
                | (EstadoTurno::Confirmado, EstadoTurno::Cancelado)
        )
    }
}

impl fmt::Display for EstadoTurno {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EstadoTurno {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pendiente" => Ok(EstadoTurno::Pendiente),
            "confirmado" => Ok(EstadoTurno::Confirmado),
            "completado" => Ok(EstadoTurno::Completado),
            "cancelado" => Ok(EstadoTurno::Cancelado),
            other => Err(format!("unknown estado '{}'", other)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "turnos_turno")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub cliente_id: i32,
    pub empleado_id: i32,
    pub servicio_id: i32,
    pub fecha_hora: DateTimeWithTimeZone,
    pub estado: EstadoTurno,
    pub precio_final: Decimal,
    pub notas_cliente: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::cliente::Entity",
        from = "Column::ClienteId",
        to = "super::cliente::Column::Id"
    )]
    Cliente,
    #[sea_orm(
        belongs_to = "super::empleado::Entity",
        from = "Column::EmpleadoId",
        to = "super::empleado::Column::Id"
    )]
    Empleado,
    #[sea_orm(
        belongs_to = "super::servicio::Entity",
        from = "Column::ServicioId",
        to = "super::servicio::Column::Id"
    )]
    Servicio,
    #[sea_orm(has_one = "super::encuesta::Entity")]
    Encuesta,
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

impl Related<super::servicio::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Servicio.def()
    }
}

impl Related<super::encuesta::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Encuesta.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_transitions() {
        assert!(EstadoTurno::Pendiente.can_transition_to(EstadoTurno::Confirmado));
        assert!(EstadoTurno::Pendiente.can_transition_to(EstadoTurno::Cancelado));
        assert!(EstadoTurno::Confirmado.can_transition_to(EstadoTurno::Completado));
        assert!(EstadoTurno::Confirmado.can_transition_to(EstadoTurno::Cancelado));
    }

    #[test]
    fn test_terminal_states_are_final() {
        for next in [
            EstadoTurno::Pendiente,
            EstadoTurno::Confirmado,
            EstadoTurno::Completado,
            EstadoTurno::Cancelado,
        ] {
            assert!(!EstadoTurno::Completado.can_transition_to(next));
            assert!(!EstadoTurno::Cancelado.can_transition_to(next));
        }
        // A pending turno has to be confirmed before it can be completed
        assert!(!EstadoTurno::Pendiente.can_transition_to(EstadoTurno::Completado));
    }
}
