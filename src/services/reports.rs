//! Read-only listings for operators.

use std::collections::HashMap;

use rust_decimal::Decimal;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
};
use serde::Serialize;

use crate::entities::empleado::Especialidad;
use crate::entities::turno::{self, EstadoTurno};
use crate::entities::user::{self, UserRole};
use crate::entities::{categoria_servicio, cliente, empleado, servicio};
use crate::error::AppResult;

pub const SIN_CLIENTE: &str = "SIN CLIENTE";
pub const SIN_EMPLEADO: &str = "SIN EMPLEADO";
pub const SIN_SERVICIO: &str = "SIN SERVICIO";

/// Notes up to this many characters are reported as suspiciously short.
pub const SHORT_NOTE_MAX_LEN: usize = 3;

#[derive(Debug, Clone, Serialize)]
pub struct TurnoRow {
    pub id: i32,
    pub fecha_hora: DateTimeWithTimeZone,
    pub estado: EstadoTurno,
    pub cliente: String,
    pub empleado: String,
    pub servicio: String,
    pub precio_final: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmpleadoRow {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub especialidad: Especialidad,
    pub activo: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoriaRow {
    pub id: i32,
    pub nombre: String,
    pub servicios: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotaRow {
    pub turno_id: i32,
    pub notas: String,
    pub largo: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct NotasReport {
    /// Every turno with a non-empty note.
    pub con_notas: Vec<NotaRow>,
    /// The subset of `con_notas` whose note is at most `max_len` characters.
    pub cortas: Vec<NotaRow>,
}

/// Label every turno with the names it points to. References that do not
/// resolve get a placeholder instead of failing the listing.
pub fn label_turnos(
    turnos: Vec<turno::Model>,
    clientes: &HashMap<i32, String>,
    empleados: &HashMap<i32, String>,
    servicios: &HashMap<i32, String>,
) -> Vec<TurnoRow> {
    let label = |map: &HashMap<i32, String>, id: i32, missing: &str| {
        map.get(&id).cloned().unwrap_or_else(|| missing.to_string())
    };

    turnos
        .into_iter()
        .map(|t| TurnoRow {
            id: t.id,
            fecha_hora: t.fecha_hora,
            estado: t.estado,
            cliente: label(clientes, t.cliente_id, SIN_CLIENTE),
            empleado: label(empleados, t.empleado_id, SIN_EMPLEADO),
            servicio: label(servicios, t.servicio_id, SIN_SERVICIO),
            precio_final: t.precio_final,
        })
        .collect()
}

pub async fn turnos(db: &DatabaseConnection) -> AppResult<Vec<TurnoRow>> {
    let turnos = turno::Entity::find()
        .order_by_asc(turno::Column::FechaHora)
        .all(db)
        .await?;

    let clientes: HashMap<i32, String> = cliente::Entity::find()
        .all(db)
        .await?
        .into_iter()
        .map(|c| (c.id, c.nombre_completo))
        .collect();
    let empleados: HashMap<i32, String> = empleado::Entity::find()
        .find_also_related(user::Entity)
        .all(db)
        .await?
        .into_iter()
        .filter_map(|(e, u)| u.map(|u| (e.id, u.username)))
        .collect();
    let servicios: HashMap<i32, String> = servicio::Entity::find()
        .all(db)
        .await?
        .into_iter()
        .map(|s| (s.id, s.nombre))
        .collect();

    Ok(label_turnos(turnos, &clientes, &empleados, &servicios))
}

pub async fn empleados(db: &DatabaseConnection) -> AppResult<Vec<EmpleadoRow>> {
    let rows = empleado::Entity::find()
        .find_also_related(user::Entity)
        .order_by_asc(empleado::Column::Id)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(e, u)| EmpleadoRow {
            id: e.id,
            username: u.as_ref().map(|u| u.username.clone()).unwrap_or_default(),
            email: u.map(|u| u.email).unwrap_or_default(),
            especialidad: e.especialidad,
            activo: e.activo,
        })
        .collect())
}

pub async fn propietarios(db: &DatabaseConnection) -> AppResult<Vec<user::Model>> {
    Ok(user::Entity::find()
        .filter(user::Column::Role.eq(UserRole::Propietario))
        .order_by_asc(user::Column::Id)
        .all(db)
        .await?)
}

pub async fn categorias(db: &DatabaseConnection) -> AppResult<Vec<CategoriaRow>> {
    let categorias = categoria_servicio::Entity::find()
        .order_by_asc(categoria_servicio::Column::Nombre)
        .all(db)
        .await?;

    let mut rows = Vec::with_capacity(categorias.len());
    for c in categorias {
        let servicios = servicio::Entity::find()
            .filter(servicio::Column::CategoriaId.eq(c.id))
            .count(db)
            .await?;
        rows.push(CategoriaRow {
            id: c.id,
            nombre: c.nombre,
            servicios,
        });
    }
    Ok(rows)
}

/// Split `(turno_id, notas)` pairs into non-empty notes and short notes.
pub fn split_notes<I>(rows: I, max_len: usize) -> NotasReport
where
    I: IntoIterator<Item = (i32, Option<String>)>,
{
    let mut report = NotasReport::default();
    for (turno_id, notas) in rows {
        let Some(notas) = notas.filter(|n| !n.is_empty()) else {
            continue;
        };
        let row = NotaRow {
            turno_id,
            largo: notas.chars().count(),
            notas,
        };
        if row.largo <= max_len {
            report.cortas.push(row.clone());
        }
        report.con_notas.push(row);
    }
    report
}

pub async fn notas(db: &DatabaseConnection, max_len: usize) -> AppResult<NotasReport> {
    let turnos = turno::Entity::find()
        .filter(turno::Column::NotasCliente.is_not_null())
        .order_by_asc(turno::Column::Id)
        .all(db)
        .await?;

    Ok(split_notes(
        turnos.into_iter().map(|t| (t.id, t.notas_cliente)),
        max_len,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::salon;

    fn turno(id: i32, cliente_id: i32, empleado_id: i32) -> turno::Model {
        let now: DateTimeWithTimeZone = chrono::Utc::now().into();
        turno::Model {
            id,
            cliente_id,
            empleado_id,
            servicio_id: 1,
            fecha_hora: now,
            estado: EstadoTurno::Pendiente,
            precio_final: Decimal::new(1000, 0),
            notas_cliente: None,
            created_at: now,
        }
    }

    #[test]
    fn test_label_turnos_uses_placeholders() {
        let clientes = HashMap::from([(1, "Lucía".to_string())]);
        let empleados = HashMap::from([(1, "marta".to_string())]);
        let servicios = HashMap::from([(1, "Corte".to_string())]);

        let rows = label_turnos(
            vec![turno(1, 1, 1), turno(2, 9, 9)],
            &clientes,
            &empleados,
            &servicios,
        );

        assert_eq!(rows[0].cliente, "Lucía");
        assert_eq!(rows[0].empleado, "marta");
        assert_eq!(rows[1].cliente, SIN_CLIENTE);
        assert_eq!(rows[1].empleado, SIN_EMPLEADO);
        assert_eq!(rows[1].servicio, "Corte");
    }

    #[test]
    fn test_short_notes_are_subset() {
        let report = split_notes(
            vec![
                (1, None),
                (2, Some(String::new())),
                (3, Some("ok".to_string())),
                (4, Some("ñññ".to_string())),
                (5, Some("tengo alergia".to_string())),
            ],
            SHORT_NOTE_MAX_LEN,
        );

        let con: Vec<i32> = report.con_notas.iter().map(|n| n.turno_id).collect();
        let cortas: Vec<i32> = report.cortas.iter().map(|n| n.turno_id).collect();
        assert_eq!(con, vec![3, 4, 5]);
        assert_eq!(cortas, vec![3, 4]);
        assert!(report.cortas.iter().all(|c| report.con_notas.contains(c)));
    }

    #[tokio::test]
    async fn test_listings_against_database() {
        let s = salon().await;

        let empleados = empleados(&s.db).await.unwrap();
        assert_eq!(empleados.len(), 1);
        assert_eq!(empleados[0].username, "marta");

        let categorias = categorias(&s.db).await.unwrap();
        assert_eq!(categorias[0].servicios, 1);

        assert!(propietarios(&s.db).await.unwrap().is_empty());
        assert!(turnos(&s.db).await.unwrap().is_empty());
    }
}
