//! Shared fixtures for unit tests.

use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};

use crate::db::connect_in_memory;
use crate::entities::empleado::{self, Especialidad};
use crate::entities::user::{self, UserRole};
use crate::entities::{categoria_servicio, cliente, servicio};
use crate::services::accounts::{register_cliente, register_empleado, NewUser};
use crate::signals::SignalRegistry;

pub struct Salon {
    pub db: DatabaseConnection,
    pub signals: SignalRegistry,
    pub categoria: categoria_servicio::Model,
    pub servicio: servicio::Model,
    pub cliente_user: user::Model,
    pub cliente: cliente::Model,
    pub empleado_user: user::Model,
    pub empleado: empleado::Model,
}

pub fn new_user(username: &str) -> NewUser {
    NewUser {
        username: username.to_string(),
        email: format!("{}@example.com", username),
        password: "secreto".to_string(),
        role: UserRole::Cliente,
    }
}

/// One category, one service (1500 with a 200 reassignment discount),
/// one client and one hairdresser.
pub async fn salon() -> Salon {
    let db = connect_in_memory().await.unwrap();

    let categoria = categoria_servicio::ActiveModel {
        nombre: Set("Peluquería".to_string()),
        descripcion: Set(None),
        ..Default::default()
    }
    .insert(&db)
    .await
    .unwrap();

    let servicio = servicio::ActiveModel {
        nombre: Set("Corte".to_string()),
        precio: Set(Decimal::new(1500, 0)),
        duracion_minutos: Set(45),
        activo: Set(true),
        categoria_id: Set(categoria.id),
        descuento_reasignacion: Set(Decimal::new(200, 0)),
        ..Default::default()
    }
    .insert(&db)
    .await
    .unwrap();

    let (cliente_user, cliente) = register_cliente(&db, new_user("lucia"), "Lucía Pérez", None)
        .await
        .unwrap();
    let (empleado_user, empleado) =
        register_empleado(&db, new_user("marta"), Especialidad::Peluqueria)
            .await
            .unwrap();

    Salon {
        db,
        signals: SignalRegistry::with_default_receivers(),
        categoria,
        servicio,
        cliente_user,
        cliente,
        empleado_user,
        empleado,
    }
}
