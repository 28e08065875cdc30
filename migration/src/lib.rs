pub use sea_orm_migration::prelude::*;

mod m0001_users_initial;
mod m0002_authtoken_initial;
mod m0003_servicios_initial;
mod m0004_clientes_initial;
mod m0005_empleados_initial;
mod m0006_turnos_initial;
mod m0007_emails_initial;
mod m0008_servicio_descuento_reasignacion;
mod m0009_encuestas_initial;

/// Separator between the app label and the migration name in a version string.
pub const APP_SEPARATOR: &str = "::";

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m0001_users_initial::Migration),
            Box::new(m0002_authtoken_initial::Migration),
            Box::new(m0003_servicios_initial::Migration),
            Box::new(m0004_clientes_initial::Migration),
            Box::new(m0005_empleados_initial::Migration),
            Box::new(m0006_turnos_initial::Migration),
            Box::new(m0007_emails_initial::Migration),
            Box::new(m0008_servicio_descuento_reasignacion::Migration),
            Box::new(m0009_encuestas_initial::Migration),
        ]
    }
}

/// Tables created by each initial migration. A pending initial migration can
/// be marked applied without running it when all of its tables already exist.
pub fn initial_tables(version: &str) -> &'static [&'static str] {
    match version {
        "users::m0001_initial" => &["users_user"],
        "authtoken::m0001_initial" => &["authtoken_token"],
        "servicios::m0001_initial" => &["servicios_categoriaservicio", "servicios_servicio"],
        "clientes::m0001_initial" => &["clientes_cliente"],
        "empleados::m0001_initial" => &["empleados_empleado"],
        "turnos::m0001_initial" => &["turnos_turno"],
        "emails::m0001_initial" => &["emails_notificacionconfig", "emails_notificacion"],
        "encuestas::m0001_initial" => &["encuestas_encuesta"],
        _ => &[],
    }
}

/// App label of a migration version (`"emails::m0001_initial"` -> `"emails"`).
pub fn app_label(version: &str) -> &str {
    version
        .split_once(APP_SEPARATOR)
        .map(|(app, _)| app)
        .unwrap_or(version)
}
