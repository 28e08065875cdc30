//! Operations shared by the HTTP handlers and the admin CLI.

pub mod accounts;
pub mod encuestas;
pub mod migraciones;
pub mod notificaciones;
pub mod probe;
pub mod reports;
pub mod tokens;
pub mod turnos;
