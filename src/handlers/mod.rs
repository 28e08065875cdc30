pub mod auth;
pub mod catalogo;
pub mod clientes;
pub mod encuestas;
pub mod notificaciones;
pub mod turnos;
