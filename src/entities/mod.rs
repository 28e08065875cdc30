pub mod categoria_servicio;
pub mod cliente;
pub mod empleado;
pub mod encuesta;
pub mod notificacion;
pub mod notificacion_config;
pub mod servicio;
pub mod token;
pub mod turno;
pub mod user;
