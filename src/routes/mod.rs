use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::handlers::{auth, catalogo, clientes, encuestas, notificaciones, turnos};
use crate::middleware::auth::{auth_middleware, require_staff};
use crate::AppState;

pub fn create_router(state: AppState) -> Router {
    // Public routes
    let auth_routes = Router::new().route("/api/auth/login", post(auth::login));

    let catalogo_routes = Router::new()
        .route("/api/servicios", get(catalogo::list_servicios))
        .route("/api/categorias", get(catalogo::list_categorias));

    // Staff routes (requires auth + propietario/empleado role)
    let staff_routes = Router::new()
        .route("/api/clientes", get(clientes::list_clientes))
        .layer(middleware::from_fn(require_staff))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Any authenticated user; handlers scope results to the caller's role
    let user_routes = Router::new()
        .route("/api/auth/me", get(auth::me))
        // Turnos
        .route("/api/turnos", get(turnos::list_turnos).post(turnos::create_turno))
        .route("/api/turnos/{id}/estado", put(turnos::update_estado))
        .route("/api/turnos/{id}/reasignar", put(turnos::reassign_turno))
        // Notificaciones
        .route("/api/notificaciones", get(notificaciones::list_notificaciones))
        .route(
            "/api/notificaciones/config",
            get(notificaciones::get_config).put(notificaciones::update_config),
        )
        .route("/api/notificaciones/{id}/leida", put(notificaciones::mark_read))
        // Encuestas
        .route("/api/encuestas", get(encuestas::list_encuestas))
        .route("/api/encuestas/{id}/responder", put(encuestas::responder))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(auth_routes)
        .merge(catalogo_routes)
        .merge(staff_routes)
        .merge(user_routes)
        .with_state(state)
}
