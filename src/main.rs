use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;

use axum::Router;
use sea_orm_migration::MigratorTrait;
use tokio::net::TcpListener;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use salon_backend::{config::Config, db, routes, services::accounts, AppResult, AppState};

/// Per client IP: bursts of this many requests.
const RATE_LIMIT_BURST: u32 = 100;
/// Seconds to replenish one request of the burst.
const RATE_LIMIT_REFILL_SECS: u64 = 1;

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let config = Config::from_env();
    let state = match open_salon(config.clone()).await {
        Ok(state) => state,
        Err(e) => {
            tracing::error!(error = %e, "Startup failed");
            return ExitCode::FAILURE;
        }
    };

    let app = with_http_layers(routes::create_router(state));

    match serve(app, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Server stopped");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "salon_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Connect, migrate, make sure the owner account exists and connect the
/// signal receivers.
async fn open_salon(config: Config) -> AppResult<AppState> {
    let db = db::connect(&config).await?;
    tracing::info!(url = %config.database_url, "Connected to database");

    migration::Migrator::up(&db, None).await?;
    tracing::info!("Migrations complete");

    accounts::seed_propietario(&db, &config.propietario_email, &config.propietario_password)
        .await?;

    Ok(AppState::new(db, config))
}

/// Request tracing, permissive CORS and the per-IP rate limiter.
fn with_http_layers(router: Router) -> Router {
    let governor_config = GovernorConfigBuilder::default()
        .per_second(RATE_LIMIT_REFILL_SECS)
        .burst_size(RATE_LIMIT_BURST)
        .finish();

    let router = router
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any));

    match governor_config {
        Some(config) => router.layer(GovernorLayer::new(Arc::new(config))),
        None => {
            tracing::warn!("Invalid rate limit settings, serving without a limiter");
            router
        }
    }
}

async fn serve(app: Router, config: &Config) -> std::io::Result<()> {
    let addr: SocketAddr = config
        .server_addr()
        .parse()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Salon API listening on {}", addr);

    // The limiter keys on the peer address
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
}
