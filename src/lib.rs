pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod pagination;
pub mod routes;
pub mod services;
pub mod signals;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use sea_orm::DatabaseConnection;

pub use config::Config;
pub use error::{AppError, AppResult};

use signals::SignalRegistry;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Config,
    pub signals: Arc<SignalRegistry>,
}

impl AppState {
    /// State with the notification and survey receivers connected.
    pub fn new(db: DatabaseConnection, config: Config) -> Self {
        Self {
            db,
            config,
            signals: Arc::new(SignalRegistry::with_default_receivers()),
        }
    }
}
