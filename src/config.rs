use std::env;

/// Used when `DATABASE_URL` is not set, so the admin commands work from a
/// checkout with only the database file next to them.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://db.sqlite3?mode=rwc";

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub page_size: u64,
    pub propietario_email: String,
    pub propietario_password: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            server_host: env::var("SERVER_HOST")
                .unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()
                .expect("SERVER_PORT must be a number"),
            page_size: env::var("PAGE_SIZE")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .expect("PAGE_SIZE must be a number"),
            propietario_email: env::var("PROPIETARIO_EMAIL")
                .unwrap_or_else(|_| "propietario@salon.local".to_string()),
            propietario_password: env::var("PROPIETARIO_PASSWORD")
                .unwrap_or_else(|_| "propietario123".to_string()),
        }
    }

    /// Configuration for tests and tools that bring their own database URL.
    pub fn with_database_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            server_host: "127.0.0.1".to_string(),
            server_port: 0,
            page_size: 10,
            propietario_email: "propietario@salon.local".to_string(),
            propietario_password: "propietario123".to_string(),
        }
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}
