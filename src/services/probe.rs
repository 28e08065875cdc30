//! Smoke test of a running server from the outside.

use serde::Deserialize;
use serde_json::json;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone)]
pub struct ProbeReport {
    pub login_status: u16,
    pub token: Option<String>,
    pub clientes_status: Option<u16>,
    pub clientes_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct LoginBody {
    token: String,
}

#[derive(Debug, Deserialize)]
struct PageBody {
    count: u64,
}

/// Log in with `login`/`password`, then list clients with the returned token.
/// A failed login stops the probe before the listing.
pub async fn probe_api(base_url: &str, login: &str, password: &str) -> AppResult<ProbeReport> {
    let base_url = base_url.trim_end_matches('/');
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/auth/login", base_url))
        .json(&json!({ "login": login, "password": password }))
        .send()
        .await
        .map_err(|e| AppError::Internal(format!("Login request failed: {}", e)))?;

    let login_status = response.status();
    tracing::debug!(status = %login_status, "Login response");

    if !login_status.is_success() {
        return Ok(ProbeReport {
            login_status: login_status.as_u16(),
            token: None,
            clientes_status: None,
            clientes_count: None,
        });
    }

    let body: LoginBody = response
        .json()
        .await
        .map_err(|e| AppError::Internal(format!("Unexpected login response: {}", e)))?;

    let response = client
        .get(format!("{}/api/clientes", base_url))
        .bearer_auth(&body.token)
        .send()
        .await
        .map_err(|e| AppError::Internal(format!("Clientes request failed: {}", e)))?;

    let clientes_status = response.status();
    let clientes_count = if clientes_status.is_success() {
        let page: PageBody = response
            .json()
            .await
            .map_err(|e| AppError::Internal(format!("Unexpected clientes response: {}", e)))?;
        Some(page.count)
    } else {
        None
    };

    Ok(ProbeReport {
        login_status: login_status.as_u16(),
        token: Some(body.token),
        clientes_status: Some(clientes_status.as_u16()),
        clientes_count,
    })
}
