//! `admin-backend` entry point: serves the dashboard collections over HTTP.

mod server;

use actix_web::web;
use admin_backend::inbound::http::health::HealthState;
use color_eyre::eyre::{Result, WrapErr};
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use server::{ServerConfig, ServerSettings, create_server};

#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ServerSettings::load_from_env()?;
    let config = ServerConfig::new(settings.bind_addr()?);
    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config).wrap_err("bind listener")?;
    let outcome = server.await.wrap_err("serve requests");
    health_state.mark_unhealthy();
    outcome
}
