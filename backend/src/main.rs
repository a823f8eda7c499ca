//! Backend entry-point: loads settings, wires storage and serves the REST API.

use std::sync::Arc;

use actix_web::web;
use color_eyre::eyre::{Context, Result, eyre};
use mockable::{Clock, DefaultClock, DefaultEnv};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use synapse::domain::UploadPolicy;
use synapse::inbound::http::health::HealthState;
use synapse::inbound::http::state::HttpState;
use synapse::outbound::persistence::{DbPool, PoolConfig, run_migrations};
use synapse::outbound::security::{BuildMode, signing_key_from_env};
use synapse::server::{
    AppDependencies, ServerSettings, StateDependencies, build_diesel_state, build_in_memory_state,
    create_server,
};

/// Application bootstrap.
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

    let settings = ServerSettings::load_from_iter(std::env::args_os())
        .map_err(|err| eyre!("failed to load configuration: {err}"))?;

    let signing_key = signing_key_from_env(
        &DefaultEnv::new(),
        settings.jwt_secret_file(),
        BuildMode::from_debug_assertions(),
    )?;
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let deps = StateDependencies {
        signing_key,
        bcrypt_cost: settings.bcrypt_cost(),
        upload_dir: settings.upload_dir(),
        upload_policy: UploadPolicy::new(settings.max_upload_bytes()),
        clock,
    };

    let http_state = build_http_state(&settings, deps).await?;

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(
        AppDependencies {
            health_state: health_state.clone(),
            http_state: web::Data::new(http_state),
            frontend_url: settings.frontend_url().to_owned(),
        },
        settings.bind_addr(),
    )
    .wrap_err_with(|| format!("failed to bind {}", settings.bind_addr()))?;

    info!(bind_addr = settings.bind_addr(), "Synapse API listening");
    health_state.mark_ready();
    actix_web::rt::spawn(drain_on_interrupt(health_state));
    server.await.wrap_err("server terminated unexpectedly")
}

/// Fail liveness once an interrupt arrives; actix handles the shutdown itself.
async fn drain_on_interrupt(health_state: web::Data<HealthState>) {
    match actix_web::rt::signal::ctrl_c().await {
        Ok(()) => {
            info!("interrupt received, draining");
            health_state.begin_draining();
        }
        Err(err) => warn!(error = %err, "cannot listen for interrupts"),
    }
}

async fn build_http_state(settings: &ServerSettings, deps: StateDependencies) -> Result<HttpState> {
    let upload_dir = deps.upload_dir.clone();
    let state = match settings.database_url() {
        Some(url) => {
            run_migrations(url).await?;
            let pool = DbPool::new(PoolConfig::new(url)).await?;
            build_diesel_state(pool, deps)
        }
        None => build_in_memory_state(deps),
    };
    state.wrap_err_with(|| format!("failed to open upload directory {}", upload_dir.display()))
}
