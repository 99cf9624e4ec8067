use std::sync::Arc;

use anyhow::{Context, Result};
use provex_core::{
    AdmissionController, HttpRegistrar, MemoryAccountStore, PgAccountStore, ProvisionPolicy,
    Provisioner, RandomIdentityGenerator, TokenHasher, traits::AccountStore,
};
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use provex_server::{AppState, Config, routes};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    let store: Arc<dyn AccountStore> = match (&config.database_url, config.dev_mode) {
        (Some(url), false) => {
            let pool = PgPoolOptions::new()
                .max_connections(10)
                .connect(url)
                .await
                .context("failed to connect to postgres")?;
            let store = PgAccountStore::new(pool);
            store
                .run_migrations()
                .await
                .context("failed to run migrations")?;
            info!("using postgres account store");
            Arc::new(store)
        }
        _ => {
            warn!("no DATABASE_URL configured; using in-memory store (development only)");
            Arc::new(MemoryAccountStore::new())
        }
    };

    let generator = Arc::new(RandomIdentityGenerator::new());
    let registrar = Arc::new(
        HttpRegistrar::new(&config.registrar_url, config.registrar_timeout())
            .map_err(|err| anyhow::anyhow!("failed to build registrar client: {err}"))?,
    );

    let policy = ProvisionPolicy {
        ttl_secs: config.ttl_secs(),
        default_recovery_email: config.default_recovery_email.clone(),
    };
    let provisioner = Arc::new(Provisioner::new(
        generator,
        registrar,
        store.clone(),
        policy,
    ));

    let state = AppState::new(
        provisioner,
        AdmissionController::new(config.admission_capacity),
        store,
        Arc::new(TokenHasher::new(config.auth_token_key.as_bytes())),
        Arc::new(config.clone()),
    );

    let app = routes::build_router(state);

    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, capacity = config.admission_capacity, "provex server listening");

    axum::serve(listener, app)
        .await
        .context("server terminated")?;

    Ok(())
}
