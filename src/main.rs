use std::sync::Arc;

use anyhow::Result;
use seacat_booking::application::usecases::sweep::SweepUseCase;
use seacat_booking::config::config_loader;
use seacat_booking::infrastructure::axum_http::http_serve;
use seacat_booking::infrastructure::background_worker::sweep_loop;
use seacat_booking::infrastructure::postgres::postgres_connection;
use seacat_booking::infrastructure::postgres::repositories::sweep::SweepPostgres;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        error!("Backend exited with error: {}", error);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let dotenvy_env = config_loader::load()?;
    info!("ENV has been loaded");

    let postgres_pool = postgres_connection::establish_connection(&dotenvy_env.database.url)?;
    info!("Postgres connection has been established");

    let postgres_pool = Arc::new(postgres_pool);

    let sweep_usecase = Arc::new(SweepUseCase::new(Arc::new(SweepPostgres::new(Arc::clone(
        &postgres_pool,
    )))));
    tokio::spawn(sweep_loop::run_sweep_loop(
        sweep_usecase,
        dotenvy_env.sweep.interval_seconds,
    ));

    http_serve::start(Arc::new(dotenvy_env), postgres_pool).await?;

    Ok(())
}
