use std::net::SocketAddr;

use quiztrek_backend::{
    build_router,
    config::{get_config, init_config},
    database::pool::{create_pool, run_migrations},
    AppState,
};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_config()?;
    let config = get_config();
    init_tracing(config.log_json);

    let pool = create_pool(config).await?;
    run_migrations(&pool).await?;

    let app = build_router(AppState::new(pool), config);

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Serving static files from: {}", config.static_dir);
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
