use tokio::net::TcpListener;
use tracing::{info, warn};
use vanrent::config::AppConfig;
use vanrent::error::AppError;
use vanrent::routes::create_router;
use vanrent::services::dashboard;
use vanrent::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_logging();

    let config = AppConfig::from_env()?;
    let state = AppState::from_config(config.clone()).await?;

    // The dashboard still starts when the record service is unreachable;
    // the refresh buttons retry.
    if let Err(err) = dashboard::refresh_trips(&state).await {
        warn!("initial trip load failed: {err}");
    }
    if let Err(err) = dashboard::refresh_payments(&state).await {
        warn!("initial payment load failed: {err}");
    }

    let app = create_router(state);

    let listener = TcpListener::bind(config.listen_addr).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);
    let filter_layer = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,vanrent=debug,tower_http=info".into());

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}
