// src/main.rs

use compass_console::api::build_http_client;
use compass_console::config::Config;
use compass_console::routes;
use compass_console::state::AppState;
use dotenvy::dotenv;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file (if present)
    dotenv().ok();

    // Load configuration from environment
    let config = Config::from_env()?;

    let file_appender = tracing_appender::rolling::daily(&config.log_dir, "console.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // Initialize Tracing (Logging)
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    let http = build_http_client(&config)?;
    tracing::info!("Proxying Strengths Compass API at {}", config.api_base_url);

    let bind_addr = config.bind_addr;
    let state = AppState::new(http, config);

    // Create the Axum application router
    let app = routes::create_router(state)?;

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!("Console listening on {}", listener.local_addr()?);

    // Start the server
    axum::serve(listener, app).await?;
    Ok(())
}
