use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use lume_discovery::config::Settings;
use lume_discovery::core::{Clock, SystemClock};
use lume_discovery::routes::{self, handle_json_payload_error, handle_query_payload_error, AppState};
use lume_discovery::services::{DiscoveryStore, PostgresClient};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn config_error(e: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::InvalidInput, format!("Configuration error: {}", e))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Load configuration before logging so the [logging] section applies
    let settings = Settings::load().map_err(config_error)?;

    // Initialize logging
    let logging = settings
        .logging
        .overridden_by(std::env::var("LOG_LEVEL").ok(), std::env::var("LOG_FORMAT").ok());

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level)))
        .with_target(false)
        .with_level(true);

    if logging.format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }

    info!("Starting Lume discovery service...");

    let engine = settings.engine.to_engine_settings().map_err(|e| {
        error!("Invalid engine configuration: {}", e);
        config_error(e)
    })?;

    info!("Configuration loaded successfully");

    // Initialize PostgreSQL client
    let db_max_conn = settings.database.max_connections.unwrap_or(10);
    let db_min_conn = settings.database.min_connections.unwrap_or(1);

    let postgres = PostgresClient::from_settings(
        &settings.database.url,
        Some(db_max_conn),
        Some(db_min_conn),
        settings.database.acquire_timeout_secs,
        settings.database.idle_timeout_secs,
    )
    .await
    .map_err(|e| {
        error!("Failed to connect to PostgreSQL: {}", e);
        std::io::Error::new(std::io::ErrorKind::ConnectionRefused, e.to_string())
    })?;

    info!("PostgreSQL client initialized (max: {} connections)", db_max_conn);

    let store: Arc<dyn DiscoveryStore> = Arc::new(postgres);
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    info!(
        "Engine initialized: daily swipe limit {}, max page size {}, day offset {}",
        engine.daily_swipe_limit, engine.max_page_size, engine.utc_offset
    );

    // Build application state
    let app_state = AppState::new(
        store,
        clock,
        engine,
        settings.engine.default_page_size,
        &settings.auth.jwt_secret,
    );

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
