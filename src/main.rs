use sqlx::sqlite::SqlitePoolOptions;
use tower_http::trace::TraceLayer;
use tracing::{info, instrument};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use climate_query_service::api::{create_router, AppState};
use climate_query_service::config::Config;
use climate_query_service::db::{schema, MeasurementRepository};
use climate_query_service::services::ClimateService;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing with environment filter support
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,climate_query_service=debug")),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true),
        )
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env()?;
    info!("Starting climate query service with config: {:?}", config);

    // Create database connection pool
    info!("Connecting to measurement store...");
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    info!("Store connection established");

    // The store is populated out-of-band; verify it has the declared shape
    // before serving anything from it.
    info!("Validating store schema...");
    schema::validate_store(&pool).await?;
    info!("Store schema matches the declared shape");

    // Create repository and service
    let measurement_repo = MeasurementRepository::new(pool);
    let climate_service = ClimateService::new(measurement_repo);

    // Create API router
    let app_state = AppState { climate_service };
    let app = create_router(app_state).layer(TraceLayer::new_for_http());

    // Start server
    let addr = config.server_addr();
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
