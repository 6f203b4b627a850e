use rusty_reservations::{
    adapters::logging::LoggingBus,
    adapters::postgres::{PostgresInventoryResolver, PostgresReservationRepository},
    api::{handlers::AppState, router::create_router},
    application::reservation::{NumberLocks, ServiceDependencies, check_due},
};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rusty_reservations=debug,tower_http=debug,axum=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Database connection URL
    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "postgres://localhost/library".into());

    tracing::info!("Database URL: {}", database_url);

    // Initialize database connection pool
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to connect to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    // Initialize adapters
    let repository = Arc::new(PostgresReservationRepository::new(pool.clone()));
    let inventory = Arc::new(PostgresInventoryResolver::new(pool.clone()));
    // Real bus transport is external; locally events are only logged.
    let bus = Arc::new(LoggingBus::new());

    // Create service dependencies
    let service_deps = ServiceDependencies {
        repository,
        inventory,
        bus,
        locks: Arc::new(NumberLocks::new()),
    };

    // Schedule the due sweep
    let sweep_interval_secs = std::env::var("SWEEP_INTERVAL_SECS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .unwrap_or(3600);

    let sweep_deps = service_deps.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(sweep_interval_secs));
        loop {
            interval.tick().await;
            match check_due(&sweep_deps).await {
                Ok(count) => tracing::debug!(count, "due sweep completed"),
                Err(e) => tracing::error!("due sweep failed: {}", e),
            }
        }
    });

    // Create application state
    let app_state = Arc::new(AppState { service_deps });

    // Create router
    let app = create_router(app_state);

    // Server configuration
    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".into());
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", addr);

    // Start server
    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}
