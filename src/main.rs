use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{router, AppState};
use clinic_core::config::{booking_slots_from_env_value, country_code_from_env_value};
use clinic_core::{ClinicStore, CoreConfig};

/// Main entry point for the clinic application
///
/// Seeds the in-memory clinic store and serves the REST API (with Swagger UI at
/// `/swagger-ui`) until interrupted.
///
/// # Environment Variables
/// - `CLINIC_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `CLINIC_DEFAULT_COUNTRY_CODE`: country code for portal bookings (default: "+51")
/// - `CLINIC_BOOKING_SLOTS`: comma-separated `HH:MM` slots offered for online booking
/// - `CLINIC_SEED_FILE`: YAML seed document (default: the embedded demo clinic)
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the configuration or seed data is invalid,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("clinic_run=info".parse()?)
                .add_directive("clinic_core=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("CLINIC_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let default_country_code =
        country_code_from_env_value(std::env::var("CLINIC_DEFAULT_COUNTRY_CODE").ok())?;
    let booking_slots = booking_slots_from_env_value(std::env::var("CLINIC_BOOKING_SLOTS").ok())?;
    let seed_file = std::env::var("CLINIC_SEED_FILE")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from);

    let cfg = Arc::new(CoreConfig::new(
        default_country_code,
        booking_slots,
        seed_file,
    )?);
    let store = ClinicStore::from_config(cfg)?;

    tracing::info!("++ Starting clinic REST on {}", rest_addr);

    let app = router(AppState::new(store));
    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("-- Shutting down clinic REST");
        })
        .await?;

    Ok(())
}
