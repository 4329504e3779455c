use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use carebook_api_rest::{router, ApiDoc, AppState};
use carebook_core::{MemoryStore, Table};
use carebook_types::Identity;
use serde_json::json;

/// Main entry point for the CareBook application
///
/// Starts the REST server with Swagger documentation at `/swagger-ui`,
/// backed by an in-memory store seeded with a demo fleet and ward directory.
///
/// # Environment Variables
/// - `CAREBOOK_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("carebook=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr =
        std::env::var("CAREBOOK_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let store = Arc::new(MemoryStore::new());
    seed_demo_data(&store).await;
    // TODO: wire a real identity provider; until then every request runs as
    // the demo patient so the booking flows are exercisable end to end.
    store.sign_in(Identity::new("demo-patient"));

    tracing::info!("++ Starting CareBook REST on {}", rest_addr);

    let app = router(AppState {
        store: store.clone(),
    })
    .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
    .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Seeds the reference store with a small fleet and ward directory so the
/// tracking and booking endpoints have something to show out of the box.
async fn seed_demo_data(store: &MemoryStore) {
    store
        .seed(
            Table::Ambulances,
            [
                json!({
                    "id": "amb-1",
                    "vehicle_number": "DL-01-AB-1234",
                    "driver_name": "Ravi Kumar",
                    "driver_phone": "9876543210",
                    "ambulance_type": "basic",
                    "status": "available",
                    "current_latitude": 28.6139,
                    "current_longitude": 77.2090,
                }),
                json!({
                    "id": "amb-2",
                    "vehicle_number": "DL-01-CD-5678",
                    "driver_name": "Suresh Yadav",
                    "driver_phone": "9812345670",
                    "ambulance_type": "advanced",
                    "status": "on_duty",
                    "current_latitude": 28.5562,
                    "current_longitude": 77.1000,
                }),
                json!({
                    "id": "amb-3",
                    "vehicle_number": "DL-01-EF-9012",
                    "driver_name": "Amit Singh",
                    "driver_phone": "9765432109",
                    "ambulance_type": "air",
                    "status": "maintenance",
                }),
            ],
        )
        .await;

    store
        .seed(
            Table::HospitalWards,
            [
                json!({
                    "id": "ward-1",
                    "ward_name": "General Ward A",
                    "ward_type": "general",
                    "total_beds": 20,
                    "available_beds": 7,
                    "floor_number": 1,
                    "department": "General Medicine",
                    "amenities": ["Shared Bathroom", "Fan", "Daily Cleaning"],
                    "price_per_day": 1500.0,
                }),
                json!({
                    "id": "ward-2",
                    "ward_name": "Semi-Private Ward B",
                    "ward_type": "semi_private",
                    "total_beds": 10,
                    "available_beds": 3,
                    "floor_number": 2,
                    "department": "Internal Medicine",
                    "amenities": ["Attached Bathroom", "TV", "AC"],
                    "price_per_day": 3500.0,
                }),
                json!({
                    "id": "ward-3",
                    "ward_name": "ICU Ward 1",
                    "ward_type": "icu",
                    "total_beds": 8,
                    "available_beds": 0,
                    "floor_number": 3,
                    "department": "Critical Care",
                    "amenities": ["Ventilator", "24x7 Monitoring", "Isolation"],
                    "price_per_day": 8000.0,
                }),
            ],
        )
        .await;

    tracing::info!("seeded demo fleet and ward directory");
}
