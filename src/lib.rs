pub mod config;
pub mod routes;
pub mod fairings;
pub mod state;
pub mod error;
pub mod services;
pub mod models;
pub mod schema;
pub mod database;

use rocket::Config;
use rocket::fairing::AdHoc;
use rocket_cors::{AllowedOrigins, CorsOptions};
use std::sync::Arc;

pub use config::AppConfig;
pub use state::AppState;
pub use fairings::RequestLogger;
pub use services::{DatabaseService, ListingCacheService};

pub fn create_rocket() -> rocket::Rocket<rocket::Build> {
    // Load configuration from environment
    let config = AppConfig::from_env();

    // Initialize the listing lookup cache
    let listing_cache = Arc::new(ListingCacheService::new());

    // Initialize database service
    let database =
        Arc::new(DatabaseService::new(&config.database_url).expect("Failed to initialize database"));

    // Create app state
    let state = AppState {
        config,
        listing_cache,
        database,
    };

    // Configure CORS
    let cors = CorsOptions::default()
        .allowed_origins(AllowedOrigins::all())
        .to_cors()
        .expect("Failed to create CORS configuration");

    // Configure Rocket with custom host and port
    let rocket_config = Config {
        port: state.config.port,
        address: state.config.host.parse().expect("Invalid host address"),
        ..Config::default()
    };

    rocket::custom(&rocket_config)
        .manage(state)
        .attach(cors)
        .attach(RequestLogger)
        .attach(AdHoc::on_liftoff("Aggregate Refresh", |rocket| {
            Box::pin(async move {
                if let Some(state) = rocket.state::<AppState>() {
                    if state.config.aggregate_refresh_enabled {
                        let database = state.database.clone();
                        tokio::spawn(services::aggregates::start_aggregate_refresh_task(database));
                    }
                }
            })
        }))
        .mount("/", routes::get_routes())
}
