//! Main entry point for the animal rescue backend server.
//! This crate wires the services together and serves the REST and websocket API.

mod config;

use std::sync::Arc;

use actix_web::{App, HttpServer, middleware::Logger, web};
use auth_services::{
    jwt::JwtService,
    repository::{InMemoryVolunteerRepository, PgVolunteerRepository, VolunteerRepository},
    service::AuthService,
};
use chat_services::ChatHub;
use config::{GeocoderChoice, ServerConfig, StoreBackend};
use emergency_services::{
    EmergencyRepository, EmergencyService, InMemoryEmergencyRepository, PgEmergencyRepository,
};
use geocoding::{FixedResolver, GeocodeResolver, NominatimResolver};
use ledger_services::{
    InMemoryLedgerRepository, LedgerRepository, LedgerService, PgLedgerRepository,
};
use postgres::database::*;

struct Repositories {
    ledger: Arc<dyn LedgerRepository>,
    emergencies: Arc<dyn EmergencyRepository>,
    volunteers: Arc<dyn VolunteerRepository>,
}

async fn open_repositories(config: &ServerConfig) -> Repositories {
    match config.store_backend {
        StoreBackend::Memory => {
            log::warn!("🧠 Using the in-memory store; data is lost on restart");
            Repositories {
                ledger: Arc::new(InMemoryLedgerRepository::new()),
                emergencies: Arc::new(InMemoryEmergencyRepository::new()),
                volunteers: Arc::new(InMemoryVolunteerRepository::new()),
            }
        }
        StoreBackend::Postgres => {
            let pool = match create_connection_pool(&config.database_url).await {
                Ok(pool) => {
                    log::info!("🗃️ Database pool created successfully");

                    if let Err(e) = test_connection(&pool).await {
                        log::error!("❌ Database connection test failed: {}", e);
                    }
                    pool
                }
                Err(e) => {
                    log::error!("❌ Failed to create database pool: {}", e);
                    log::error!("💡 Set DATABASE_URL, or STORE_BACKEND=memory to run without PostgreSQL");
                    std::process::exit(1);
                }
            };

            if let Err(e) = postgres::ensure_schema(&pool).await {
                log::error!("❌ Failed to create database tables: {}", e);
                std::process::exit(1);
            }

            Repositories {
                ledger: Arc::new(PgLedgerRepository::new(pool.clone())),
                emergencies: Arc::new(PgEmergencyRepository::new(pool.clone())),
                volunteers: Arc::new(PgVolunteerRepository::new(pool)),
            }
        }
    }
}

fn build_resolver(choice: &GeocoderChoice) -> Arc<dyn GeocodeResolver> {
    match choice {
        GeocoderChoice::Nominatim(nominatim) => match NominatimResolver::new(nominatim.clone()) {
            Ok(resolver) => {
                log::info!("🗺️ Geocoding with Nominatim at {}", nominatim.base_url);
                Arc::new(resolver)
            }
            Err(e) => {
                log::error!("❌ Failed to initialize geocoder: {}", e);
                std::process::exit(1);
            }
        },
        GeocoderChoice::Fixed(places) => {
            log::info!("🗺️ Geocoding with a fixed table of {} places", places.len());
            let resolver = places
                .iter()
                .fold(FixedResolver::new(), |resolver, (name, coordinates)| {
                    resolver.with_place(name, *coordinates)
                });
            Arc::new(resolver)
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    log::info!("🚀 Starting animal rescue server...");

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("❌ {}", e);
            std::process::exit(1);
        }
    };

    let repositories = open_repositories(&config).await;
    let resolver = build_resolver(&config.geocoder);

    let ledger = LedgerService::new(repositories.ledger);
    let emergencies =
        EmergencyService::new(repositories.emergencies, resolver, config.geocode_policy);
    let auth = AuthService::with_cost(repositories.volunteers, config.bcrypt_cost);
    let jwt = JwtService::new(&config.jwt_secret);
    let hub = ChatHub::new(config.chat.clone());

    log::info!("🐾 Geocode policy: {:?}", emergencies.policy());
    if config.protect_campaign_writes {
        log::info!("🔐 Campaign creation requires a volunteer token");
    }
    log::info!("🌐 Server will be available at: http://{}", config.bind_address);

    let protect_campaign_writes = config.protect_campaign_writes;

    HttpServer::new(move || {
        let jwt = jwt.clone();
        App::new()
            .app_data(web::Data::new(ledger.clone()))
            .app_data(web::Data::new(emergencies.clone()))
            .app_data(web::Data::new(auth.clone()))
            .app_data(web::Data::new(hub.clone()))
            .app_data(web::Data::new(jwt.clone()))
            .wrap(Logger::default())
            .configure(|cfg| web_handlers::configure(cfg, jwt, protect_campaign_writes))
    })
    .bind(&config.bind_address)?
    .run()
    .await
}
