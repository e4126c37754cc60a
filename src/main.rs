use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use harbor_match::config::{Settings, StorageBackend};
use harbor_match::core::{
    DiscoveryDefaults, DiscoveryService, FilterCompiler, GeoMath, JobPostIndex,
};
use harbor_match::routes::{self, AppState, TokenVerifier};
use harbor_match::services::{CorpusReader, MemoryStore, PostgresStore, RoleResolver};

fn init_logging(level: &str, format: &str) {
    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }
}

fn io_error(message: String) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, message)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = Settings::load().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        io_error(format!("Configuration error: {}", e))
    })?;

    init_logging(&settings.logging.level, &settings.logging.format);
    info!("Starting Harbor Match discovery service...");

    let (corpus, roles): (Arc<dyn CorpusReader>, Arc<dyn RoleResolver>) =
        match settings.storage.backend {
            StorageBackend::Postgres => {
                let store = PostgresStore::from_settings(&settings.database)
                    .await
                    .map_err(|e| {
                        error!("Failed to connect to PostgreSQL: {}", e);
                        io_error(format!("PostgreSQL connection error: {}", e))
                    })?;
                let store = Arc::new(store);
                let corpus: Arc<dyn CorpusReader> = store.clone();
                let roles: Arc<dyn RoleResolver> = store;
                (corpus, roles)
            }
            StorageBackend::Memory => {
                let store = match &settings.storage.seed_path {
                    Some(path) => MemoryStore::from_json_file(path).map_err(|e| {
                        error!("Failed to load seed: {}", e);
                        io_error(e.to_string())
                    })?,
                    None => MemoryStore::new(vec![], vec![], vec![]),
                };
                let store = Arc::new(store);
                let corpus: Arc<dyn CorpusReader> = store.clone();
                let roles: Arc<dyn RoleResolver> = store;
                (corpus, roles)
            }
        };

    info!(
        "Storage backend '{}' ready (timeout: {}s)",
        corpus.name(),
        settings.storage.timeout_secs
    );

    let discovery = DiscoveryService::new(
        roles,
        JobPostIndex::new(corpus, Duration::from_secs(settings.storage.timeout_secs)),
        FilterCompiler::new(GeoMath::new(settings.discovery.earth_radius_km)),
        DiscoveryDefaults {
            radius_km: settings.discovery.default_radius_km,
            page: 1,
            limit: settings.discovery.default_page_limit,
        },
    );

    info!(
        "Discovery initialized (default radius: {} km, earth radius: {} km)",
        settings.discovery.default_radius_km, settings.discovery.earth_radius_km
    );

    let app_state = AppState {
        discovery,
        tokens: Arc::new(TokenVerifier::hs256(&settings.auth.jwt_secret)),
    };

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(routes::query_config())
            .wrap(Cors::permissive())
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
