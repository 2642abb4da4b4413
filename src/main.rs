use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use recruit_desk::auth::Authenticator;
use recruit_desk::config::Settings;
use recruit_desk::core::Matcher;
use recruit_desk::models::ScoringWeights;
use recruit_desk::routes::AppState;
use recruit_desk::services::{
    CacheManager, DistanceMatrixClient, PostgresClient, SettingsStore, SpreadsheetChecker,
};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn init_logging() {
    // LOG_LEVEL wins over RUST_LOG so deployments can set one knob
    let filter = std::env::var("LOG_LEVEL")
        .ok()
        .map(EnvFilter::new)
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new("info"));
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.compact().init();
    }
}

fn startup_error(context: &str, err: impl std::fmt::Display) -> std::io::Error {
    error!("{}: {}", context, err);
    std::io::Error::new(std::io::ErrorKind::Other, format!("{}: {}", context, err))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    init_logging();

    info!("Starting Recruit Desk service...");

    let settings = Settings::load().map_err(|e| startup_error("Failed to load configuration", e))?;
    info!("Configuration loaded successfully");

    // Cache: Redis is optional, the in-process tier always exists
    let cache_ttl = settings.cache.ttl_secs.unwrap_or(86_400);
    let l1_cache_size = settings.cache.l1_cache_size.unwrap_or(10_000);

    let cache = match settings.cache.redis_url.as_deref() {
        Some(url) => match CacheManager::new(url, l1_cache_size, cache_ttl).await {
            Ok(c) => {
                info!("Cache manager initialized with Redis (L1: {} entries, TTL: {}s)", l1_cache_size, cache_ttl);
                c
            }
            Err(e) => {
                warn!("Failed to connect to Redis ({}), using in-memory cache only", e);
                CacheManager::in_memory(l1_cache_size, cache_ttl)
            }
        },
        None => {
            info!("Cache manager initialized in-memory (L1: {} entries, TTL: {}s)", l1_cache_size, cache_ttl);
            CacheManager::in_memory(l1_cache_size, cache_ttl)
        }
    };
    let cache = Arc::new(cache);

    let db_max_conn = settings.database.max_connections.unwrap_or(10);
    let postgres = PostgresClient::new(
        &settings.database.url,
        db_max_conn,
        settings.database.min_connections.unwrap_or(1),
        settings.database.acquire_timeout_secs.unwrap_or(5),
        settings.database.idle_timeout_secs.unwrap_or(600),
    )
    .await
    .map_err(|e| startup_error("Failed to connect to PostgreSQL", e))?;
    let postgres = Arc::new(postgres);
    info!("PostgreSQL client initialized (max: {} connections)", db_max_conn);

    let distance = DistanceMatrixClient::new(
        &settings.distance.endpoint,
        settings.distance.api_key.clone(),
        &settings.distance.language,
        settings.distance.batch_size,
        settings.distance.timeout_secs,
        Some(cache.clone()),
    )
    .map_err(|e| startup_error("Failed to build distance client", e))?;
    if !distance.is_configured() {
        warn!("GOOGLE_MAPS_API_KEY is not set; travel-time lookups will fail");
    }

    let spreadsheet = SpreadsheetChecker::new(
        &settings.spreadsheet.export_endpoint,
        settings.spreadsheet.timeout_secs,
    )
    .map_err(|e| startup_error("Failed to build spreadsheet client", e))?;

    let weights = ScoringWeights::from(&settings.scoring.weights);
    let matcher = Matcher::new(weights);
    info!("Matcher initialized with weights: {:?}", weights);

    let authenticator = web::Data::new(Authenticator::new(
        settings.auth.required,
        &settings.auth.admin_username,
        &settings.auth.admin_password,
        &settings.auth.jwt_secret,
        settings.auth.token_ttl_secs,
    ));
    if settings.auth.required {
        info!("Bearer tokens required on mutating endpoints");
    }

    let app_state = AppState {
        postgres,
        cache,
        distance: Arc::new(distance),
        settings: Arc::new(SettingsStore::new(&settings.settings_store.path)),
        spreadsheet: Arc::new(spreadsheet),
        matcher,
        pagination: settings.pagination,
        kpi: settings.kpi.clone(),
    };

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(authenticator.clone())
            .wrap(Cors::permissive())
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(recruit_desk::configure_app)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
