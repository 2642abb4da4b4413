use actix_web::{web, HttpResponse, Responder};

use crate::models::HealthResponse;
use crate::routes::AppState;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let database = state.postgres.health_check().await;
    let (status, message) = if database {
        ("healthy", "Service is running")
    } else {
        ("degraded", "Database is unreachable")
    };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        message: message.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database,
        cache_entries: state.cache.stats().l1_size,
        timestamp: chrono::Utc::now(),
    })
}
