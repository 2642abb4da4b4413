use actix_web::{web, HttpResponse};

use crate::error::ApiError;
use crate::models::{DistanceRequest, DistanceResponse};
use crate::routes::AppState;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/calculate-distances", web::post().to(calculate_distances));
}

/// POST /api/calculate-distances
///
/// Request body:
/// ```json
/// { "origin": "愛知県名古屋市", "destinations": ["愛知県豊田市"], "mode": "driving" }
/// ```
async fn calculate_distances(
    state: web::Data<AppState>,
    body: web::Json<DistanceRequest>,
) -> Result<HttpResponse, ApiError> {
    let request = body.into_inner();
    let origin = request.origin.as_deref().map(str::trim).unwrap_or_default();
    let destinations = request.destinations.unwrap_or_default();

    if origin.is_empty() || destinations.is_empty() {
        return Err(ApiError::BadRequest(
            "Origin and destinations are required".to_string(),
        ));
    }

    tracing::info!(
        "Calculating {} distances from {} ({})",
        destinations.len(),
        origin,
        request.mode.as_str()
    );

    let estimates = state
        .distance
        .lookup(origin, &destinations, request.mode)
        .await?;

    Ok(HttpResponse::Ok().json(DistanceResponse::from(estimates)))
}
