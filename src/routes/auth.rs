use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::auth::{AuthUser, Authenticator};
use crate::error::ApiError;
use crate::models::LoginRequest;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/auth/login", web::post().to(login))
        .route("/auth/me", web::get().to(me));
}

async fn login(
    authenticator: web::Data<Authenticator>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    body.validate()?;
    let response = authenticator.login(&body.username, &body.password)?;
    Ok(HttpResponse::Ok().json(response))
}

/// Identity of the bearer token; always requires one
async fn me(user: AuthUser) -> Result<HttpResponse, ApiError> {
    let claims = user
        .claims
        .ok_or_else(|| ApiError::Unauthorized("Missing bearer token".to_string()))?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "username": claims.sub,
        "expires_at": claims.exp,
    })))
}
