//! Recruit Desk - applicant tracking and job matching service for a recruitment agency
//!
//! The library hosts the rule-based matching engine, the funnel/KPI
//! aggregation, the job sheet importer and the REST routes that serve them.

pub mod auth;
pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

use actix_web::web;

// Re-export commonly used types
pub use crate::core::{Matcher, MatchResult};
pub use error::ApiError;
pub use models::{Applicant, Job, MatchEvaluation, ScoringWeights};

/// Error handlers and the `/api` routes, shared by the server and tests
pub fn configure_app(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(error::handle_json_payload_error))
        .app_data(web::QueryConfig::default().error_handler(error::handle_query_payload_error))
        .app_data(web::PathConfig::default().error_handler(error::handle_path_error))
        .configure(routes::configure_routes);
}
