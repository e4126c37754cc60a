// Route exports
pub mod auth;
pub mod job_posts;

use actix_web::{error, web, HttpRequest};

use crate::models::ErrorResponse;

pub use auth::{AuthError, AuthenticatedUser, TokenVerifier};
pub use job_posts::AppState;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/api/v1").configure(job_posts::configure));
}

/// Query extractor config rendering parse failures as JSON
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(handle_query_payload_error)
}

fn handle_query_payload_error(
    err: error::QueryPayloadError,
    req: &HttpRequest,
) -> actix_web::Error {
    tracing::info!("Query payload error on {}: {}", req.path(), err);
    let body = ErrorResponse {
        error: "invalid_query".to_string(),
        message: format!("Invalid query: {}", err),
        status_code: 400,
    };
    let response = actix_web::HttpResponse::BadRequest().json(body);
    error::InternalError::from_response(err, response).into()
}
