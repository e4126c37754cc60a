use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;
use tracing::Instrument;
use validator::Validate;

use crate::core::DiscoveryService;
use crate::error::DiscoveryError;
use crate::models::{ErrorResponse, FilterSpec, HealthResponse, NearbyQuery, PaginationQuery};
use crate::routes::auth::{AuthenticatedUser, TokenVerifier};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub discovery: DiscoveryService,
    pub tokens: Arc<TokenVerifier>,
}

/// Configure all job-post routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/jobpost", web::get().to(list_job_posts))
        .route("/jobpost/list", web::get().to(list_my_job_posts))
        .route("/jobpost/nearby", web::get().to(nearby_job_posts));
}

fn validation_failed(errors: validator::ValidationErrors) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse {
        error: "validation_failed".to_string(),
        message: errors.to_string(),
        status_code: 400,
    })
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let index = state.discovery.index();
    let healthy = match index.health_check().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("Storage health check failed: {}", e);
            false
        }
    };

    HttpResponse::Ok().json(HealthResponse {
        status: if healthy { "healthy" } else { "degraded" }.to_string(),
        storage: index.backend().to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Paginated listing of every job post
///
/// GET /api/v1/jobpost?page=1&limit=10
async fn list_job_posts(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    query: web::Query<PaginationQuery>,
) -> Result<HttpResponse, DiscoveryError> {
    if let Err(errors) = query.validate() {
        return Ok(validation_failed(errors));
    }

    let span = tracing::info_span!(
        "list_job_posts",
        request_id = %uuid::Uuid::new_v4(),
        user_id = user.0
    );
    let page = state
        .discovery
        .list_all(query.page, query.limit)
        .instrument(span)
        .await?;

    Ok(HttpResponse::Ok().json(page))
}

/// Job posts owned by the calling auctioneer
///
/// GET /api/v1/jobpost/list
async fn list_my_job_posts(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, DiscoveryError> {
    let span = tracing::info_span!(
        "list_my_job_posts",
        request_id = %uuid::Uuid::new_v4(),
        user_id = user.0
    );
    let posts = state
        .discovery
        .list_for_auctioneer(user.0)
        .instrument(span)
        .await?;

    Ok(HttpResponse::Ok().json(posts))
}

/// Job posts near the calling bidder
///
/// GET /api/v1/jobpost/nearby?radius=10&boatLengthFrom=20&boatLengthTo=40
///     &additionalServices=wash,fuel
async fn nearby_job_posts(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    query: web::Query<NearbyQuery>,
) -> Result<HttpResponse, DiscoveryError> {
    if let Err(errors) = query.validate() {
        return Ok(validation_failed(errors));
    }

    let request_id = uuid::Uuid::new_v4();
    let spec = FilterSpec::from(query.into_inner());
    tracing::info!(%request_id, "Nearby search for user {}: {:?}", user.0, spec);

    let span = tracing::info_span!("nearby_job_posts", %request_id, user_id = user.0);
    let posts = state
        .discovery
        .search_for_bidder(user.0, &spec)
        .instrument(span)
        .await?;

    Ok(HttpResponse::Ok().json(posts))
}
