use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::core::DiscoverRequest;
use crate::models::{DiscoverQuery, DiscoverResponse, PageMeta, PageRequest, UpdateLocationRequest};
use crate::routes::{ApiError, AppState, AuthUser};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/profiles", web::get().to(discover))
        .route("/profiles/location", web::put().to(update_location));
}

/// Discovery feed
///
/// GET /api/v1/profiles?page=1&pageSize=10&latitude=..&longitude=..
///
/// Coordinates are optional. With both present the feed is ranked by
/// distance and each card carries a distance label.
async fn discover(
    state: web::Data<AppState>,
    user: AuthUser,
    query: web::Query<DiscoverQuery>,
) -> Result<HttpResponse, ApiError> {
    let page = PageRequest::from_query(
        query.page,
        query.page_size,
        state.default_page_size,
        state.max_page_size,
    )?;

    tracing::debug!(
        "Discover for user {}: page={}, pageSize={}",
        user.user_id,
        page.page,
        page.page_size
    );

    let result = state
        .selector
        .discover(&DiscoverRequest {
            user_id: user.user_id,
            page: page.page,
            page_size: page.page_size,
            latitude: query.latitude,
            longitude: query.longitude,
        })
        .await?;

    let paginator = PageMeta::new(page, result.total, result.items.len());

    Ok(HttpResponse::Ok().json(DiscoverResponse {
        data: result.items,
        paginator,
    }))
}

/// PUT /api/v1/profiles/location
async fn update_location(
    state: web::Data<AppState>,
    user: AuthUser,
    req: web::Json<UpdateLocationRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()?;

    state
        .accounts
        .update_location(user.user_id, req.latitude, req.longitude)
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true })))
}
