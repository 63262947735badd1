use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::models::{Decision, SwipeRequest, SwipeResponse};
use crate::routes::{ApiError, AppState, AuthUser};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/swipes", web::post().to(record_swipe));
}

/// Record a LIKE or PASS
///
/// POST /api/v1/swipes
///
/// Request body:
/// ```json
/// {
///   "profileId": 42,
///   "decision": "LIKE"
/// }
/// ```
async fn record_swipe(
    state: web::Data<AppState>,
    user: AuthUser,
    req: web::Json<SwipeRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()?;

    let decision: Decision = req
        .decision
        .parse()
        .map_err(|e| ApiError::bad_request("invalid_decision", format!("{e}")))?;

    let swipe = state
        .recorder
        .record_swipe(user.user_id, req.profile_id, decision)
        .await?;

    Ok(HttpResponse::Ok().json(SwipeResponse {
        success: true,
        swipe_id: swipe.id,
    }))
}
