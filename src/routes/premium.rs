use actix_web::{web, HttpResponse};

use crate::models::PremiumResponse;
use crate::routes::{ApiError, AppState, AuthUser};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/premium/purchase", web::post().to(purchase_premium));
}

/// POST /api/v1/premium/purchase
async fn purchase_premium(state: web::Data<AppState>, user: AuthUser) -> Result<HttpResponse, ApiError> {
    let premium_expires_at = state.accounts.purchase_premium(user.user_id).await?;

    Ok(HttpResponse::Ok().json(PremiumResponse { premium_expires_at }))
}
