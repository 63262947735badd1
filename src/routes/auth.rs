use actix_web::{dev::Payload, http::header::AUTHORIZATION, web, FromRequest, HttpRequest};
use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::future::{ready, Ready};

use crate::routes::error::ApiError;
use crate::routes::AppState;

/// Claims carried by access tokens issued by the identity service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub uid: i64,
    pub exp: u64,
}

/// Authenticated caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: i64,
}

/// Validate an `Authorization: Bearer <jwt>` header value
pub fn decode_bearer(header: Option<&str>, key: &DecodingKey) -> Result<AuthUser, ApiError> {
    let header = header.ok_or_else(|| ApiError::unauthorized("missing authorization header"))?;
    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::unauthorized("authorization header must use Bearer scheme"))?;

    let validation = Validation::new(Algorithm::HS256);
    let data = decode::<Claims>(token, key, &validation).map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => ApiError::unauthorized("token has expired"),
        _ => ApiError::unauthorized(format!("invalid token: {e}")),
    })?;

    Ok(AuthUser {
        user_id: data.claims.uid,
    })
}

impl FromRequest for AuthUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result = match req.app_data::<web::Data<AppState>>() {
            Some(state) => decode_bearer(
                req.headers().get(AUTHORIZATION).and_then(|v| v.to_str().ok()),
                &state.decoding_key,
            ),
            None => Err(ApiError::internal("application state not configured")),
        };
        ready(result)
    }
}
