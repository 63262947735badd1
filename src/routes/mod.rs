// Route exports
pub mod auth;
pub mod error;
pub mod health;
pub mod premium;
pub mod profiles;
pub mod swipes;

use actix_web::web;
use jsonwebtoken::DecodingKey;
use std::sync::Arc;

use crate::core::{AccountService, CandidateSelector, Clock, EngineSettings, SwipeRecorder};
use crate::services::DiscoveryStore;

pub use auth::{AuthUser, Claims};
pub use error::{handle_json_payload_error, handle_query_payload_error, ApiError};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DiscoveryStore>,
    pub selector: CandidateSelector,
    pub recorder: SwipeRecorder,
    pub accounts: AccountService,
    pub decoding_key: DecodingKey,
    pub default_page_size: u32,
    pub max_page_size: u32,
}

impl AppState {
    pub fn new(
        store: Arc<dyn DiscoveryStore>,
        clock: Arc<dyn Clock>,
        settings: EngineSettings,
        default_page_size: u32,
        jwt_secret: &str,
    ) -> Self {
        Self {
            selector: CandidateSelector::new(store.clone(), clock.clone(), settings),
            recorder: SwipeRecorder::new(store.clone(), clock.clone(), settings),
            accounts: AccountService::new(store.clone(), clock, settings),
            store,
            decoding_key: DecodingKey::from_secret(jwt_secret.as_bytes()),
            default_page_size,
            max_page_size: settings.max_page_size,
        }
    }
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(health::configure)
            .configure(profiles::configure)
            .configure(swipes::configure)
            .configure(premium::configure),
    );
}
