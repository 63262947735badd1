use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::core::calendar::Clock;
use crate::core::distance::validate_coordinates;
use crate::core::error::{with_deadline, EngineError};
use crate::core::EngineSettings;
use crate::services::DiscoveryStore;

/// Mutations of user state the discovery engine depends on: profile
/// coordinates for ranking and premium expiry for the quota bypass.
#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn DiscoveryStore>,
    clock: Arc<dyn Clock>,
    settings: EngineSettings,
}

impl AccountService {
    pub fn new(store: Arc<dyn DiscoveryStore>, clock: Arc<dyn Clock>, settings: EngineSettings) -> Self {
        Self { store, clock, settings }
    }

    /// Overwrite the coordinates stored on the caller's profile
    pub async fn update_location(&self, user_id: i64, latitude: f64, longitude: f64) -> Result<(), EngineError> {
        let point = validate_coordinates(latitude, longitude)?;

        with_deadline(self.settings.operation_timeout, async {
            let updated = self
                .store
                .update_location(user_id, point.latitude, point.longitude, self.clock.now())
                .await?;
            if !updated {
                return Err(EngineError::NotFound(format!("profile for user {user_id}")));
            }
            Ok(())
        })
        .await
    }

    /// Extend the caller's premium subscription by the configured duration.
    ///
    /// An active subscription is extended from its current expiry, a lapsed
    /// or missing one from now, in a single store write. Returns the new expiry.
    pub async fn purchase_premium(&self, user_id: i64) -> Result<DateTime<Utc>, EngineError> {
        with_deadline(self.settings.operation_timeout, async {
            let expires_at = self
                .store
                .extend_premium(user_id, self.settings.premium_duration, self.clock.now())
                .await?
                .ok_or_else(|| EngineError::NotFound(format!("user {user_id}")))?;

            tracing::info!("User {} is premium until {}", user_id, expires_at);
            Ok(expires_at)
        })
        .await
    }
}
