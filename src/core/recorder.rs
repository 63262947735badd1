use std::sync::Arc;

use crate::core::calendar::{Clock, DayWindow};
use crate::core::error::{with_deadline, EngineError};
use crate::core::EngineSettings;
use crate::models::{Decision, NewSwipe, Swipe};
use crate::services::DiscoveryStore;

/// Fail once `used` has reached `limit`
#[inline]
pub fn ensure_within_quota(used: i64, limit: i64) -> Result<(), EngineError> {
    if used >= limit {
        return Err(EngineError::QuotaExceeded { limit });
    }
    Ok(())
}

/// Records LIKE/PASS decisions with "last decision wins" semantics
///
/// Non-premium users are capped at `daily_swipe_limit` rows touched today.
/// The count uses `updated_at`, so re-deciding an old profile today also
/// consumes a slot. The check and the write are not serialised across
/// different target profiles; a concurrent burst may overrun the cap by one.
#[derive(Clone)]
pub struct SwipeRecorder {
    store: Arc<dyn DiscoveryStore>,
    clock: Arc<dyn Clock>,
    settings: EngineSettings,
}

impl SwipeRecorder {
    pub fn new(store: Arc<dyn DiscoveryStore>, clock: Arc<dyn Clock>, settings: EngineSettings) -> Self {
        Self { store, clock, settings }
    }

    /// Record `decision` by `user_id` on `profile_id`.
    ///
    /// Either the upsert commits or an error is returned with nothing written.
    pub async fn record_swipe(
        &self,
        user_id: i64,
        profile_id: i64,
        decision: Decision,
    ) -> Result<Swipe, EngineError> {
        with_deadline(
            self.settings.operation_timeout,
            self.run(user_id, profile_id, decision),
        )
        .await
    }

    async fn run(&self, user_id: i64, profile_id: i64, decision: Decision) -> Result<Swipe, EngineError> {
        let now = self.clock.now();

        let user = self
            .store
            .find_user(user_id)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("user {user_id}")))?;

        if !self.store.profile_exists(profile_id).await? {
            return Err(EngineError::NotFound(format!("profile {profile_id}")));
        }

        if !user.is_premium_at(now) {
            let today = DayWindow::containing(now, self.settings.utc_offset);
            let used = self
                .store
                .count_swipes_updated_between(user_id, today.start, today.end)
                .await?;

            if let Err(err) = ensure_within_quota(used, self.settings.daily_swipe_limit) {
                tracing::info!("User {} hit the daily swipe limit ({} used)", user_id, used);
                return Err(err);
            }
        }

        let swipe = self
            .store
            .upsert_swipe(&NewSwipe {
                user_id,
                profile_id,
                decision,
                at: now,
            })
            .await?;

        tracing::debug!("User {} decided {} on profile {}", user_id, decision, profile_id);

        Ok(swipe)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota_boundary() {
        assert!(ensure_within_quota(0, 10).is_ok());
        assert!(ensure_within_quota(9, 10).is_ok());
        assert!(matches!(
            ensure_within_quota(10, 10),
            Err(EngineError::QuotaExceeded { limit: 10 })
        ));
        assert!(ensure_within_quota(11, 10).is_err());
    }
}
