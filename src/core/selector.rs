use std::sync::Arc;

use crate::core::calendar::{Clock, DayWindow};
use crate::core::distance::{format_distance, resolve_origin};
use crate::core::error::{with_deadline, EngineError};
use crate::core::exclusion::build_exclusion_set;
use crate::core::EngineSettings;
use crate::models::{
    is_premium, CandidateOrder, CandidateQuery, CandidateRow, CandidateView, GeoPoint, PageRequest,
};
use crate::services::DiscoveryStore;

/// Discovery feed request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiscoverRequest {
    pub user_id: i64,
    pub page: u32,
    pub page_size: u32,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// One page of candidates plus the total across all pages
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoverResult {
    pub items: Vec<CandidateView>,
    pub total: i64,
}

/// Decides which profiles a user sees next
///
/// # Pipeline Stages
/// 1. Load the caller's profile and full decision history
/// 2. Build the exclusion set (own profile, every LIKE, anything decided today)
/// 3. Query the remaining profiles, nearest first when coordinates are given
/// 4. Paginate and label distances
///
/// Without coordinates the order is shuffled on every call, so successive
/// pages may overlap or skip profiles.
#[derive(Clone)]
pub struct CandidateSelector {
    store: Arc<dyn DiscoveryStore>,
    clock: Arc<dyn Clock>,
    settings: EngineSettings,
}

impl CandidateSelector {
    pub fn new(store: Arc<dyn DiscoveryStore>, clock: Arc<dyn Clock>, settings: EngineSettings) -> Self {
        Self { store, clock, settings }
    }

    /// Compute one page of the caller's discovery feed.
    ///
    /// Input is validated before any storage access. Read-only.
    pub async fn discover(&self, request: &DiscoverRequest) -> Result<DiscoverResult, EngineError> {
        if request.page < 1 {
            return Err(EngineError::InvalidInput("page must be at least 1".to_string()));
        }
        if request.page_size < 1 || request.page_size > self.settings.max_page_size {
            return Err(EngineError::InvalidInput(format!(
                "pageSize must be between 1 and {} (got {})",
                self.settings.max_page_size, request.page_size
            )));
        }
        let origin = resolve_origin(request.latitude, request.longitude)?;

        with_deadline(self.settings.operation_timeout, self.run(request, origin)).await
    }

    async fn run(
        &self,
        request: &DiscoverRequest,
        origin: Option<GeoPoint>,
    ) -> Result<DiscoverResult, EngineError> {
        let now = self.clock.now();
        let today = DayWindow::containing(now, self.settings.utc_offset);

        let own_profile = self
            .store
            .find_profile_by_user(request.user_id)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("profile for user {}", request.user_id)))?;

        let history = self.store.swipes_by_user(request.user_id).await?;
        let excluded = build_exclusion_set(own_profile.id, &history, &today);

        tracing::debug!(
            "Excluding {} profiles for user {} ({} prior decisions)",
            excluded.len(),
            request.user_id,
            history.len()
        );

        let page = PageRequest {
            page: request.page,
            page_size: request.page_size,
        };
        let query = CandidateQuery {
            exclude_profile_ids: excluded.into_iter().collect(),
            order: origin.map_or(CandidateOrder::Random, CandidateOrder::NearestTo),
            limit: i64::from(page.page_size),
            offset: page.offset(),
        };

        let rows = self.store.query_candidates(&query).await?;

        tracing::info!(
            "Returning {} candidates for user {} (page {}, {} total)",
            rows.items.len(),
            request.user_id,
            request.page,
            rows.total
        );

        Ok(DiscoverResult {
            items: rows.items.into_iter().map(|row| to_view(row, now)).collect(),
            total: rows.total,
        })
    }
}

/// Map a joined row to its client view, evaluating premium at `now`
pub fn to_view(row: CandidateRow, now: chrono::DateTime<chrono::Utc>) -> CandidateView {
    CandidateView {
        id: row.id,
        verified: is_premium(row.premium_expires_at, now),
        distance: row.distance_km.map(format_distance),
        name: row.name,
        photo: row.photo,
        age: row.age,
        bio: row.bio,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::calendar::SystemClock;
    use crate::services::MemoryStore;
    use chrono::{Duration, Utc};

    fn selector() -> CandidateSelector {
        CandidateSelector::new(
            Arc::new(MemoryStore::new()),
            Arc::new(SystemClock),
            EngineSettings::default(),
        )
    }

    fn request(page: u32, page_size: u32) -> DiscoverRequest {
        DiscoverRequest {
            user_id: 1,
            page,
            page_size,
            latitude: None,
            longitude: None,
        }
    }

    #[tokio::test]
    async fn test_rejects_zero_page() {
        let result = selector().discover(&request(0, 10)).await;
        assert!(matches!(result, Err(EngineError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_rejects_oversized_page() {
        let result = selector().discover(&request(1, 101)).await;
        assert!(matches!(result, Err(EngineError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_missing_profile_is_not_found() {
        let result = selector().discover(&request(1, 10)).await;
        assert!(matches!(result, Err(EngineError::NotFound(_))));
    }

    #[test]
    fn test_to_view() {
        let now = Utc::now();
        let row = CandidateRow {
            id: 5,
            user_id: 6,
            name: "Bea".to_string(),
            photo: "https://cdn.example/bea.jpg".to_string(),
            age: 29,
            bio: "climber".to_string(),
            latitude: 0.0,
            longitude: 0.0,
            premium_expires_at: Some(now + Duration::days(3)),
            distance_km: Some(0.45),
        };

        let view = to_view(row, now);
        assert!(view.verified);
        assert_eq!(view.distance.as_deref(), Some("450m"));
    }
}
