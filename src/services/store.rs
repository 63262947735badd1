use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use crate::models::{CandidateQuery, CandidateRow, NewSwipe, Page, Profile, Swipe, User};

/// Errors that can occur when interacting with the backing store
#[derive(Debug, Error)]
pub enum StoreError {
    /// Pool exhausted, connection lost or backend down
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A referenced row does not exist
    #[error("Foreign key violation: {0}")]
    ForeignKey(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl From<sqlx::Error> for StoreError {
    fn from(error: sqlx::Error) -> Self {
        match error {
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
            | sqlx::Error::Io(_) => StoreError::Unavailable(error.to_string()),
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                StoreError::ForeignKey(db.message().to_string())
            }
            other => StoreError::Database(other.to_string()),
        }
    }
}

/// Storage capabilities consumed by the discovery and swipe engine.
///
/// Implementations must enforce one profile per user and one swipe per
/// (user, profile) pair. `upsert_swipe` must be a single conflict-resolving
/// write so concurrent decisions on the same pair never duplicate rows.
#[async_trait]
pub trait DiscoveryStore: Send + Sync {
    async fn find_user(&self, user_id: i64) -> Result<Option<User>, StoreError>;

    async fn find_profile_by_user(&self, user_id: i64) -> Result<Option<Profile>, StoreError>;

    async fn profile_exists(&self, profile_id: i64) -> Result<bool, StoreError>;

    /// Every decision the user has ever made, unpaginated
    async fn swipes_by_user(&self, user_id: i64) -> Result<Vec<Swipe>, StoreError>;

    /// Decisions whose `updated_at` lies in `[start, end)`
    async fn count_swipes_updated_between(
        &self,
        user_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<i64, StoreError>;

    /// Filtered, ordered and paginated candidates plus the unpaginated total
    async fn query_candidates(&self, query: &CandidateQuery) -> Result<Page<CandidateRow>, StoreError>;

    /// Insert, or overwrite `decision` and `updated_at` on (user_id, profile_id)
    async fn upsert_swipe(&self, swipe: &NewSwipe) -> Result<Swipe, StoreError>;

    /// Returns false when the user has no profile
    async fn update_location(
        &self,
        user_id: i64,
        latitude: f64,
        longitude: f64,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError>;

    /// Push the premium expiry `duration` past the later of the current
    /// expiry and `at`, in one atomic write. Returns the new expiry, or
    /// `None` when the user does not exist.
    async fn extend_premium(
        &self,
        user_id: i64,
        duration: Duration,
        at: DateTime<Utc>,
    ) -> Result<Option<DateTime<Utc>>, StoreError>;

    async fn health_check(&self) -> Result<bool, StoreError>;
}
