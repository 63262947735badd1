use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::time::Duration;

use crate::core::distance::EARTH_RADIUS_KM;
use crate::models::{CandidateOrder, CandidateQuery, CandidateRow, GeoPoint, NewSwipe, Page, Profile, Swipe, User};
use crate::services::store::{DiscoveryStore, StoreError};

const CANDIDATE_COLUMNS: &str = "p.id, p.user_id, p.name, p.photo, p.age, p.bio, p.latitude, p.longitude, u.premium_expires_at";
const CANDIDATE_FROM: &str = " FROM profiles p INNER JOIN users u ON u.id = p.user_id";

/// `created_at` is only written on insert
const UPSERT_SWIPE_SQL: &str = r#"
    INSERT INTO swipes (user_id, profile_id, decision, created_at, updated_at)
    VALUES ($1, $2, $3, $4, $4)
    ON CONFLICT (user_id, profile_id)
    DO UPDATE SET
        decision = EXCLUDED.decision,
        updated_at = EXCLUDED.updated_at
    RETURNING id, user_id, profile_id, decision, created_at, updated_at
"#;

const EXTEND_PREMIUM_SQL: &str = r#"
    UPDATE users
    SET premium_expires_at = GREATEST(COALESCE(premium_expires_at, $3), $3) + make_interval(secs => $2),
        updated_at = $3
    WHERE id = $1
    RETURNING premium_expires_at
"#;

/// PostgreSQL-backed store for users, profiles and swipes
///
/// All coordination between concurrent requests happens here: the
/// `(user_id, profile_id)` unique constraint drives the swipe upsert and
/// discovery only ever reads.
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    /// Create a new PostgreSQL client from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new PostgreSQL client from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
    ) -> Result<Self, StoreError> {
        tracing::info!("Connecting to PostgreSQL");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            Duration::from_secs(acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(idle_timeout_secs.unwrap_or(600)),
        )
        .await
    }

}

/// Haversine distance from `origin` to the profile row, in kilometers
fn push_distance_expr(builder: &mut QueryBuilder<'_, Postgres>, origin: GeoPoint) {
    builder.push(format!("(2 * {EARTH_RADIUS_KM} * ASIN(LEAST(1.0, SQRT("));
    builder.push("POWER(SIN(RADIANS(p.latitude - ");
    builder.push_bind(origin.latitude);
    builder.push(") / 2), 2) + COS(RADIANS(");
    builder.push_bind(origin.latitude);
    builder.push(")) * COS(RADIANS(p.latitude)) * POWER(SIN(RADIANS(p.longitude - ");
    builder.push_bind(origin.longitude);
    builder.push(") / 2), 2)))))");
}

fn push_exclusion(builder: &mut QueryBuilder<'_, Postgres>, exclude_profile_ids: &[i64]) {
    if !exclude_profile_ids.is_empty() {
        builder.push(" WHERE NOT (p.id = ANY(");
        builder.push_bind(exclude_profile_ids.to_vec());
        builder.push("))");
    }
}

#[async_trait]
impl DiscoveryStore for PostgresClient {
    async fn find_user(&self, user_id: i64) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, premium_expires_at, created_at, updated_at FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_profile_by_user(&self, user_id: i64) -> Result<Option<Profile>, StoreError> {
        let query = r#"
            SELECT id, user_id, name, photo, age, bio, latitude, longitude, created_at, updated_at
            FROM profiles
            WHERE user_id = $1
        "#;

        let profile = sqlx::query_as::<_, Profile>(query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(profile)
    }

    async fn profile_exists(&self, profile_id: i64) -> Result<bool, StoreError> {
        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM profiles WHERE id = $1)")
            .bind(profile_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    async fn swipes_by_user(&self, user_id: i64) -> Result<Vec<Swipe>, StoreError> {
        let query = r#"
            SELECT id, user_id, profile_id, decision, created_at, updated_at
            FROM swipes
            WHERE user_id = $1
            ORDER BY id ASC
        "#;

        let swipes = sqlx::query_as::<_, Swipe>(query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        tracing::debug!("User {} has {} recorded decisions", user_id, swipes.len());

        Ok(swipes)
    }

    async fn count_swipes_updated_between(
        &self,
        user_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<i64, StoreError> {
        let query = r#"
            SELECT COUNT(*)
            FROM swipes
            WHERE user_id = $1 AND updated_at >= $2 AND updated_at < $3
        "#;

        let count = sqlx::query_scalar::<_, i64>(query)
            .bind(user_id)
            .bind(start)
            .bind(end)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn query_candidates(&self, query: &CandidateQuery) -> Result<Page<CandidateRow>, StoreError> {
        let mut select = QueryBuilder::<Postgres>::new("SELECT ");
        select.push(CANDIDATE_COLUMNS);
        select.push(", ");
        match query.order {
            CandidateOrder::NearestTo(origin) => push_distance_expr(&mut select, origin),
            CandidateOrder::Random => {
                select.push("NULL::DOUBLE PRECISION");
            }
        }
        select.push(" AS distance_km");
        select.push(CANDIDATE_FROM);
        push_exclusion(&mut select, &query.exclude_profile_ids);
        match query.order {
            CandidateOrder::NearestTo(_) => select.push(" ORDER BY distance_km ASC, p.id ASC"),
            CandidateOrder::Random => select.push(" ORDER BY RANDOM()"),
        };
        select.push(" LIMIT ");
        select.push_bind(query.limit);
        select.push(" OFFSET ");
        select.push_bind(query.offset);

        let items = select
            .build_query_as::<CandidateRow>()
            .fetch_all(&self.pool)
            .await?;

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*)");
        count.push(CANDIDATE_FROM);
        push_exclusion(&mut count, &query.exclude_profile_ids);

        let total = count
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        Ok(Page { items, total })
    }

    /// Uses INSERT ... ON CONFLICT so the pair constraint, not a prior read,
    /// decides between insert and update.
    async fn upsert_swipe(&self, swipe: &NewSwipe) -> Result<Swipe, StoreError> {
        let stored = sqlx::query_as::<_, Swipe>(UPSERT_SWIPE_SQL)
            .bind(swipe.user_id)
            .bind(swipe.profile_id)
            .bind(swipe.decision)
            .bind(swipe.at)
            .fetch_one(&self.pool)
            .await?;

        tracing::debug!(
            "Recorded swipe: {} -> {} ({})",
            swipe.user_id,
            swipe.profile_id,
            swipe.decision
        );

        Ok(stored)
    }

    async fn update_location(
        &self,
        user_id: i64,
        latitude: f64,
        longitude: f64,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let query = r#"
            UPDATE profiles
            SET latitude = $2, longitude = $3, updated_at = $4
            WHERE user_id = $1
        "#;

        let result = sqlx::query(query)
            .bind(user_id)
            .bind(latitude)
            .bind(longitude)
            .bind(at)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn extend_premium(
        &self,
        user_id: i64,
        duration: ChronoDuration,
        at: DateTime<Utc>,
    ) -> Result<Option<DateTime<Utc>>, StoreError> {
        let expires_at = sqlx::query_scalar::<_, DateTime<Utc>>(EXTEND_PREMIUM_SQL)
            .bind(user_id)
            .bind(duration.num_seconds() as f64)
            .bind(at)
            .fetch_optional(&self.pool)
            .await?;

        Ok(expires_at)
    }

    /// Health check for the database connection
    async fn health_check(&self) -> Result<bool, StoreError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::Execute;

    #[test]
    fn test_distance_expression_binds_origin() {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT ");
        push_distance_expr(
            &mut builder,
            GeoPoint {
                latitude: 1.0,
                longitude: 2.0,
            },
        );

        let sql = builder.build().sql().to_string();
        assert!(sql.contains("ASIN(LEAST(1.0, SQRT("));
        assert!(sql.contains("$1") && sql.contains("$2") && sql.contains("$3"));
    }

    #[test]
    fn test_exclusion_skipped_when_empty() {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT 1");
        push_exclusion(&mut builder, &[]);
        assert_eq!(builder.build().sql(), "SELECT 1");

        let mut builder = QueryBuilder::<Postgres>::new("SELECT 1");
        push_exclusion(&mut builder, &[3, 4]);
        assert_eq!(builder.build().sql(), "SELECT 1 WHERE NOT (p.id = ANY($1))");
    }

    #[test]
    fn test_upsert_resolves_on_pair() {
        let sql = UPSERT_SWIPE_SQL.split_whitespace().collect::<Vec<_>>().join(" ");
        let (_, update) = sql.split_once("DO UPDATE SET").unwrap();

        assert!(sql.contains("ON CONFLICT (user_id, profile_id) DO UPDATE SET"));
        assert!(update.contains("decision = EXCLUDED.decision"));
        assert!(update.contains("updated_at = EXCLUDED.updated_at"));
        assert!(!update.contains("created_at ="));
    }

    #[test]
    fn test_premium_extension_is_single_statement() {
        let sql = EXTEND_PREMIUM_SQL.split_whitespace().collect::<Vec<_>>().join(" ");

        assert!(sql.starts_with("UPDATE users SET premium_expires_at = GREATEST(COALESCE(premium_expires_at, $3), $3)"));
        assert!(sql.ends_with("RETURNING premium_expires_at"));
    }
}
