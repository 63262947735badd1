use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Account owning exactly one profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    #[serde(rename = "premiumExpiresAt")]
    pub premium_expires_at: Option<DateTime<Utc>>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Whether the subscription is active at `now`
    pub fn is_premium_at(&self, now: DateTime<Utc>) -> bool {
        is_premium(self.premium_expires_at, now)
    }
}

/// A user is premium iff the expiry is set and strictly in the future.
#[inline]
pub fn is_premium(premium_expires_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    premium_expires_at.is_some_and(|expires_at| expires_at > now)
}

/// The swipeable entity, one per user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Profile {
    pub id: i64,
    #[serde(rename = "userId")]
    pub user_id: i64,
    pub name: String,
    pub photo: String,
    pub age: i32,
    pub bio: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// A user's judgement on a profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(type_name = "swipe_decision", rename_all = "UPPERCASE")]
pub enum Decision {
    Like,
    Pass,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Like => "LIKE",
            Decision::Pass => "PASS",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("decision must be one of: LIKE, PASS (got {0:?})")]
pub struct ParseDecisionError(pub String);

impl FromStr for Decision {
    type Err = ParseDecisionError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_uppercase().as_str() {
            "LIKE" => Ok(Decision::Like),
            "PASS" => Ok(Decision::Pass),
            _ => Err(ParseDecisionError(value.to_string())),
        }
    }
}

/// Persisted decision row; unique per (user_id, profile_id)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Swipe {
    pub id: i64,
    #[serde(rename = "userId")]
    pub user_id: i64,
    #[serde(rename = "profileId")]
    pub profile_id: i64,
    pub decision: Decision,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// Upsert payload. `at` becomes `created_at` on insert and `updated_at` always.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewSwipe {
    pub user_id: i64,
    pub profile_id: i64,
    pub decision: Decision,
    pub at: DateTime<Utc>,
}

/// Validated caller position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// How candidate rows are ordered
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CandidateOrder {
    /// Fresh shuffle on every call; no cross-page stability
    Random,
    /// Ascending great-circle distance, ties by profile id
    NearestTo(GeoPoint),
}

/// Candidate query parameters
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateQuery {
    pub exclude_profile_ids: Vec<i64>,
    pub order: CandidateOrder,
    pub limit: i64,
    pub offset: i64,
}

/// Profile joined with its owner's premium state
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct CandidateRow {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub photo: String,
    pub age: i32,
    pub bio: String,
    pub latitude: f64,
    pub longitude: f64,
    pub premium_expires_at: Option<DateTime<Utc>>,
    /// Only populated under distance ranking
    pub distance_km: Option<f64>,
}

/// One page of rows plus the pre-pagination total
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
}

/// Candidate as presented to the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateView {
    pub id: i64,
    pub name: String,
    pub photo: String,
    pub age: i32,
    pub bio: String,
    pub verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_premium_requires_future_expiry() {
        let now = Utc::now();

        assert!(is_premium(Some(now + Duration::seconds(1)), now));
        assert!(!is_premium(Some(now), now));
        assert!(!is_premium(Some(now - Duration::days(1)), now));
        assert!(!is_premium(None, now));
    }

    #[test]
    fn test_decision_parsing() {
        assert_eq!("LIKE".parse::<Decision>(), Ok(Decision::Like));
        assert_eq!("pass".parse::<Decision>(), Ok(Decision::Pass));
        assert!("SUPERLIKE".parse::<Decision>().is_err());
    }

    #[test]
    fn test_decision_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Decision::Like).unwrap(), "\"LIKE\"");
        assert_eq!(Decision::Pass.to_string(), "PASS");
    }

    #[test]
    fn test_candidate_view_omits_missing_distance() {
        let view = CandidateView {
            id: 1,
            name: "Ana".to_string(),
            photo: String::new(),
            age: 27,
            bio: String::new(),
            verified: false,
            distance: None,
        };

        let json = serde_json::to_value(&view).unwrap();
        assert!(json.get("distance").is_none());
        assert_eq!(json["verified"], false);
    }
}
