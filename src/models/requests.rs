use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt::Display;
use std::str::FromStr;
use validator::Validate;

/// Query string of the discovery feed
///
/// An empty value (`?latitude=`) counts as absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiscoverQuery {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub page: Option<i64>,
    #[serde(default, alias = "page_size", rename = "pageSize", deserialize_with = "empty_as_none")]
    pub page_size: Option<i64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub longitude: Option<f64>,
}

fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| de::Error::custom(format!("cannot parse {raw:?}: {e}"))),
        _ => Ok(None),
    }
}

/// Request to record a decision on a profile
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SwipeRequest {
    #[validate(range(min = 1))]
    #[serde(alias = "profile_id", rename = "profileId")]
    pub profile_id: i64,
    #[validate(length(min = 1))]
    #[serde(alias = "swipe_type", rename = "decision")]
    pub decision: String,
}

/// Live location update
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateLocationRequest {
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
}
