use serde::{Deserialize, Serialize};
use crate::models::domain::CandidateView;
use crate::models::pagination::PageMeta;

/// Response for the discovery feed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoverResponse {
    pub data: Vec<CandidateView>,
    pub paginator: PageMeta,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

/// Record swipe response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwipeResponse {
    pub success: bool,
    #[serde(rename = "swipeId")]
    pub swipe_id: i64,
}

/// Premium purchase response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PremiumResponse {
    #[serde(rename = "premiumExpiresAt")]
    pub premium_expires_at: chrono::DateTime<chrono::Utc>,
}
