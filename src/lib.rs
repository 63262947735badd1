//! Lume Discovery - candidate discovery and swipe recording for Lume dating app
//!
//! The discovery feed hides the caller's own profile, every profile they
//! liked and anything they decided on today. Swipes are upserted per
//! (user, profile) pair and free accounts are held to a daily quota.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{
    format_distance, haversine_distance, CandidateSelector, EngineError, EngineSettings, SwipeRecorder,
};
pub use crate::models::{CandidateView, Decision, PageMeta, PageRequest};
