// Core engine exports
pub mod account;
pub mod calendar;
pub mod distance;
pub mod error;
pub mod exclusion;
pub mod recorder;
pub mod selector;

use chrono::{FixedOffset, Offset, Utc};
use std::time::Duration;

pub use account::AccountService;
pub use calendar::{Clock, DayWindow, FixedClock, SystemClock};
pub use distance::{format_distance, haversine_distance, resolve_origin, validate_coordinates};
pub use error::EngineError;
pub use exclusion::{build_exclusion_set, hides_profile};
pub use recorder::{ensure_within_quota, SwipeRecorder};
pub use selector::{CandidateSelector, DiscoverRequest, DiscoverResult};

/// Tunables shared by the selector, the recorder and the account service
#[derive(Debug, Clone, Copy)]
pub struct EngineSettings {
    pub max_page_size: u32,
    pub daily_swipe_limit: i64,
    pub premium_duration: chrono::Duration,
    /// Offset whose local midnight starts a new quota/cooldown day
    pub utc_offset: FixedOffset,
    pub operation_timeout: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            max_page_size: 100,
            daily_swipe_limit: 10,
            premium_duration: chrono::Duration::days(30),
            utc_offset: Utc.fix(),
            operation_timeout: Duration::from_secs(5),
        }
    }
}
