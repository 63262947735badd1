// Model exports
pub mod domain;
pub mod pagination;
pub mod requests;
pub mod responses;

pub use domain::{
    is_premium, CandidateOrder, CandidateQuery, CandidateRow, CandidateView, Decision, GeoPoint,
    NewSwipe, Page, ParseDecisionError, Profile, Swipe, User,
};
pub use pagination::{PageMeta, PageRequest};
pub use requests::{DiscoverQuery, SwipeRequest, UpdateLocationRequest};
pub use responses::{DiscoverResponse, ErrorResponse, HealthResponse, PremiumResponse, SwipeResponse};
