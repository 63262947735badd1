use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rand::seq::SliceRandom;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

use crate::core::distance::haversine_distance;
use crate::models::{CandidateOrder, CandidateQuery, CandidateRow, NewSwipe, Page, Profile, Swipe, User};
use crate::services::store::{DiscoveryStore, StoreError};

#[derive(Debug, Default)]
struct MemoryState {
    users: BTreeMap<i64, User>,
    profiles: BTreeMap<i64, Profile>,
    /// Keyed by (user_id, profile_id), which is the uniqueness constraint
    swipes: BTreeMap<(i64, i64), Swipe>,
    next_swipe_id: i64,
}

/// In-process store with the same contracts as the PostgreSQL one
///
/// Used by tests and for running the service without a database. A single
/// write lock makes every upsert atomic.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate an outage; every call then fails with `StoreError::Unavailable`
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn ensure_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store marked unavailable".to_string()));
        }
        Ok(())
    }

    pub async fn insert_user(&self, user: User) {
        self.state.write().await.users.insert(user.id, user);
    }

    /// Insert a profile, enforcing one profile per user and an existing owner
    pub async fn insert_profile(&self, profile: Profile) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        if !state.users.contains_key(&profile.user_id) {
            return Err(StoreError::ForeignKey(format!("user {} does not exist", profile.user_id)));
        }
        if state
            .profiles
            .values()
            .any(|existing| existing.user_id == profile.user_id && existing.id != profile.id)
        {
            return Err(StoreError::Database(format!(
                "user {} already has a profile",
                profile.user_id
            )));
        }
        state.profiles.insert(profile.id, profile);
        Ok(())
    }

    /// Snapshot of every stored swipe ordered by (user_id, profile_id)
    pub async fn swipes(&self) -> Vec<Swipe> {
        self.state.read().await.swipes.values().cloned().collect()
    }
}

fn candidate_row(profile: &Profile, owner: Option<&User>, order: CandidateOrder) -> CandidateRow {
    let distance_km = match order {
        CandidateOrder::NearestTo(origin) => Some(haversine_distance(
            origin.latitude,
            origin.longitude,
            profile.latitude,
            profile.longitude,
        )),
        CandidateOrder::Random => None,
    };

    CandidateRow {
        id: profile.id,
        user_id: profile.user_id,
        name: profile.name.clone(),
        photo: profile.photo.clone(),
        age: profile.age,
        bio: profile.bio.clone(),
        latitude: profile.latitude,
        longitude: profile.longitude,
        premium_expires_at: owner.and_then(|user| user.premium_expires_at),
        distance_km,
    }
}

fn order_rows(rows: &mut [CandidateRow], order: CandidateOrder) {
    match order {
        CandidateOrder::NearestTo(_) => rows.sort_by(|a, b| {
            a.distance_km
                .partial_cmp(&b.distance_km)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        }),
        CandidateOrder::Random => rows.shuffle(&mut rand::thread_rng()),
    }
}

#[async_trait]
impl DiscoveryStore for MemoryStore {
    async fn find_user(&self, user_id: i64) -> Result<Option<User>, StoreError> {
        self.ensure_available()?;
        Ok(self.state.read().await.users.get(&user_id).cloned())
    }

    async fn find_profile_by_user(&self, user_id: i64) -> Result<Option<Profile>, StoreError> {
        self.ensure_available()?;
        let state = self.state.read().await;
        Ok(state.profiles.values().find(|p| p.user_id == user_id).cloned())
    }

    async fn profile_exists(&self, profile_id: i64) -> Result<bool, StoreError> {
        self.ensure_available()?;
        Ok(self.state.read().await.profiles.contains_key(&profile_id))
    }

    async fn swipes_by_user(&self, user_id: i64) -> Result<Vec<Swipe>, StoreError> {
        self.ensure_available()?;
        let state = self.state.read().await;
        Ok(state
            .swipes
            .range((user_id, i64::MIN)..=(user_id, i64::MAX))
            .map(|(_, swipe)| swipe.clone())
            .collect())
    }

    async fn count_swipes_updated_between(
        &self,
        user_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<i64, StoreError> {
        self.ensure_available()?;
        let state = self.state.read().await;
        let count = state
            .swipes
            .range((user_id, i64::MIN)..=(user_id, i64::MAX))
            .filter(|(_, swipe)| swipe.updated_at >= start && swipe.updated_at < end)
            .count();
        Ok(count as i64)
    }

    async fn query_candidates(&self, query: &CandidateQuery) -> Result<Page<CandidateRow>, StoreError> {
        self.ensure_available()?;
        let state = self.state.read().await;
        let excluded: BTreeSet<i64> = query.exclude_profile_ids.iter().copied().collect();

        // Inner join: profiles whose owner is missing are not candidates
        let mut rows: Vec<CandidateRow> = state
            .profiles
            .values()
            .filter(|profile| !excluded.contains(&profile.id))
            .filter_map(|profile| {
                state
                    .users
                    .get(&profile.user_id)
                    .map(|owner| candidate_row(profile, Some(owner), query.order))
            })
            .collect();
        drop(state);

        let total = rows.len() as i64;
        order_rows(&mut rows, query.order);

        let offset = usize::try_from(query.offset.max(0)).unwrap_or(usize::MAX);
        let limit = usize::try_from(query.limit.max(0)).unwrap_or(usize::MAX);
        let items = rows.into_iter().skip(offset).take(limit).collect();

        Ok(Page { items, total })
    }

    async fn upsert_swipe(&self, swipe: &NewSwipe) -> Result<Swipe, StoreError> {
        self.ensure_available()?;
        let mut state = self.state.write().await;
        if !state.users.contains_key(&swipe.user_id) {
            return Err(StoreError::ForeignKey(format!("user {} does not exist", swipe.user_id)));
        }
        if !state.profiles.contains_key(&swipe.profile_id) {
            return Err(StoreError::ForeignKey(format!(
                "profile {} does not exist",
                swipe.profile_id
            )));
        }

        let key = (swipe.user_id, swipe.profile_id);
        if let Some(existing) = state.swipes.get_mut(&key) {
            existing.decision = swipe.decision;
            existing.updated_at = swipe.at;
            return Ok(existing.clone());
        }

        state.next_swipe_id += 1;
        let stored = Swipe {
            id: state.next_swipe_id,
            user_id: swipe.user_id,
            profile_id: swipe.profile_id,
            decision: swipe.decision,
            created_at: swipe.at,
            updated_at: swipe.at,
        };
        state.swipes.insert(key, stored.clone());
        Ok(stored)
    }

    async fn update_location(
        &self,
        user_id: i64,
        latitude: f64,
        longitude: f64,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        self.ensure_available()?;
        let mut state = self.state.write().await;
        match state.profiles.values_mut().find(|p| p.user_id == user_id) {
            Some(profile) => {
                profile.latitude = latitude;
                profile.longitude = longitude;
                profile.updated_at = at;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn extend_premium(
        &self,
        user_id: i64,
        duration: Duration,
        at: DateTime<Utc>,
    ) -> Result<Option<DateTime<Utc>>, StoreError> {
        self.ensure_available()?;
        let mut state = self.state.write().await;
        let Some(user) = state.users.get_mut(&user_id) else {
            return Ok(None);
        };

        let base = user.premium_expires_at.map_or(at, |current| current.max(at));
        let expires_at = base + duration;
        user.premium_expires_at = Some(expires_at);
        user.updated_at = at;
        Ok(Some(expires_at))
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        Ok(!self.unavailable.load(Ordering::SeqCst))
    }
}
