use std::collections::BTreeSet;

use crate::core::calendar::DayWindow;
use crate::models::{Decision, Swipe};

/// Whether a prior decision hides its profile from the feed.
///
/// A LIKE hides the profile permanently. Any decision touched today (including
/// a PASS) hides it until the day rolls over.
#[inline]
pub fn hides_profile(swipe: &Swipe, today: &DayWindow) -> bool {
    swipe.decision == Decision::Like || today.contains(swipe.updated_at)
}

/// Profile ids that must not be surfaced to the caller.
///
/// Seeded with the caller's own profile, then extended from the caller's full
/// decision history. Sorted so identical histories produce identical queries.
pub fn build_exclusion_set(own_profile_id: i64, swipes: &[Swipe], today: &DayWindow) -> BTreeSet<i64> {
    let mut excluded = BTreeSet::new();
    excluded.insert(own_profile_id);

    excluded.extend(
        swipes
            .iter()
            .filter(|swipe| hides_profile(swipe, today))
            .map(|swipe| swipe.profile_id),
    );

    excluded
}
