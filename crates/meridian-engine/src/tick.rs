//! Clock advancement, outside the reducer.
//!
//! Time is not an event: replicas advance their own clocks from the wall
//! clock and the reconciler keeps whichever is further along. Advancing
//! also grows gardens, since growth is a pure function of time.

use chrono::{DateTime, Utc};

use meridian_world::advance_growth;

use crate::snapshot::WorldSnapshot;

/// Advance the world clock (and garden growth) to `now`.
///
/// Pure like the reducer: returns a successor snapshot, sharing every
/// sub-tree it does not touch. The gardens sub-tree is copied only when
/// some garden is still growing.
pub fn advance_clock(snapshot: &WorldSnapshot, now: DateTime<Utc>) -> WorldSnapshot {
    let mut next = snapshot.clone();
    next.clock = next.clock.advanced_to(now);

    if snapshot.gardens.values().any(|garden| !garden.ready) {
        for garden in next.gardens_mut().values_mut() {
            advance_growth(garden, now);
        }
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::sync::Arc;

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_750_000_000_i64.saturating_add(secs), 0)
            .single()
            .unwrap_or_default()
    }

    #[test]
    fn advancing_shares_untouched_sub_trees() {
        let world = WorldSnapshot::new();
        let later = advance_clock(&world, ts(600));
        assert!(later.clock.world_time >= world.clock.world_time);
        // No gardens to grow, so the sub-tree is still shared.
        assert!(Arc::ptr_eq(&world.gardens, &later.gardens));
        assert!(Arc::ptr_eq(&world.citizens, &later.citizens));
    }
}
