//! The world clock: day phase and season derived from world time.
//!
//! World time is plain Unix seconds, so every replica that agrees on the
//! wall clock agrees on the phase and season without coordination. A day
//! in the world lasts 24 real minutes; a season lasts one real week, with
//! four seasons to the cycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use meridian_types::{DayPhase, Season, Weather};

use crate::weather::weather_at;

/// Seconds per in-world day (24 real minutes).
pub const DAY_CYCLE_SECS: i64 = 1440;

/// Seconds per season (one real week).
pub const SEASON_CYCLE_SECS: i64 = 604_800;

/// Return the day phase at a given world time.
pub fn day_phase_at(world_time: i64) -> DayPhase {
    let offset = world_time.rem_euclid(DAY_CYCLE_SECS);
    if offset < 360 {
        DayPhase::Dawn
    } else if offset < 1080 {
        DayPhase::Day
    } else if offset < 1260 {
        DayPhase::Dusk
    } else {
        DayPhase::Night
    }
}

/// Return the season at a given world time.
pub fn season_at(world_time: i64) -> Season {
    match (world_time.div_euclid(SEASON_CYCLE_SECS)).rem_euclid(4) {
        0 => Season::Spring,
        1 => Season::Summer,
        2 => Season::Autumn,
        _ => Season::Winter,
    }
}

/// The clock sub-tree of a world snapshot.
///
/// When two diverged replicas reconcile, the more advanced clock wins,
/// so the merged world never runs backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct WorldClock {
    /// World time in Unix seconds.
    pub world_time: i64,
    /// Current day phase, derived from `world_time`.
    pub day_phase: DayPhase,
    /// Current season, derived from `world_time`.
    pub season: Season,
    /// Current weather, derived from `world_time`.
    pub weather: Weather,
}

impl WorldClock {
    /// Build the clock state for a given world time.
    pub fn at(world_time: i64) -> Self {
        Self {
            world_time,
            day_phase: day_phase_at(world_time),
            season: season_at(world_time),
            weather: weather_at(world_time),
        }
    }

    /// Advance to wall-clock `now`. Time never moves backwards, so a
    /// replica fed a stale `now` keeps its current clock.
    #[must_use]
    pub fn advanced_to(self, now: DateTime<Utc>) -> Self {
        let world_time = now.timestamp().max(self.world_time);
        Self::at(world_time)
    }
}

#[cfg(test)]
#[allow(clippy::arithmetic_side_effects)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn phases_cover_the_day_cycle() {
        assert_eq!(day_phase_at(0), DayPhase::Dawn);
        assert_eq!(day_phase_at(359), DayPhase::Dawn);
        assert_eq!(day_phase_at(360), DayPhase::Day);
        assert_eq!(day_phase_at(1079), DayPhase::Day);
        assert_eq!(day_phase_at(1080), DayPhase::Dusk);
        assert_eq!(day_phase_at(1259), DayPhase::Dusk);
        assert_eq!(day_phase_at(1260), DayPhase::Night);
        assert_eq!(day_phase_at(1439), DayPhase::Night);
        assert_eq!(day_phase_at(1440), DayPhase::Dawn);
    }

    #[test]
    fn seasons_rotate_weekly() {
        assert_eq!(season_at(0), Season::Spring);
        assert_eq!(season_at(SEASON_CYCLE_SECS), Season::Summer);
        assert_eq!(season_at(2 * SEASON_CYCLE_SECS), Season::Autumn);
        assert_eq!(season_at(3 * SEASON_CYCLE_SECS), Season::Winter);
        assert_eq!(season_at(4 * SEASON_CYCLE_SECS), Season::Spring);
    }

    #[test]
    fn clock_never_runs_backwards() {
        let clock = WorldClock::at(1_000_000);
        let stale = Utc.timestamp_opt(999_000, 0).single().unwrap_or_default();
        assert_eq!(clock.advanced_to(stale).world_time, 1_000_000);
    }

    #[test]
    fn advancing_updates_derived_fields() {
        let clock = WorldClock::at(0);
        let later = Utc.timestamp_opt(360, 0).single().unwrap_or_default();
        let advanced = clock.advanced_to(later);
        assert_eq!(advanced.world_time, 360);
        assert_eq!(advanced.day_phase, DayPhase::Day);
    }
}
