//! Garden growth.
//!
//! Growth stage is a pure function of time since planting, so replicas
//! never disagree about ripeness: a garden grows from 0 to 1 over its
//! `growth_time_secs` and flips `ready` exactly once.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use meridian_types::Garden;

/// Recompute a garden's growth stage as of `now`.
///
/// Ready gardens stay ready; growth never regresses when fed a stale
/// `now`.
pub fn advance_growth(garden: &mut Garden, now: DateTime<Utc>) {
    if garden.ready {
        return;
    }
    let elapsed = now
        .signed_duration_since(garden.planted_at)
        .num_seconds()
        .max(0);
    let total = garden.growth_time_secs.max(1);
    let stage = Decimal::from(elapsed)
        .checked_div(Decimal::from(total))
        .unwrap_or(Decimal::ZERO)
        .min(Decimal::ONE);
    garden.growth_stage = garden.growth_stage.max(stage);
    if garden.growth_stage >= Decimal::ONE {
        garden.ready = true;
    }
}

#[cfg(test)]
#[allow(clippy::arithmetic_side_effects)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use meridian_types::{ActorId, GardenId, Zone};

    fn planted_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 4, 1, 8, 0, 0)
            .single()
            .unwrap_or_default()
    }

    fn garden() -> Garden {
        Garden {
            id: GardenId::new(),
            plot: "east bed".to_owned(),
            species: "moonflower".to_owned(),
            planted_by: ActorId::from("p1"),
            zone: Zone::Gardens,
            planted_at: planted_at(),
            growth_stage: Decimal::ZERO,
            growth_time_secs: 100,
            ready: false,
        }
    }

    #[test]
    fn grows_linearly() {
        let mut garden = garden();
        advance_growth(&mut garden, planted_at() + Duration::seconds(50));
        assert_eq!(garden.growth_stage, Decimal::new(5, 1));
        assert!(!garden.ready);
    }

    #[test]
    fn ripens_at_full_growth() {
        let mut garden = garden();
        advance_growth(&mut garden, planted_at() + Duration::seconds(100));
        assert_eq!(garden.growth_stage, Decimal::ONE);
        assert!(garden.ready);
    }

    #[test]
    fn stale_clock_never_regresses_growth() {
        let mut garden = garden();
        advance_growth(&mut garden, planted_at() + Duration::seconds(80));
        let stage = garden.growth_stage;
        advance_growth(&mut garden, planted_at() + Duration::seconds(40));
        assert_eq!(garden.growth_stage, stage);
    }

    #[test]
    fn overgrown_caps_at_one() {
        let mut garden = garden();
        advance_growth(&mut garden, planted_at() + Duration::seconds(10_000));
        assert_eq!(garden.growth_stage, Decimal::ONE);
        assert!(garden.ready);
    }
}
