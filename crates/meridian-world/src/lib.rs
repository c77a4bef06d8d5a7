//! World clock, weather and growth for the Meridian world engine.
//!
//! Everything here is a pure function of world time. Replicas that agree
//! on the wall clock derive identical day phases, seasons, weather and
//! garden ripeness with no coordination, which is what lets the
//! reconciler treat the clock as a simple "most advanced wins" scalar.
//!
//! - [`clock`] -- [`WorldClock`], day phase and season derivation.
//! - [`weather`] -- deterministic weighted weather.
//! - [`growth`] -- garden growth stage advancement.

pub mod clock;
pub mod growth;
pub mod weather;

pub use clock::{DAY_CYCLE_SECS, SEASON_CYCLE_SECS, WorldClock, day_phase_at, season_at};
pub use growth::advance_growth;
pub use weather::{WEATHER_EPOCH_SECS, weather_at};
