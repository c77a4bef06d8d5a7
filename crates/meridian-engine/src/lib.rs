//! The Meridian world engine.
//!
//! A world is a [`WorldSnapshot`]; history is a sequence of events. The
//! engine exposes three pure entry points:
//!
//! - [`apply_event`] folds one event into a snapshot,
//! - [`merge_snapshots`] reconciles two diverged replicas,
//! - [`advance_clock`] moves world time (and garden growth) forward.
//!
//! All three return new snapshots and share untouched sub-trees with
//! their inputs, so a long history of snapshots stays cheap to keep.

pub mod merge;
pub mod reducer;
pub mod snapshot;
pub mod tick;

pub use merge::merge_snapshots;
pub use reducer::{GOVERNANCE_ACTOR, apply_event};
pub use snapshot::{CHAT_CAP, STRUCTURE_CAP, WorldSnapshot};
pub use tick::advance_clock;
