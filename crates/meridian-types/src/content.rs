//! World content entities: structures, gardens, discoveries, anchors, and
//! compositions.
//!
//! Every content entity carries a deterministic id, an owning actor, a
//! creation timestamp, and a zone. The timestamp doubles as the conflict
//! key when the reconciler sees the same id on both sides of a merge.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::Zone;
use crate::ids::{ActorId, AnchorId, CreationId, DiscoveryId, GardenId, StructureId};
use crate::presence::Position;

/// Default seconds for a planted garden to reach full growth.
pub const DEFAULT_GROWTH_SECS: i64 = 3600;

/// A structure placed in the world by `build`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Structure {
    /// Deterministic structure identifier.
    pub id: StructureId,
    /// Structure type name from the build payload (free-form).
    pub kind: String,
    /// The actor who built it.
    pub builder: ActorId,
    /// Zone it stands in.
    pub zone: Zone,
    /// Exact placement, when the event carried a position.
    pub position: Option<Position>,
    /// When it was built.
    pub built_at: DateTime<Utc>,
}

/// A planted plot awaiting harvest, created by `plant`.
///
/// Harvest removes the garden and yields one item of `species`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Garden {
    /// Deterministic garden identifier.
    pub id: GardenId,
    /// Plot name from the plant payload.
    pub plot: String,
    /// Species planted; also the name of the harvested item.
    pub species: String,
    /// The actor who planted it.
    pub planted_by: ActorId,
    /// Zone of the plot.
    pub zone: Zone,
    /// When it was planted.
    pub planted_at: DateTime<Utc>,
    /// Growth progress from 0 to 1, advanced by the world clock.
    #[ts(as = "String")]
    pub growth_stage: Decimal,
    /// Seconds from planting to full growth.
    pub growth_time_secs: i64,
    /// Explicit readiness flag, set when growth completes.
    pub ready: bool,
}

impl Garden {
    /// Whether the garden can be harvested at `now`.
    ///
    /// Ready when the flag is set, growth has completed, or enough wall
    /// time has elapsed since planting -- whichever is observed first.
    pub fn is_ready(&self, now: DateTime<Utc>) -> bool {
        if self.ready || self.growth_stage >= Decimal::ONE {
            return true;
        }
        match self.planted_at.checked_add_signed(Duration::seconds(self.growth_time_secs)) {
            Some(ready_at) => now >= ready_at,
            None => false,
        }
    }
}

/// A named discovery recorded by `discover`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Discovery {
    /// Deterministic discovery identifier.
    pub id: DiscoveryId,
    /// Name of what was found.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// The discovering actor.
    pub discoverer: ActorId,
    /// Zone where it was found.
    pub zone: Zone,
    /// When it was found.
    pub ts: DateTime<Utc>,
}

/// A geographic anchor tying a world point to a real-world coordinate,
/// placed by `anchor_place`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Anchor {
    /// Deterministic anchor identifier.
    pub id: AnchorId,
    /// Anchor name.
    pub name: String,
    /// The placing actor.
    pub owner: ActorId,
    /// Real-world latitude.
    pub lat: f64,
    /// Real-world longitude.
    pub lon: f64,
    /// Zone of the in-world point.
    pub zone: Zone,
    /// When it was placed.
    pub placed_at: DateTime<Utc>,
}

/// A composed creation (music, writing, art) recorded by `compose`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Creation {
    /// Deterministic creation identifier.
    pub id: CreationId,
    /// Title of the work.
    pub title: String,
    /// Medium or kind of the work (free-form).
    pub kind: String,
    /// The creating actor.
    pub creator: ActorId,
    /// Zone where it was composed.
    pub zone: Zone,
    /// When it was composed.
    pub ts: DateTime<Utc>,
}
