//! Presence records: who is in the world, where, and what they carry.
//!
//! Presence records are created on first contact with any event from an
//! actor and are never deleted -- `leave` only flips the online flag, so
//! history is preserved across sessions and merges.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::Zone;
use crate::ids::ActorId;

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// A point in world space, always bound to a zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, Default)]
#[ts(export, export_to = "bindings/")]
pub struct Position {
    /// East-west coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
    /// North-south coordinate.
    pub z: f64,
    /// The zone the point lies in; positions sent without one land in
    /// the nexus.
    #[serde(default)]
    pub zone: Zone,
}

impl Position {
    /// The origin of a zone (used for warp arrivals).
    pub const fn zone_origin(zone: Zone) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            zone,
        }
    }

    /// Whether all coordinates are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

// ---------------------------------------------------------------------------
// Inventory
// ---------------------------------------------------------------------------

/// One item held by an actor.
///
/// Items are matched by their `item` name during trade exchanges, so the
/// name is the item's type for exchange purposes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct InventoryItem {
    /// Item type name (recipe name, harvest species, listing item).
    pub item: String,
    /// When the actor acquired it.
    pub acquired_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// PresenceRecord
// ---------------------------------------------------------------------------

/// Everything the world knows about one actor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PresenceRecord {
    /// The actor this record belongs to.
    pub id: ActorId,
    /// Display name from the `join` payload, if one was given.
    pub name: Option<String>,
    /// Last reported position.
    pub position: Position,
    /// Whether the actor is currently online.
    pub online: bool,
    /// Timestamp of the most recent event from this actor. This is the
    /// last-writer-wins key during reconciliation.
    pub last_seen: DateTime<Utc>,
    /// Whether the actor has marked themselves idle.
    pub idle: bool,
    /// Items the actor carries, in acquisition order.
    pub inventory: Vec<InventoryItem>,
    /// Current stated intention, if any.
    pub intention: Option<String>,
    /// Name of the actor's home world (multi-world travel).
    pub home_world: Option<String>,
    /// Name of the world the actor is currently visiting, if away.
    pub current_world: Option<String>,
    /// When the actor first joined.
    pub joined_at: DateTime<Utc>,
}

impl PresenceRecord {
    /// Create a fresh record for an actor first seen at `ts`.
    pub fn first_seen(id: ActorId, ts: DateTime<Utc>) -> Self {
        Self {
            id,
            name: None,
            position: Position::default(),
            online: true,
            last_seen: ts,
            idle: false,
            inventory: Vec::new(),
            intention: None,
            home_world: None,
            current_world: None,
            joined_at: ts,
        }
    }

    /// Advance `last_seen` if `ts` is newer. Timestamps may arrive out of
    /// order across replicas; `last_seen` is monotone regardless.
    pub fn touch(&mut self, ts: DateTime<Utc>) {
        if ts > self.last_seen {
            self.last_seen = ts;
        }
    }

    /// Remove and return the first inventory item with the given name.
    pub fn take_item(&mut self, item: &str) -> Option<InventoryItem> {
        let index = self.inventory.iter().position(|held| held.item == item)?;
        // position() guarantees the index is in bounds.
        Some(self.inventory.remove(index))
    }

    /// Whether the actor holds at least one item with the given name.
    pub fn has_item(&self, item: &str) -> bool {
        self.inventory.iter().any(|held| held.item == item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(secs: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, secs)
            .single()
            .unwrap_or_default()
    }

    #[test]
    fn touch_is_monotone() {
        let mut record = PresenceRecord::first_seen(ActorId::from("p1"), ts(10));
        record.touch(ts(5));
        assert_eq!(record.last_seen, ts(10));
        record.touch(ts(20));
        assert_eq!(record.last_seen, ts(20));
    }

    #[test]
    fn take_item_removes_first_match_only() {
        let mut record = PresenceRecord::first_seen(ActorId::from("p1"), ts(0));
        record.inventory.push(InventoryItem {
            item: "rope".to_owned(),
            acquired_at: ts(1),
        });
        record.inventory.push(InventoryItem {
            item: "rope".to_owned(),
            acquired_at: ts(2),
        });

        let taken = record.take_item("rope");
        assert!(taken.is_some());
        assert_eq!(record.inventory.len(), 1);
        assert!(record.take_item("lantern").is_none());
    }

    #[test]
    fn zone_origin_is_finite() {
        assert!(Position::zone_origin(Zone::Arena).is_finite());
    }

    #[test]
    fn position_without_a_zone_parses_into_the_nexus() {
        let parsed: Option<Position> =
            serde_json::from_value(serde_json::json!({"x": 1.0, "y": 2.0, "z": 3.0})).ok();
        assert_eq!(parsed.map(|p| p.zone), Some(Zone::Nexus));
    }
}
