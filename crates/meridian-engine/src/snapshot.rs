//! The world snapshot: the aggregate root every event folds into.
//!
//! Sub-trees live behind [`Arc`] so that applying an event clones only
//! the sub-trees it touches -- everything else is shared with the parent
//! snapshot. The reducer mutates through [`Arc::make_mut`], which copies
//! a sub-tree the first time it is written in a given application.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use meridian_events::ChangeRecord;
use meridian_ledger::EconomyState;
use meridian_types::{
    ActionRecord, ActorId, Amendment, AmendmentId, Anchor, AnchorId, ChatEntry, Competition,
    CompetitionId, Creation, CreationId, CrmState, Discovery, DiscoveryId, Election,
    FederationPeer, Garden, GardenId, PresenceRecord, StarId, StarRegistration, StewardRecord,
    Structure, StructureId, Zone,
};
use meridian_world::WorldClock;

/// Maximum chat log length; the oldest entries are evicted past this.
pub const CHAT_CAP: usize = 200;

/// Maximum number of structures; the oldest is evicted past this.
pub const STRUCTURE_CAP: usize = 200;

/// The complete state of one world at a point in its history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct WorldSnapshot {
    /// Monotone application counter; the merge picks the larger side.
    pub version: u64,
    /// Presence records by actor, never deleted.
    pub citizens: Arc<BTreeMap<ActorId, PresenceRecord>>,
    /// Balances, transaction log and marketplace.
    pub economy: Arc<EconomyState>,
    /// Chat log, oldest first, capped at [`CHAT_CAP`].
    pub chat: Arc<Vec<ChatEntry>>,
    /// Structures by id, capped at [`STRUCTURE_CAP`].
    pub structures: Arc<BTreeMap<StructureId, Structure>>,
    /// Planted gardens by id; harvest removes them.
    pub gardens: Arc<BTreeMap<GardenId, Garden>>,
    /// Discoveries by id.
    pub discoveries: Arc<BTreeMap<DiscoveryId, Discovery>>,
    /// Geographic anchors by id.
    pub anchors: Arc<BTreeMap<AnchorId, Anchor>>,
    /// Composed creations by id.
    pub creations: Arc<BTreeMap<CreationId, Creation>>,
    /// Workflow action records, sorted by `(ts, id)`.
    pub actions: Arc<Vec<ActionRecord>>,
    /// Competitions by id.
    pub competitions: Arc<BTreeMap<CompetitionId, Competition>>,
    /// Federated peer worlds by world name.
    pub federation: Arc<BTreeMap<String, FederationPeer>>,
    /// Registered stars by id.
    pub stars: Arc<BTreeMap<StarId, StarRegistration>>,
    /// Zone elections, one per zone at a time.
    pub elections: Arc<BTreeMap<Zone, Election>>,
    /// Installed stewards by zone.
    pub stewards: Arc<BTreeMap<Zone, StewardRecord>>,
    /// Constitutional amendments by id.
    pub amendments: Arc<BTreeMap<AmendmentId, Amendment>>,
    /// The embedded CRM simulation.
    pub crm: Arc<CrmState>,
    /// World time, day phase, season, weather.
    pub clock: WorldClock,
    /// The change log: one record per applied event, also the dedup set.
    pub changes: Arc<Vec<ChangeRecord>>,
}

impl WorldSnapshot {
    /// Create an empty world.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an event with this change record was already applied.
    pub fn has_applied(&self, record: &ChangeRecord) -> bool {
        self.changes.contains(record)
    }

    /// Presence record for an actor, created on first contact.
    ///
    /// Always advances `last_seen` to `ts`, so any event from an actor
    /// refreshes their liveness.
    pub fn citizen_mut(&mut self, actor: &ActorId, ts: DateTime<Utc>) -> &mut PresenceRecord {
        let citizens = Arc::make_mut(&mut self.citizens);
        let record = citizens
            .entry(actor.clone())
            .or_insert_with(|| PresenceRecord::first_seen(actor.clone(), ts));
        record.touch(ts);
        record
    }

    /// Mutable presence map.
    pub fn citizens_mut(&mut self) -> &mut BTreeMap<ActorId, PresenceRecord> {
        Arc::make_mut(&mut self.citizens)
    }

    /// Mutable economy sub-tree.
    pub fn economy_mut(&mut self) -> &mut EconomyState {
        Arc::make_mut(&mut self.economy)
    }

    /// Mutable chat log.
    pub fn chat_mut(&mut self) -> &mut Vec<ChatEntry> {
        Arc::make_mut(&mut self.chat)
    }

    /// Mutable structure map.
    pub fn structures_mut(&mut self) -> &mut BTreeMap<StructureId, Structure> {
        Arc::make_mut(&mut self.structures)
    }

    /// Mutable garden map.
    pub fn gardens_mut(&mut self) -> &mut BTreeMap<GardenId, Garden> {
        Arc::make_mut(&mut self.gardens)
    }

    /// Mutable discovery map.
    pub fn discoveries_mut(&mut self) -> &mut BTreeMap<DiscoveryId, Discovery> {
        Arc::make_mut(&mut self.discoveries)
    }

    /// Mutable anchor map.
    pub fn anchors_mut(&mut self) -> &mut BTreeMap<AnchorId, Anchor> {
        Arc::make_mut(&mut self.anchors)
    }

    /// Mutable creation map.
    pub fn creations_mut(&mut self) -> &mut BTreeMap<CreationId, Creation> {
        Arc::make_mut(&mut self.creations)
    }

    /// Mutable action record list.
    pub fn actions_mut(&mut self) -> &mut Vec<ActionRecord> {
        Arc::make_mut(&mut self.actions)
    }

    /// Mutable competition map.
    pub fn competitions_mut(&mut self) -> &mut BTreeMap<CompetitionId, Competition> {
        Arc::make_mut(&mut self.competitions)
    }

    /// Mutable federation registry.
    pub fn federation_mut(&mut self) -> &mut BTreeMap<String, FederationPeer> {
        Arc::make_mut(&mut self.federation)
    }

    /// Mutable star registry.
    pub fn stars_mut(&mut self) -> &mut BTreeMap<StarId, StarRegistration> {
        Arc::make_mut(&mut self.stars)
    }

    /// Mutable election map.
    pub fn elections_mut(&mut self) -> &mut BTreeMap<Zone, Election> {
        Arc::make_mut(&mut self.elections)
    }

    /// Mutable steward map.
    pub fn stewards_mut(&mut self) -> &mut BTreeMap<Zone, StewardRecord> {
        Arc::make_mut(&mut self.stewards)
    }

    /// Mutable amendment map.
    pub fn amendments_mut(&mut self) -> &mut BTreeMap<AmendmentId, Amendment> {
        Arc::make_mut(&mut self.amendments)
    }

    /// Mutable CRM simulation state.
    pub fn crm_mut(&mut self) -> &mut CrmState {
        Arc::make_mut(&mut self.crm)
    }

    /// Mutable change log.
    pub fn changes_mut(&mut self) -> &mut Vec<ChangeRecord> {
        Arc::make_mut(&mut self.changes)
    }
}

/// Evict the oldest structures (by `(built_at, id)`) past [`STRUCTURE_CAP`].
pub(crate) fn enforce_structure_cap(structures: &mut BTreeMap<StructureId, Structure>) {
    while structures.len() > STRUCTURE_CAP {
        let oldest = structures
            .values()
            .min_by_key(|structure| (structure.built_at, structure.id))
            .map(|structure| structure.id);
        match oldest {
            Some(id) => {
                structures.remove(&id);
            }
            None => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 5, 5, 0, 0)
            .single()
            .unwrap_or_default()
    }

    #[test]
    fn citizen_mut_creates_on_first_contact() {
        let mut snapshot = WorldSnapshot::new();
        let actor = ActorId::from("p1");
        let record = snapshot.citizen_mut(&actor, ts());
        assert_eq!(record.joined_at, ts());
        assert!(record.online);
        assert_eq!(snapshot.citizens.len(), 1);
    }

    #[test]
    fn untouched_sub_trees_stay_shared() {
        let mut a = WorldSnapshot::new();
        a.citizen_mut(&ActorId::from("p1"), ts());
        let mut b = a.clone();
        b.chat_mut().clear();

        // Writing chat must not have copied citizens.
        assert!(Arc::ptr_eq(&a.citizens, &b.citizens));
        assert!(!Arc::ptr_eq(&a.chat, &b.chat));
    }
}
