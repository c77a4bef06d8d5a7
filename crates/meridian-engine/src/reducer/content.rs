//! Content handlers: structures, gardens, harvest, crafting, compositions,
//! discoveries, anchors.

use rust_decimal::Decimal;

use meridian_events::{
    AnchorPlacePayload, BuildPayload, ComposePayload, CraftPayload, DiscoverPayload, Event,
    HarvestPayload, PlantPayload,
};
use meridian_ledger::{TREASURY, tax};
use meridian_types::{
    ActorId, Anchor, AnchorId, Creation, CreationId, DEFAULT_GROWTH_SECS, Discovery, DiscoveryId,
    Garden, GardenId, InventoryItem, Structure, StructureId, Transaction, TransactionId, Zone,
};

use crate::snapshot::{WorldSnapshot, enforce_structure_cap};

use super::{crm, reject};

/// The zone an event happened in: the envelope position's zone when
/// given, otherwise wherever the actor last was.
fn zone_of(snapshot: &WorldSnapshot, event: &Event) -> Zone {
    event.position.as_ref().map_or_else(
        || {
            snapshot
                .citizens
                .get(&event.from)
                .map_or(Zone::Nexus, |record| record.position.zone)
        },
        |position| position.zone,
    )
}

pub(super) fn build(snapshot: &mut WorldSnapshot, event: &Event, payload: &BuildPayload) {
    // A build addressed to an embedded simulation is not a placement.
    if let Some(sim) = &payload.sim {
        if sim == "crm" {
            let action = payload.action.clone().unwrap_or_default();
            let data = payload.data.clone().unwrap_or_default();
            crm::apply(snapshot, event, &action, &data);
        } else {
            reject(snapshot, event, &format!("unknown simulation '{sim}'"));
        }
        return;
    }

    let kind = payload
        .structure
        .clone()
        .unwrap_or_else(|| "structure".to_owned());
    let zone = zone_of(snapshot, event);
    let id = StructureId::derived_with(&event.from, event.ts, &kind);
    snapshot.structures_mut().insert(
        id,
        Structure {
            id,
            kind,
            builder: event.from.clone(),
            zone,
            position: event.position.clone(),
            built_at: event.ts,
        },
    );

    enforce_structure_cap(snapshot.structures_mut());
}

pub(super) fn plant(snapshot: &mut WorldSnapshot, event: &Event, payload: &PlantPayload) {
    let species = payload
        .species
        .clone()
        .unwrap_or_else(|| "seedling".to_owned());
    let zone = zone_of(snapshot, event);
    let id = GardenId::derived_with(&event.from, event.ts, &payload.plot);
    snapshot.gardens_mut().insert(
        id,
        Garden {
            id,
            plot: payload.plot.clone(),
            species,
            planted_by: event.from.clone(),
            zone,
            planted_at: event.ts,
            growth_stage: Decimal::ZERO,
            growth_time_secs: DEFAULT_GROWTH_SECS,
            ready: false,
        },
    );
}

pub(super) fn harvest(snapshot: &mut WorldSnapshot, event: &Event, payload: &HarvestPayload) {
    // First ready garden in the plot, in id order, so replicas pick the
    // same one even when unripe gardens share the plot.
    let mut plot_has_gardens = false;
    let mut found = None;
    for (id, garden) in snapshot.gardens.iter() {
        if garden.plot != payload.plot {
            continue;
        }
        plot_has_gardens = true;
        if garden.is_ready(event.ts) {
            found = Some(*id);
            break;
        }
    }

    let Some(garden_id) = found else {
        if plot_has_gardens {
            reject(snapshot, event, &format!("garden in plot '{}' is not ready", payload.plot));
        } else {
            reject(snapshot, event, &format!("no garden in plot '{}'", payload.plot));
        }
        return;
    };

    let Some(garden) = snapshot.gardens_mut().remove(&garden_id) else {
        return;
    };

    snapshot
        .citizen_mut(&event.from, event.ts)
        .inventory
        .push(InventoryItem {
            item: garden.species.clone(),
            acquired_at: event.ts,
        });

    // One Spark per harvest, less the progressive tax to the treasury.
    let economy = snapshot.economy_mut();
    let balance = economy.balance(&event.from);
    let (net, withheld) = tax::split(Decimal::ONE, balance);
    economy.credit(&event.from, net);
    if withheld > Decimal::ZERO {
        economy.credit(&ActorId::from(TREASURY), withheld);
    }
    economy.record(Transaction {
        id: TransactionId::derived_with(&event.from, event.ts, "harvest"),
        kind: "harvest".to_owned(),
        from: event.from.clone(),
        to: None,
        amount: Some(net),
        item: Some(garden.species),
        ts: event.ts,
    });
}

pub(super) fn craft(snapshot: &mut WorldSnapshot, event: &Event, payload: &CraftPayload) {
    snapshot
        .citizen_mut(&event.from, event.ts)
        .inventory
        .push(InventoryItem {
            item: payload.recipe.clone(),
            acquired_at: event.ts,
        });
    snapshot.economy_mut().record(Transaction {
        id: TransactionId::derived_with(&event.from, event.ts, "craft"),
        kind: "craft".to_owned(),
        from: event.from.clone(),
        to: None,
        amount: None,
        item: Some(payload.recipe.clone()),
        ts: event.ts,
    });
}

pub(super) fn compose(snapshot: &mut WorldSnapshot, event: &Event, payload: &ComposePayload) {
    let title = payload
        .title
        .clone()
        .unwrap_or_else(|| "untitled".to_owned());
    let kind = payload.kind.clone().unwrap_or_else(|| "piece".to_owned());
    let zone = zone_of(snapshot, event);
    let id = CreationId::derived_with(&event.from, event.ts, &title);
    snapshot.creations_mut().insert(
        id,
        Creation {
            id,
            title,
            kind,
            creator: event.from.clone(),
            zone,
            ts: event.ts,
        },
    );
}

pub(super) fn discover(snapshot: &mut WorldSnapshot, event: &Event, payload: &DiscoverPayload) {
    let name = payload
        .name
        .clone()
        .or_else(|| payload.exploration.clone())
        .unwrap_or_else(|| "curiosity".to_owned());
    let zone = zone_of(snapshot, event);
    let id = DiscoveryId::derived_with(&event.from, event.ts, &name);
    snapshot.discoveries_mut().insert(
        id,
        Discovery {
            id,
            name,
            description: payload.description.clone().unwrap_or_default(),
            discoverer: event.from.clone(),
            zone,
            ts: event.ts,
        },
    );
}

pub(super) fn anchor_place(
    snapshot: &mut WorldSnapshot,
    event: &Event,
    payload: &AnchorPlacePayload,
) {
    if !payload.lat.is_finite() || !payload.lon.is_finite() {
        reject(snapshot, event, "anchor coordinates must be finite");
        return;
    }
    let zone = zone_of(snapshot, event);
    let id = AnchorId::derived_with(&event.from, event.ts, &payload.name);
    snapshot.anchors_mut().insert(
        id,
        Anchor {
            id,
            name: payload.name.clone(),
            owner: event.from.clone(),
            lat: payload.lat,
            lon: payload.lon,
            zone,
            placed_at: event.ts,
        },
    );
}
