//! Presence handlers: arrivals, departures, movement, intentions.
//!
//! Presence records are created on first contact (the dispatcher does
//! this for every event) and never deleted -- `leave` only flips the
//! online flag.

use meridian_events::{
    Event, IdlePayload, IntentionSetPayload, JoinPayload, MovePayload, WarpForkPayload,
    WarpPayload,
};
use meridian_types::{ActionDetail, ActionId, ActionStatus, Position, Zone};

use crate::snapshot::WorldSnapshot;

use super::record_action;

/// Name actors return to when they come back from a forked world.
const HOME_WORLD: &str = "meridian";

pub(super) fn join(snapshot: &mut WorldSnapshot, event: &Event, payload: &JoinPayload) {
    let record = snapshot.citizen_mut(&event.from, event.ts);
    record.online = true;
    record.idle = false;
    if let Some(name) = &payload.name {
        record.name = Some(name.clone());
    }
    if let Some(position) = &event.position
        && position.is_finite()
    {
        record.position = position.clone();
    }
}

pub(super) fn leave(snapshot: &mut WorldSnapshot, event: &Event) {
    snapshot.citizen_mut(&event.from, event.ts).online = false;
}

pub(super) fn heartbeat(snapshot: &mut WorldSnapshot, event: &Event) {
    snapshot.citizen_mut(&event.from, event.ts).online = true;
}

pub(super) fn idle(snapshot: &mut WorldSnapshot, event: &Event, payload: &IdlePayload) {
    snapshot.citizen_mut(&event.from, event.ts).idle = payload.idle;
}

pub(super) fn relocate(snapshot: &mut WorldSnapshot, event: &Event, payload: &MovePayload) {
    let destination = payload.position.as_ref().or(event.position.as_ref());
    let record = snapshot.citizen_mut(&event.from, event.ts);
    record.online = true;
    if let Some(position) = destination
        && position.is_finite()
    {
        record.position = position.clone();
    }
}

pub(super) fn warp(snapshot: &mut WorldSnapshot, event: &Event, payload: &WarpPayload) {
    let zone = Zone::from_wire(&payload.zone).unwrap_or_else(|| {
        tracing::debug!(zone = %payload.zone, "unknown warp zone, falling back to nexus");
        Zone::Nexus
    });
    let record = snapshot.citizen_mut(&event.from, event.ts);
    record.online = true;
    record.position = Position::zone_origin(zone);
}

pub(super) fn warp_fork(snapshot: &mut WorldSnapshot, event: &Event, payload: &WarpForkPayload) {
    let record = snapshot.citizen_mut(&event.from, event.ts);
    record
        .home_world
        .get_or_insert_with(|| HOME_WORLD.to_owned());
    record.current_world = Some(payload.world.clone());
}

pub(super) fn return_home(snapshot: &mut WorldSnapshot, event: &Event) {
    let record = snapshot.citizen_mut(&event.from, event.ts);
    record.current_world = None;
    record.online = true;
}

pub(super) fn intention_set(
    snapshot: &mut WorldSnapshot,
    event: &Event,
    payload: &IntentionSetPayload,
) {
    snapshot.citizen_mut(&event.from, event.ts).intention = Some(payload.intention.clone());
    record_action(
        snapshot,
        &event.from,
        event.ts,
        ActionId::derived_with(&event.from, event.ts, "intention_set"),
        ActionStatus::Accepted,
        ActionDetail::Intention {
            intention: Some(payload.intention.clone()),
        },
    );
}

pub(super) fn intention_clear(snapshot: &mut WorldSnapshot, event: &Event) {
    snapshot.citizen_mut(&event.from, event.ts).intention = None;
    record_action(
        snapshot,
        &event.from,
        event.ts,
        ActionId::derived_with(&event.from, event.ts, "intention_clear"),
        ActionStatus::Accepted,
        ActionDetail::Intention { intention: None },
    );
}
