//! Zone elections and stewardship.
//!
//! A zone runs at most one open election at a time. Finalizing tallies
//! the plurality winner (ties resolve to the earliest-seen candidate)
//! and installs them as steward for a thirty-day term. Steward powers --
//! welcome message, policy, moderation -- are gated on the sender being
//! the zone's current steward within their term.

use std::collections::BTreeMap;

use chrono::Duration;

use meridian_events::{
    ElectionFinalizePayload, ElectionStartPayload, ElectionVotePayload, Event,
    StewardModeratePayload, StewardPolicyPayload, StewardWelcomePayload,
};
use meridian_types::{
    ActionDetail, ActionId, ActionStatus, ActorId, Election, ElectionStatus, STEWARD_TERM_DAYS,
    StewardRecord, Zone,
};

use crate::snapshot::WorldSnapshot;

use super::{record_action, reject};

fn parse_zone(snapshot: &mut WorldSnapshot, event: &Event, tag: &str) -> Option<Zone> {
    let zone = Zone::from_wire(tag);
    if zone.is_none() {
        reject(snapshot, event, &format!("unknown zone '{tag}'"));
    }
    zone
}

pub(super) fn election_start(
    snapshot: &mut WorldSnapshot,
    event: &Event,
    payload: &ElectionStartPayload,
) {
    let Some(zone) = parse_zone(snapshot, event, &payload.zone) else {
        return;
    };
    let already_open = snapshot
        .elections
        .get(&zone)
        .is_some_and(|election| election.status == ElectionStatus::Open);
    if already_open {
        tracing::debug!(%zone, "election already open, start ignored");
        return;
    }
    snapshot.elections_mut().insert(
        zone,
        Election {
            zone,
            started_by: event.from.clone(),
            started_at: event.ts,
            status: ElectionStatus::Open,
            votes: BTreeMap::new(),
            candidates: Vec::new(),
            winner: None,
            updated_at: event.ts,
        },
    );
}

pub(super) fn election_vote(
    snapshot: &mut WorldSnapshot,
    event: &Event,
    payload: &ElectionVotePayload,
) {
    let Some(zone) = parse_zone(snapshot, event, &payload.zone) else {
        return;
    };
    let recorded = snapshot
        .elections_mut()
        .get_mut(&zone)
        .is_some_and(|election| {
            election.record_vote(event.from.clone(), payload.candidate.clone(), event.ts)
        });
    if !recorded {
        reject(snapshot, event, "no open election accepting this vote");
    }
}

pub(super) fn election_finalize(
    snapshot: &mut WorldSnapshot,
    event: &Event,
    payload: &ElectionFinalizePayload,
) {
    let Some(zone) = parse_zone(snapshot, event, &payload.zone) else {
        return;
    };
    let open = snapshot
        .elections
        .get(&zone)
        .is_some_and(|election| election.status == ElectionStatus::Open);
    if !open {
        reject(snapshot, event, "no open election in that zone");
        return;
    }

    let winner = snapshot
        .elections_mut()
        .get_mut(&zone)
        .and_then(|election| {
            election.status = ElectionStatus::Finalized;
            if event.ts > election.updated_at {
                election.updated_at = event.ts;
            }
            election.winner = election.plurality_winner();
            election.winner.clone()
        });

    // An election nobody voted in installs nobody.
    if let Some(steward) = winner {
        let term_ends_at = event
            .ts
            .checked_add_signed(Duration::days(STEWARD_TERM_DAYS))
            .unwrap_or(event.ts);
        snapshot.stewards_mut().insert(
            zone,
            StewardRecord {
                zone,
                steward,
                installed_at: event.ts,
                term_ends_at,
                welcome: None,
                policy: None,
            },
        );
    }
}

/// Whether `actor` is the sitting steward of `zone` at the event time.
fn is_steward(snapshot: &WorldSnapshot, zone: Zone, actor: &ActorId, event: &Event) -> bool {
    snapshot.stewards.get(&zone).is_some_and(|record| {
        record.steward == *actor && event.ts <= record.term_ends_at
    })
}

pub(super) fn set_welcome(
    snapshot: &mut WorldSnapshot,
    event: &Event,
    payload: &StewardWelcomePayload,
) {
    let Some(zone) = parse_zone(snapshot, event, &payload.zone) else {
        return;
    };
    if !is_steward(snapshot, zone, &event.from, event) {
        reject(snapshot, event, "only the sitting steward may set the welcome");
        return;
    }
    if let Some(record) = snapshot.stewards_mut().get_mut(&zone) {
        record.welcome = Some(payload.message.clone());
    }
}

pub(super) fn set_policy(
    snapshot: &mut WorldSnapshot,
    event: &Event,
    payload: &StewardPolicyPayload,
) {
    let Some(zone) = parse_zone(snapshot, event, &payload.zone) else {
        return;
    };
    if !is_steward(snapshot, zone, &event.from, event) {
        reject(snapshot, event, "only the sitting steward may set the policy");
        return;
    }
    if let Some(record) = snapshot.stewards_mut().get_mut(&zone) {
        record.policy = Some(payload.policy.clone());
    }
}

pub(super) fn moderate(
    snapshot: &mut WorldSnapshot,
    event: &Event,
    payload: &StewardModeratePayload,
) {
    let Some(zone) = parse_zone(snapshot, event, &payload.zone) else {
        return;
    };
    if !is_steward(snapshot, zone, &event.from, event) {
        reject(snapshot, event, "only the sitting steward may moderate");
        return;
    }
    record_action(
        snapshot,
        &event.from,
        event.ts,
        ActionId::derived_with(&event.from, event.ts, "steward_moderate"),
        ActionStatus::Accepted,
        ActionDetail::Moderation {
            zone,
            target: payload.target.clone(),
            act: payload.action.clone(),
        },
    );
}
