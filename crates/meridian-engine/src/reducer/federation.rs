//! Federation handlers: the peer world registry and the shared sky.

use meridian_events::{
    Event, FederationAnnouncePayload, FederationHandshakePayload, StarRegisterPayload,
};
use meridian_types::{FederationPeer, PeerStatus, StarId, StarRegistration};

use crate::snapshot::WorldSnapshot;

pub(super) fn announce(
    snapshot: &mut WorldSnapshot,
    event: &Event,
    payload: &FederationAnnouncePayload,
) {
    let peers = snapshot.federation_mut();
    let peer = peers
        .entry(payload.world.clone())
        .or_insert_with(|| FederationPeer {
            world: payload.world.clone(),
            url: None,
            announced_by: event.from.clone(),
            status: PeerStatus::Announced,
            updated_at: event.ts,
        });
    if let Some(url) = &payload.url {
        peer.url = Some(url.clone());
    }
    if event.ts > peer.updated_at {
        peer.updated_at = event.ts;
    }
}

pub(super) fn handshake(
    snapshot: &mut WorldSnapshot,
    event: &Event,
    payload: &FederationHandshakePayload,
) {
    let peers = snapshot.federation_mut();
    let peer = peers
        .entry(payload.world.clone())
        .or_insert_with(|| FederationPeer {
            world: payload.world.clone(),
            url: None,
            announced_by: event.from.clone(),
            status: PeerStatus::Announced,
            updated_at: event.ts,
        });
    peer.status = PeerStatus::Connected;
    if event.ts > peer.updated_at {
        peer.updated_at = event.ts;
    }
}

pub(super) fn star_register(
    snapshot: &mut WorldSnapshot,
    event: &Event,
    payload: &StarRegisterPayload,
) {
    let id = StarId::derived_with(&event.from, event.ts, &payload.star_name);
    snapshot.stars_mut().insert(
        id,
        StarRegistration {
            id,
            star_name: payload.star_name.clone(),
            constellation: payload.constellation.clone(),
            registered_by: event.from.clone(),
            ts: event.ts,
        },
    );
}
