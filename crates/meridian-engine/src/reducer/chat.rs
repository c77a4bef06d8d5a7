//! Chat handlers: say, shout, whisper, emote.
//!
//! All four kinds share one handler; the channel comes from the event
//! tag. Entry ids derive from `(channel, from, ts)` so replicas agree
//! on them and the merge dedups by id.

use meridian_events::{ChatPayload, Event, EventKind};
use meridian_types::{ChatChannel, ChatEntry, ChatId};

use crate::snapshot::{CHAT_CAP, WorldSnapshot};

pub(super) fn speak(snapshot: &mut WorldSnapshot, event: &Event, payload: &ChatPayload) {
    let channel = match &event.kind {
        EventKind::Shout(_) => ChatChannel::Shout,
        EventKind::Whisper(_) => ChatChannel::Whisper,
        EventKind::Emote(_) => ChatChannel::Emote,
        _ => ChatChannel::Say,
    };

    let entry = ChatEntry {
        id: ChatId::derived_with(&event.from, event.ts, channel.as_wire()),
        channel,
        from: event.from.clone(),
        to: payload.to.clone(),
        text: payload.text.clone(),
        ts: event.ts,
    };

    // Kept in (ts, id) order so late deliveries land where the
    // reconciler would put them.
    let chat = snapshot.chat_mut();
    let index = chat
        .binary_search_by_key(&(entry.ts, entry.id), |held| (held.ts, held.id))
        .unwrap_or_else(|index| index);
    chat.insert(index, entry);

    let excess = chat.len().saturating_sub(CHAT_CAP);
    if excess > 0 {
        chat.drain(..excess);
    }
}
