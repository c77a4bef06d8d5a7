//! The event reducer: `apply_event(snapshot, event) -> snapshot`.
//!
//! The reducer is pure and total. It never mutates its input, never
//! fails, and never panics: duplicate deliveries return the snapshot
//! unchanged, unknown kinds pass through as change-log-only no-ops, and
//! business-rule rejections (overdrafts, unripe harvests, non-stewards
//! moderating) become `Failed` action records instead of errors.
//!
//! Each handler family lives in its own module; this module owns the
//! dedup check and the dispatch.

mod chat;
mod civics;
mod content;
mod crm;
mod federation;
mod governance;
mod presence;
mod social;
mod trade;

pub use governance::GOVERNANCE_ACTOR;

use chrono::{DateTime, Utc};

use meridian_events::{Event, EventKind};
use meridian_types::{ActionDetail, ActionId, ActionRecord, ActionStatus, ActorId};

use crate::snapshot::WorldSnapshot;

/// Apply one event to a snapshot, producing the successor snapshot.
///
/// Duplicates (same `(kind, from, ts)` as an already-applied event) are
/// ignored. Every non-duplicate application adds exactly one change
/// record and bumps the version, whatever else the event did or did not
/// change. The change log stays sorted by `(ts, from, kind)` even when
/// events arrive out of timestamp order, so a snapshot is always a fixed
/// point of the reconciler.
pub fn apply_event(snapshot: &WorldSnapshot, event: &Event) -> WorldSnapshot {
    let record = event.change_record();
    if snapshot.has_applied(&record) {
        tracing::debug!(kind = %record.kind, from = %record.from, "duplicate event ignored");
        return snapshot.clone();
    }

    let mut next = snapshot.clone();

    // Any event from an actor is a sign of life.
    if !event.from.is_empty() {
        next.citizen_mut(&event.from, event.ts);
    }

    dispatch(&mut next, event);

    let changes = next.changes_mut();
    let index = match changes.binary_search(&record) {
        Ok(index) | Err(index) => index,
    };
    changes.insert(index, record);
    next.version = next.version.saturating_add(1);
    next
}

fn dispatch(snapshot: &mut WorldSnapshot, event: &Event) {
    match &event.kind {
        EventKind::Join(p) => presence::join(snapshot, event, p),
        EventKind::Leave => presence::leave(snapshot, event),
        EventKind::Heartbeat => presence::heartbeat(snapshot, event),
        EventKind::Idle(p) => presence::idle(snapshot, event, p),
        EventKind::Move(p) => presence::relocate(snapshot, event, p),
        EventKind::Warp(p) => presence::warp(snapshot, event, p),
        EventKind::WarpFork(p) => presence::warp_fork(snapshot, event, p),
        EventKind::ReturnHome => presence::return_home(snapshot, event),
        EventKind::IntentionSet(p) => presence::intention_set(snapshot, event, p),
        EventKind::IntentionClear => presence::intention_clear(snapshot, event),

        EventKind::Say(p) | EventKind::Shout(p) | EventKind::Whisper(p) | EventKind::Emote(p) => {
            chat::speak(snapshot, event, p);
        }

        EventKind::Build(p) => content::build(snapshot, event, p),
        EventKind::Plant(p) => content::plant(snapshot, event, p),
        EventKind::Harvest(p) => content::harvest(snapshot, event, p),
        EventKind::Craft(p) => content::craft(snapshot, event, p),
        EventKind::Compose(p) => content::compose(snapshot, event, p),
        EventKind::Discover(p) => content::discover(snapshot, event, p),
        EventKind::AnchorPlace(p) => content::anchor_place(snapshot, event, p),

        EventKind::TradeOffer(p) => trade::offer(snapshot, event, p),
        EventKind::TradeAccept(p) => trade::accept(snapshot, event, p),
        EventKind::TradeDecline(p) => trade::decline(snapshot, event, p),
        EventKind::Gift(p) => trade::gift(snapshot, event, p),
        EventKind::Sell(p) => trade::sell(snapshot, event, p),
        EventKind::Buy(p) => trade::buy(snapshot, event, p),

        EventKind::Teach(p) => social::teach(snapshot, event, p),
        EventKind::Learn(p) => social::learn(snapshot, event, p),
        EventKind::MentorOffer(p) => social::mentor_offer(snapshot, event, p),
        EventKind::MentorAccept(p) => social::mentor_accept(snapshot, event, p),
        EventKind::Challenge(p) => social::challenge(snapshot, event, p),
        EventKind::AcceptChallenge(p) => social::accept_challenge(snapshot, event, p),
        EventKind::Forfeit(p) => social::forfeit(snapshot, event, p),
        EventKind::Score(p) => social::score(snapshot, event, p),
        EventKind::Inspect(p) => social::inspect(snapshot, event, p),

        EventKind::FederationAnnounce(p) => federation::announce(snapshot, event, p),
        EventKind::FederationHandshake(p) => federation::handshake(snapshot, event, p),
        EventKind::StarRegister(p) => federation::star_register(snapshot, event, p),

        EventKind::ElectionStart(p) => civics::election_start(snapshot, event, p),
        EventKind::ElectionVote(p) => civics::election_vote(snapshot, event, p),
        EventKind::ElectionFinalize(p) => civics::election_finalize(snapshot, event, p),
        EventKind::StewardSetWelcome(p) => civics::set_welcome(snapshot, event, p),
        EventKind::StewardSetPolicy(p) => civics::set_policy(snapshot, event, p),
        EventKind::StewardModerate(p) => civics::moderate(snapshot, event, p),

        EventKind::ProposeAmendment(p) => governance::propose(snapshot, event, p),
        EventKind::VoteAmendment(p) => governance::vote(snapshot, event, p),
        EventKind::CloseAmendment(p) => governance::close(snapshot, event, p),

        EventKind::SimCrmAction(p) => crm::apply(snapshot, event, &p.action, &p.data),

        EventKind::Unknown { kind, .. } => {
            tracing::debug!(kind = %kind, "unknown event kind, change log only");
        }
    }
}

/// Record a business-rule rejection as a `Failed` action.
///
/// The id derives from the event tag as well as actor and time, so two
/// different rejected kinds at the same instant do not collide.
pub(crate) fn reject(snapshot: &mut WorldSnapshot, event: &Event, reason: &str) {
    let kind = event.kind.tag().to_owned();
    tracing::debug!(kind = %kind, from = %event.from, reason, "event rejected");
    insert_action(
        snapshot,
        ActionRecord {
            id: ActionId::derived_with(&event.from, event.ts, &kind),
            from: event.from.clone(),
            status: ActionStatus::Failed,
            detail: ActionDetail::Rejected {
                event_kind: kind,
                reason: reason.to_owned(),
            },
            ts: event.ts,
        },
    );
}

/// Record a completed one-shot action (teach, learn, inspect...).
pub(crate) fn record_action(
    snapshot: &mut WorldSnapshot,
    from: &ActorId,
    ts: DateTime<Utc>,
    id: ActionId,
    status: ActionStatus,
    detail: ActionDetail,
) {
    insert_action(
        snapshot,
        ActionRecord {
            id,
            from: from.clone(),
            status,
            detail,
            ts,
        },
    );
}

/// Insert an action record in `(ts, id)` order, matching the order the
/// reconciler emits.
fn insert_action(snapshot: &mut WorldSnapshot, record: ActionRecord) {
    let actions = snapshot.actions_mut();
    let index = actions
        .binary_search_by_key(&(record.ts, record.id), |action| (action.ts, action.id))
        .unwrap_or_else(|index| index);
    actions.insert(index, record);
}
