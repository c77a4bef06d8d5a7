//! Social handlers: teaching, mentorship, competitions, inspection.

use std::collections::BTreeMap;

use meridian_events::{
    ChallengeAnswerPayload, ChallengePayload, Event, InspectPayload, LearnPayload,
    MentorAcceptPayload, MentorOfferPayload, ScorePayload, TeachPayload,
};
use meridian_types::{
    ActionDetail, ActionId, ActionStatus, Competition, CompetitionId, CompetitionStatus,
};

use crate::snapshot::WorldSnapshot;

use super::{record_action, reject};

pub(super) fn teach(snapshot: &mut WorldSnapshot, event: &Event, payload: &TeachPayload) {
    record_action(
        snapshot,
        &event.from,
        event.ts,
        ActionId::derived_with(&event.from, event.ts, "teach"),
        ActionStatus::Accepted,
        ActionDetail::Teach {
            to: payload.to.clone(),
            skill: payload.skill.clone(),
        },
    );
}

pub(super) fn learn(snapshot: &mut WorldSnapshot, event: &Event, payload: &LearnPayload) {
    record_action(
        snapshot,
        &event.from,
        event.ts,
        ActionId::derived_with(&event.from, event.ts, "learn"),
        ActionStatus::Accepted,
        ActionDetail::Learn {
            skill: payload.skill.clone(),
        },
    );
}

pub(super) fn mentor_offer(
    snapshot: &mut WorldSnapshot,
    event: &Event,
    payload: &MentorOfferPayload,
) {
    record_action(
        snapshot,
        &event.from,
        event.ts,
        ActionId::derived_with(&event.from, event.ts, "mentor_offer"),
        ActionStatus::Pending,
        ActionDetail::MentorOffer {
            to: payload.to.clone(),
            topic: payload.topic.clone(),
        },
    );
}

pub(super) fn mentor_accept(
    snapshot: &mut WorldSnapshot,
    event: &Event,
    payload: &MentorAcceptPayload,
) {
    let found = snapshot
        .actions
        .iter()
        .position(|record| {
            record.id == payload.offer_id
                && record.status == ActionStatus::Pending
                && matches!(
                    &record.detail,
                    ActionDetail::MentorOffer { to, .. } if *to == event.from
                )
        });
    let Some(index) = found else {
        reject(snapshot, event, "no pending mentorship offer with that id");
        return;
    };

    if let Some(record) = snapshot.actions_mut().get_mut(index) {
        record.status = ActionStatus::Accepted;
    }
    record_action(
        snapshot,
        &event.from,
        event.ts,
        ActionId::derived_with(&event.from, event.ts, "mentor_accept"),
        ActionStatus::Accepted,
        ActionDetail::MentorAccept {
            offer: payload.offer_id,
        },
    );
}

pub(super) fn challenge(snapshot: &mut WorldSnapshot, event: &Event, payload: &ChallengePayload) {
    let id = CompetitionId::derived_with(&event.from, event.ts, &payload.game);
    snapshot.competitions_mut().insert(
        id,
        Competition {
            id,
            challenger: event.from.clone(),
            opponent: payload.to.clone(),
            game: payload.game.clone(),
            status: CompetitionStatus::Pending,
            scores: BTreeMap::new(),
            created_at: event.ts,
            updated_at: event.ts,
        },
    );
}

pub(super) fn accept_challenge(
    snapshot: &mut WorldSnapshot,
    event: &Event,
    payload: &ChallengeAnswerPayload,
) {
    let valid = snapshot
        .competitions
        .get(&payload.challenge_id)
        .is_some_and(|comp| {
            comp.status == CompetitionStatus::Pending && comp.opponent == event.from
        });
    if !valid {
        reject(snapshot, event, "no pending challenge addressed to you with that id");
        return;
    }
    if let Some(comp) = snapshot.competitions_mut().get_mut(&payload.challenge_id) {
        comp.status = CompetitionStatus::Active;
        if event.ts > comp.updated_at {
            comp.updated_at = event.ts;
        }
    }
}

pub(super) fn forfeit(
    snapshot: &mut WorldSnapshot,
    event: &Event,
    payload: &ChallengeAnswerPayload,
) {
    let valid = snapshot
        .competitions
        .get(&payload.challenge_id)
        .is_some_and(|comp| {
            comp.status != CompetitionStatus::Forfeited
                && (comp.challenger == event.from || comp.opponent == event.from)
        });
    if !valid {
        reject(snapshot, event, "not a participant in that competition");
        return;
    }
    if let Some(comp) = snapshot.competitions_mut().get_mut(&payload.challenge_id) {
        comp.status = CompetitionStatus::Forfeited;
        if event.ts > comp.updated_at {
            comp.updated_at = event.ts;
        }
    }
}

pub(super) fn score(snapshot: &mut WorldSnapshot, event: &Event, payload: &ScorePayload) {
    let valid = snapshot
        .competitions
        .get(&payload.challenge_id)
        .is_some_and(|comp| {
            comp.status == CompetitionStatus::Active
                && (comp.challenger == event.from || comp.opponent == event.from)
        });
    if !valid {
        reject(snapshot, event, "competition is not active for you");
        return;
    }
    if let Some(comp) = snapshot.competitions_mut().get_mut(&payload.challenge_id) {
        comp.add_score(&event.from, payload.points, event.ts);
    }
}

pub(super) fn inspect(snapshot: &mut WorldSnapshot, event: &Event, payload: &InspectPayload) {
    record_action(
        snapshot,
        &event.from,
        event.ts,
        ActionId::derived_with(&event.from, event.ts, "inspect"),
        ActionStatus::Accepted,
        ActionDetail::Inspect {
            target: payload.target.clone(),
        },
    );
}
