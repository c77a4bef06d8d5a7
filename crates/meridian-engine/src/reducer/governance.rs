//! Constitutional amendments: propose, vote, close.
//!
//! The constitution puts hard limits on what an amendment may say: it
//! cannot strip citizen rights, close the source, require physical
//! movement for core play, make the protocol distinguish between kinds
//! of citizens, or punish citizens retroactively. Proposals whose text
//! trips any of these are rejected before they ever open for voting.
//!
//! Votes are weighted by the voter's Spark balance at vote time, with a
//! floor of one so a penniless citizen still counts. Closing is reserved
//! for the governance aggregator, which stamps the final result and
//! tally after the discussion window ends.

use chrono::Duration;
use rust_decimal::Decimal;

use meridian_events::{CloseAmendmentPayload, Event, ProposeAmendmentPayload, VoteAmendmentPayload};
use meridian_types::{
    Amendment, AmendmentId, AmendmentResult, AmendmentStatus, AmendmentTally, AmendmentVote,
    DISCUSSION_PERIOD_DAYS, VoteChoice,
};

use crate::snapshot::WorldSnapshot;

use super::reject;

/// The only sender allowed to close amendments.
pub const GOVERNANCE_ACTOR: &str = "MERIDIAN-GOVERNANCE";

/// Constitutional screening: `(trigger phrases, reason)`. A proposal whose
/// combined text contains any phrase is unconstitutional.
const FORBIDDEN_PATTERNS: [(&[&str], &str); 5] = [
    (
        &[
            "remove citizen rights",
            "remove the right",
            "revoke citizen rights",
            "revoke the right",
            "citizens have no right",
        ],
        "amendments cannot remove citizen rights",
    ),
    (
        &["close source", "closed source", "proprietary", "make code private"],
        "amendments cannot close the source code",
    ),
    (
        &[
            "require physical movement",
            "must physically move",
            "mandatory movement",
            "walking required",
        ],
        "amendments cannot require physical movement for core play",
    ),
    (
        &[
            "protocol must distinguish",
            "ai citizens are not",
            "human citizens only",
            "humans only",
        ],
        "amendments cannot make the protocol distinguish between kinds of citizens",
    ),
    (
        &["retroactive punishment", "retroactively punish", "punish for past"],
        "amendments cannot retroactively punish previously legal actions",
    ),
];

/// Scan combined proposal text for forbidden content.
fn forbidden_reason(text: &str) -> Option<&'static str> {
    let lowered = text.to_lowercase();
    for (phrases, reason) in FORBIDDEN_PATTERNS {
        if phrases.iter().any(|phrase| lowered.contains(phrase)) {
            return Some(reason);
        }
    }
    None
}

pub(super) fn propose(
    snapshot: &mut WorldSnapshot,
    event: &Event,
    payload: &ProposeAmendmentPayload,
) {
    if payload.title.trim().is_empty()
        || payload.description.trim().is_empty()
        || payload.diff_text.trim().is_empty()
    {
        reject(snapshot, event, "amendment needs a title, description and diff");
        return;
    }

    let combined = format!(
        "{} {} {}",
        payload.title, payload.description, payload.diff_text
    );
    if let Some(reason) = forbidden_reason(&combined) {
        reject(snapshot, event, reason);
        return;
    }

    let discussion_period_days = payload
        .discussion_period_days
        .unwrap_or(DISCUSSION_PERIOD_DAYS)
        .max(DISCUSSION_PERIOD_DAYS);
    let voting_closes_at = event
        .ts
        .checked_add_signed(Duration::days(i64::from(discussion_period_days)))
        .unwrap_or(event.ts);

    let id = AmendmentId::derived_with(&event.from, event.ts, &payload.title);
    snapshot.amendments_mut().insert(
        id,
        Amendment {
            id,
            title: payload.title.clone(),
            description: payload.description.clone(),
            diff_text: payload.diff_text.clone(),
            proposed_by: event.from.clone(),
            proposed_at: event.ts,
            discussion_period_days,
            voting_closes_at,
            status: AmendmentStatus::Open,
            votes: Vec::new(),
            result: None,
            tally: None,
            closed_at: None,
        },
    );
}

pub(super) fn vote(snapshot: &mut WorldSnapshot, event: &Event, payload: &VoteAmendmentPayload) {
    let Some(choice) = VoteChoice::from_wire(&payload.vote) else {
        reject(snapshot, event, "vote must be 'for' or 'against'");
        return;
    };

    let acceptable = snapshot
        .amendments
        .get(&payload.amendment_id)
        .map(|amendment| {
            if amendment.status != AmendmentStatus::Open {
                Err("amendment is closed")
            } else if event.ts > amendment.voting_closes_at {
                Err("voting window has expired")
            } else if amendment.has_voted(&event.from) {
                Err("already voted on this amendment")
            } else {
                Ok(())
            }
        });
    match acceptable {
        None => {
            reject(snapshot, event, "amendment not found");
            return;
        }
        Some(Err(reason)) => {
            reject(snapshot, event, reason);
            return;
        }
        Some(Ok(())) => {}
    }

    // Weight is the voter's balance at vote time, floored at one.
    let weight = snapshot.economy.balance(&event.from).max(Decimal::ONE);
    if let Some(amendment) = snapshot.amendments_mut().get_mut(&payload.amendment_id) {
        amendment.votes.push(AmendmentVote {
            from: event.from.clone(),
            choice,
            weight,
            ts: event.ts,
        });
    }
}

pub(super) fn close(snapshot: &mut WorldSnapshot, event: &Event, payload: &CloseAmendmentPayload) {
    if event.from.as_str() != GOVERNANCE_ACTOR {
        reject(snapshot, event, "only the governance aggregator may close amendments");
        return;
    }
    let Some(result) = AmendmentResult::from_wire(&payload.result) else {
        reject(snapshot, event, "result must be 'approved' or 'rejected'");
        return;
    };
    let open = snapshot
        .amendments
        .get(&payload.amendment_id)
        .is_some_and(|amendment| amendment.status == AmendmentStatus::Open);
    if !open {
        reject(snapshot, event, "no open amendment with that id");
        return;
    }

    if let Some(amendment) = snapshot.amendments_mut().get_mut(&payload.amendment_id) {
        let tally = payload.tally.as_ref().map_or_else(
            || amendment.compute_tally(),
            |tally| AmendmentTally {
                for_weight: tally.for_weight,
                against_weight: tally.against_weight,
                total_voters: tally.total_voters,
            },
        );
        amendment.status = AmendmentStatus::Closed;
        amendment.result = Some(result);
        amendment.closed_at = Some(event.ts);
        amendment.tally = Some(tally);
    }
}
