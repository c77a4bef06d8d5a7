//! Chat entries, workflow action records, and competitions.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{ActionStatus, ChatChannel, CompetitionStatus, Zone};
use crate::ids::{ActionId, ActorId, ChatId, CompetitionId};

// ---------------------------------------------------------------------------
// Chat
// ---------------------------------------------------------------------------

/// One entry in the chat log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ChatEntry {
    /// Deterministic id derived from `(channel, from, ts)` for merge dedup.
    pub id: ChatId,
    /// Delivery channel.
    pub channel: ChatChannel,
    /// The speaking actor.
    pub from: ActorId,
    /// Recipient, for whispers.
    pub to: Option<ActorId>,
    /// Message text.
    pub text: String,
    /// When it was said.
    pub ts: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Workflow action records
// ---------------------------------------------------------------------------

/// Kind-specific detail of a workflow action record.
///
/// Each variant is an explicit record rather than a loose field bag, so the
/// compiler checks every consumer when a new workflow appears.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ActionDetail {
    /// A proposed item exchange awaiting the counterparty.
    TradeOffer {
        /// Counterparty the offer is addressed to.
        to: ActorId,
        /// Item names the proposer offers.
        offered: Vec<String>,
        /// Item names the proposer wants in return.
        requested: Vec<String>,
    },
    /// A skill taught to another actor.
    Teach {
        /// The student.
        to: ActorId,
        /// Skill name.
        skill: String,
    },
    /// A skill the actor studied on their own.
    Learn {
        /// Skill name.
        skill: String,
    },
    /// An offer of mentorship.
    MentorOffer {
        /// The prospective mentee.
        to: ActorId,
        /// Topic of mentorship.
        topic: String,
    },
    /// Acceptance of a mentorship offer.
    MentorAccept {
        /// The accepted offer.
        offer: ActionId,
    },
    /// A close look at some entity; recorded for the audit trail.
    Inspect {
        /// Free-form target description.
        target: String,
    },
    /// A stated intention (set or cleared).
    Intention {
        /// The intention text; `None` records a clear.
        intention: Option<String>,
    },
    /// A steward moderation act in their zone.
    Moderation {
        /// Zone moderated.
        zone: Zone,
        /// Actor the act was directed at.
        target: ActorId,
        /// What the steward did (free-form).
        act: String,
    },
    /// A business-rule rejection kept for audit (e.g. failed `buy`).
    Rejected {
        /// Event kind that was rejected.
        event_kind: String,
        /// Why it was rejected.
        reason: String,
    },
}

/// A transient workflow record: trade offers, teaching, mentoring,
/// moderation, and rejection markers.
///
/// Status transitions `pending -> accepted/declined/forfeited` happen
/// within one actor's session; the reconciler keeps the first occurrence
/// per id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ActionRecord {
    /// Deterministic action identifier.
    pub id: ActionId,
    /// The originating actor.
    pub from: ActorId,
    /// Current lifecycle status.
    pub status: ActionStatus,
    /// Kind-specific detail.
    pub detail: ActionDetail,
    /// When the originating event happened.
    pub ts: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Competitions
// ---------------------------------------------------------------------------

/// A challenge between two actors with per-actor scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Competition {
    /// Deterministic competition identifier.
    pub id: CompetitionId,
    /// The actor who issued the challenge.
    pub challenger: ActorId,
    /// The challenged actor.
    pub opponent: ActorId,
    /// Name of the game being played (free-form).
    pub game: String,
    /// Lifecycle status.
    pub status: CompetitionStatus,
    /// Accumulated points per actor.
    pub scores: BTreeMap<ActorId, i64>,
    /// When the challenge was issued.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the most recent update; the merge conflict key.
    pub updated_at: DateTime<Utc>,
}

impl Competition {
    /// Add points for an actor, saturating at the i64 bounds.
    pub fn add_score(&mut self, actor: &ActorId, points: i64, ts: DateTime<Utc>) {
        let entry = self.scores.entry(actor.clone()).or_insert(0);
        *entry = entry.saturating_add(points);
        if ts > self.updated_at {
            self.updated_at = ts;
        }
    }
}
