//! Governance records: federation registry, star registry, zone elections,
//! stewardship, and constitutional amendments.
//!
//! Amendment semantics follow the constitution's voting rules: a seven-day
//! minimum discussion window, one vote per citizen, vote weight equal to
//! the voter's Spark balance at vote time (minimum 1), and approval only
//! above half of the total weighted votes.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{AmendmentResult, AmendmentStatus, ElectionStatus, VoteChoice, Zone};
use crate::ids::{ActorId, AmendmentId, StarId};

/// Minimum discussion period for amendments, in days.
pub const DISCUSSION_PERIOD_DAYS: u32 = 7;

/// Length of a steward's term after winning an election, in days.
pub const STEWARD_TERM_DAYS: i64 = 30;

// ---------------------------------------------------------------------------
// Federation
// ---------------------------------------------------------------------------

/// Connection state of a federated peer world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum PeerStatus {
    /// Announced but not yet handshaken.
    Announced,
    /// Handshake completed.
    Connected,
}

/// A peer world in the federation registry, keyed by world name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct FederationPeer {
    /// The peer world's name.
    pub world: String,
    /// Public endpoint, when announced.
    pub url: Option<String>,
    /// The actor who announced or handshook the peer.
    pub announced_by: ActorId,
    /// Connection state.
    pub status: PeerStatus,
    /// Timestamp of the most recent registry update; the merge conflict key.
    pub updated_at: DateTime<Utc>,
}

/// A star registered in the shared sky, via `star_register`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct StarRegistration {
    /// Deterministic star identifier.
    pub id: StarId,
    /// Name given to the star.
    pub star_name: String,
    /// Constellation it was filed under, if any.
    pub constellation: Option<String>,
    /// The registering actor.
    pub registered_by: ActorId,
    /// When it was registered.
    pub ts: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Elections and stewardship
// ---------------------------------------------------------------------------

/// A running or finalized election for the stewardship of a zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Election {
    /// Zone the election is for.
    pub zone: Zone,
    /// The actor who called the election.
    pub started_by: ActorId,
    /// When the election opened.
    pub started_at: DateTime<Utc>,
    /// Lifecycle status.
    pub status: ElectionStatus,
    /// One recorded vote per voter: voter to candidate.
    pub votes: BTreeMap<ActorId, ActorId>,
    /// Candidates in first-vote order. Plurality ties resolve to the
    /// earliest-seen candidate, so this order is part of the outcome.
    pub candidates: Vec<ActorId>,
    /// Winner, once finalized.
    pub winner: Option<ActorId>,
    /// Timestamp of the most recent update; the merge conflict key.
    pub updated_at: DateTime<Utc>,
}

impl Election {
    /// Record one vote per voter; resubmission is ignored.
    ///
    /// Returns `true` if the vote was recorded.
    pub fn record_vote(&mut self, voter: ActorId, candidate: ActorId, ts: DateTime<Utc>) -> bool {
        if self.status != ElectionStatus::Open || self.votes.contains_key(&voter) {
            return false;
        }
        if !self.candidates.contains(&candidate) {
            self.candidates.push(candidate.clone());
        }
        self.votes.insert(voter, candidate);
        if ts > self.updated_at {
            self.updated_at = ts;
        }
        true
    }

    /// Tally votes and return the plurality winner.
    ///
    /// Ties resolve to the candidate seen first, which is deterministic
    /// because the candidate list preserves first-vote order.
    pub fn plurality_winner(&self) -> Option<ActorId> {
        let mut counts: BTreeMap<&ActorId, u64> = BTreeMap::new();
        for candidate in self.votes.values() {
            let count = counts.entry(candidate).or_insert(0);
            *count = count.saturating_add(1);
        }

        let mut best: Option<(&ActorId, u64)> = None;
        for candidate in &self.candidates {
            let count = counts.get(candidate).copied().unwrap_or(0);
            let beats = match best {
                Some((_, best_count)) => count > best_count,
                None => true,
            };
            if beats {
                best = Some((candidate, count));
            }
        }
        best.map(|(candidate, _)| candidate.clone())
    }
}

/// The installed steward of a zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct StewardRecord {
    /// The stewarded zone.
    pub zone: Zone,
    /// The steward.
    pub steward: ActorId,
    /// When the steward took office.
    pub installed_at: DateTime<Utc>,
    /// When the term ends.
    pub term_ends_at: DateTime<Utc>,
    /// Welcome message shown to arrivals, set by the steward.
    pub welcome: Option<String>,
    /// Zone policy text, set by the steward.
    pub policy: Option<String>,
}

// ---------------------------------------------------------------------------
// Amendments
// ---------------------------------------------------------------------------

/// One recorded vote on an amendment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AmendmentVote {
    /// The voter.
    pub from: ActorId,
    /// Their position.
    pub choice: VoteChoice,
    /// Spark weight at vote time (minimum 1).
    #[ts(as = "String")]
    pub weight: Decimal,
    /// When the vote was cast.
    pub ts: DateTime<Utc>,
}

/// Final weighted tally of a closed amendment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, Default)]
#[ts(export, export_to = "bindings/")]
pub struct AmendmentTally {
    /// Total weight of votes in favour.
    #[ts(as = "String")]
    pub for_weight: Decimal,
    /// Total weight of votes against.
    #[ts(as = "String")]
    pub against_weight: Decimal,
    /// Number of distinct voters.
    pub total_voters: u64,
}

/// A constitutional amendment proposal and its voting record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Amendment {
    /// Deterministic amendment identifier.
    pub id: AmendmentId,
    /// Short title.
    pub title: String,
    /// Full amendment text and rationale.
    pub description: String,
    /// Diff-style text showing the proposed change.
    pub diff_text: String,
    /// The proposing actor.
    pub proposed_by: ActorId,
    /// When it was proposed.
    pub proposed_at: DateTime<Utc>,
    /// Actual discussion period (never below the constitutional minimum).
    pub discussion_period_days: u32,
    /// When the voting window closes.
    pub voting_closes_at: DateTime<Utc>,
    /// Lifecycle status.
    pub status: AmendmentStatus,
    /// Recorded votes, one per citizen.
    pub votes: Vec<AmendmentVote>,
    /// Final result, once closed.
    pub result: Option<AmendmentResult>,
    /// Final tally, once closed.
    pub tally: Option<AmendmentTally>,
    /// When it was closed.
    pub closed_at: Option<DateTime<Utc>>,
}

impl Amendment {
    /// Whether the given actor has already voted.
    pub fn has_voted(&self, actor: &ActorId) -> bool {
        self.votes.iter().any(|v| v.from == *actor)
    }

    /// Compute the weighted tally from the recorded votes.
    pub fn compute_tally(&self) -> AmendmentTally {
        let mut for_weight = Decimal::ZERO;
        let mut against_weight = Decimal::ZERO;
        for vote in &self.votes {
            match vote.choice {
                VoteChoice::For => for_weight = for_weight.saturating_add(vote.weight),
                VoteChoice::Against => {
                    against_weight = against_weight.saturating_add(vote.weight);
                }
            }
        }
        AmendmentTally {
            for_weight,
            against_weight,
            total_voters: u64::try_from(self.votes.len()).unwrap_or(u64::MAX),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(secs: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 8, 0, secs)
            .single()
            .unwrap_or_default()
    }

    fn election() -> Election {
        Election {
            zone: Zone::Nexus,
            started_by: ActorId::from("p1"),
            started_at: ts(0),
            status: ElectionStatus::Open,
            votes: BTreeMap::new(),
            candidates: Vec::new(),
            winner: None,
            updated_at: ts(0),
        }
    }

    #[test]
    fn one_vote_per_voter() {
        let mut e = election();
        assert!(e.record_vote(ActorId::from("v1"), ActorId::from("alice"), ts(1)));
        assert!(!e.record_vote(ActorId::from("v1"), ActorId::from("bob"), ts(2)));
        assert_eq!(e.votes.len(), 1);
    }

    #[test]
    fn plurality_winner_wins() {
        let mut e = election();
        e.record_vote(ActorId::from("v1"), ActorId::from("alice"), ts(1));
        e.record_vote(ActorId::from("v2"), ActorId::from("alice"), ts(2));
        e.record_vote(ActorId::from("v3"), ActorId::from("bob"), ts(3));
        assert_eq!(e.plurality_winner(), Some(ActorId::from("alice")));
    }

    #[test]
    fn tie_resolves_to_first_seen_candidate() {
        let mut e = election();
        e.record_vote(ActorId::from("v1"), ActorId::from("zed"), ts(1));
        e.record_vote(ActorId::from("v2"), ActorId::from("alice"), ts(2));
        // 1-1 tie; "zed" was seen first and must win despite sorting last.
        assert_eq!(e.plurality_winner(), Some(ActorId::from("zed")));
    }

    #[test]
    fn tally_weights_votes() {
        let amendment = Amendment {
            id: AmendmentId::derived(&ActorId::from("p1"), ts(0)),
            title: "t".to_owned(),
            description: "d".to_owned(),
            diff_text: "x".to_owned(),
            proposed_by: ActorId::from("p1"),
            proposed_at: ts(0),
            discussion_period_days: DISCUSSION_PERIOD_DAYS,
            voting_closes_at: ts(59),
            status: AmendmentStatus::Open,
            votes: vec![
                AmendmentVote {
                    from: ActorId::from("v1"),
                    choice: VoteChoice::For,
                    weight: Decimal::new(10, 0),
                    ts: ts(1),
                },
                AmendmentVote {
                    from: ActorId::from("v2"),
                    choice: VoteChoice::Against,
                    weight: Decimal::ONE,
                    ts: ts(2),
                },
            ],
            result: None,
            tally: None,
            closed_at: None,
        };

        let tally = amendment.compute_tally();
        assert_eq!(tally.for_weight, Decimal::new(10, 0));
        assert_eq!(tally.against_weight, Decimal::ONE);
        assert_eq!(tally.total_voters, 2);
    }
}
