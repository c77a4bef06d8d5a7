//! Event model and wire codec for the Meridian world engine.
//!
//! Everything that happens in a world is an [`Event`]: an immutable
//! envelope naming the actor, the time, an optional position, and a typed
//! [`EventKind`] payload. Replicas exchange events, apply them through
//! the reducer, and record each application as a [`ChangeRecord`] -- the
//! dedup key that lets diverged replicas reconcile without double-applying.
//!
//! # Design
//!
//! - Decoding is total. Unrecognized tags and malformed payloads become
//!   [`EventKind::Unknown`] rather than errors, so one bad client cannot
//!   wedge a replica's ingest loop.
//! - Every recognized kind carries an explicit payload record; there are
//!   no loosely typed field bags outside `Unknown`.

pub mod change;
pub mod envelope;
pub mod kind;

pub use change::ChangeRecord;
pub use envelope::{Event, MAX_TEXT_LEN};
pub use kind::{
    AnchorPlacePayload, BuildPayload, BuyPayload, ChallengeAnswerPayload, ChallengePayload,
    ChatPayload, CloseAmendmentPayload, ComposePayload, CraftPayload, CrmActionPayload,
    DiscoverPayload, ElectionFinalizePayload, ElectionStartPayload, ElectionVotePayload, EventKind,
    FederationAnnouncePayload, FederationHandshakePayload, GiftPayload, HarvestPayload,
    IdlePayload, InspectPayload, IntentionSetPayload, JoinPayload, LearnPayload,
    MentorAcceptPayload, MentorOfferPayload, MovePayload, PlantPayload, ProposeAmendmentPayload,
    ScorePayload, SellPayload, StarRegisterPayload, StewardModeratePayload, StewardPolicyPayload,
    StewardWelcomePayload, TeachPayload, TradeAnswerPayload, TradeOfferPayload,
    VoteAmendmentPayload, WarpForkPayload, WarpPayload, WireTally,
};
