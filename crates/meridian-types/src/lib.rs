//! Shared type definitions for the Meridian world engine.
//!
//! This crate is the single source of truth for the data model shared
//! across the Meridian workspace. Types defined here flow downstream to
//! `TypeScript` via `ts-rs` for the presentation layer.
//!
//! # Modules
//!
//! - [`ids`] -- Actor identifiers and deterministic entity ID newtypes
//! - [`enums`] -- Enumerations (zones, environment, workflow, governance, CRM)
//! - [`presence`] -- Presence records, positions, inventories
//! - [`economy`] -- Transaction and marketplace listing records
//! - [`content`] -- Structures, gardens, discoveries, anchors, creations
//! - [`social`] -- Chat entries, workflow action records, competitions
//! - [`governance`] -- Federation, stars, elections, stewards, amendments
//! - [`crm`] -- The embedded CRM simulation records

pub mod content;
pub mod crm;
pub mod economy;
pub mod enums;
pub mod governance;
pub mod ids;
pub mod presence;
pub mod social;

// Re-export all public types at crate root for convenience.
pub use content::{Anchor, Creation, DEFAULT_GROWTH_SECS, Discovery, Garden, Structure};
pub use crm::{CrmAccount, CrmActivity, CrmContact, CrmNote, CrmOpportunity, CrmState};
pub use economy::{Listing, Transaction};
pub use enums::{
    ActionStatus, AmendmentResult, AmendmentStatus, ChatChannel, CompetitionStatus,
    CrmActivityType, DayPhase, ElectionStatus, PipelineStage, Season, VoteChoice, Weather, Zone,
};
pub use governance::{
    Amendment, AmendmentTally, AmendmentVote, DISCUSSION_PERIOD_DAYS, Election, FederationPeer,
    PeerStatus, STEWARD_TERM_DAYS, StarRegistration, StewardRecord,
};
pub use ids::{
    ActionId, ActorId, AmendmentId, AnchorId, ChatId, CompetitionId, CreationId, DiscoveryId,
    GardenId, ListingId, StarId, StructureId, TransactionId, derive_string_id,
};
pub use presence::{InventoryItem, Position, PresenceRecord};
pub use social::{ActionDetail, ActionRecord, ChatEntry, Competition};
