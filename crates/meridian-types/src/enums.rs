//! Enumeration types for the Meridian world engine.
//!
//! Wire tags follow the protocol's lowercase snake_case convention so
//! enumerations round-trip through the JSON event stream and state files
//! unchanged.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Zones
// ---------------------------------------------------------------------------

/// A named region of the world.
///
/// Zones are fixed; a `warp` to an unknown zone falls back to [`Zone::Nexus`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS, Default,
)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum Zone {
    /// The central arrival plaza.
    #[default]
    Nexus,
    /// Cultivated plots for planting and harvesting.
    Gardens,
    /// The library and teaching halls.
    Athenaeum,
    /// Workshops for composing and crafting.
    Studio,
    /// Untamed land for exploration and discovery.
    Wilds,
    /// The marketplace.
    Agora,
    /// Shared civic space for governance.
    Commons,
    /// Competition grounds.
    Arena,
}

impl Zone {
    /// Parse a zone from its wire tag. Returns `None` for unknown names.
    pub fn from_wire(tag: &str) -> Option<Self> {
        match tag {
            "nexus" => Some(Self::Nexus),
            "gardens" => Some(Self::Gardens),
            "athenaeum" => Some(Self::Athenaeum),
            "studio" => Some(Self::Studio),
            "wilds" => Some(Self::Wilds),
            "agora" => Some(Self::Agora),
            "commons" => Some(Self::Commons),
            "arena" => Some(Self::Arena),
            _ => None,
        }
    }

    /// Return the zone's wire tag.
    pub const fn as_wire(self) -> &'static str {
        match self {
            Self::Nexus => "nexus",
            Self::Gardens => "gardens",
            Self::Athenaeum => "athenaeum",
            Self::Studio => "studio",
            Self::Wilds => "wilds",
            Self::Agora => "agora",
            Self::Commons => "commons",
            Self::Arena => "arena",
        }
    }
}

impl core::fmt::Display for Zone {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.as_wire())
    }
}

// ---------------------------------------------------------------------------
// Environment
// ---------------------------------------------------------------------------

/// Phase of the 24-minute world day.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS, Default,
)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum DayPhase {
    /// World hours 0-6.
    #[default]
    Dawn,
    /// World hours 6-18.
    Day,
    /// World hours 18-21.
    Dusk,
    /// World hours 21-24.
    Night,
}

/// Current weather, regenerated deterministically every five minutes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS, Default,
)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum Weather {
    /// Clear skies (most common).
    #[default]
    Clear,
    /// Overcast.
    Cloudy,
    /// Rain.
    Rain,
    /// Storm.
    Storm,
    /// Snow.
    Snow,
    /// Fog.
    Fog,
}

/// Season, cycling every four real-time weeks.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS, Default,
)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum Season {
    /// Week 0 of the cycle.
    #[default]
    Spring,
    /// Week 1.
    Summer,
    /// Week 2.
    Autumn,
    /// Week 3.
    Winter,
}

// ---------------------------------------------------------------------------
// Communication
// ---------------------------------------------------------------------------

/// Delivery channel of a chat entry.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum ChatChannel {
    /// Local speech, heard within the zone.
    Say,
    /// World-wide broadcast.
    Shout,
    /// Private message to one recipient.
    Whisper,
    /// Emote / action text.
    Emote,
}

impl ChatChannel {
    /// Return the channel's wire tag (also the originating event kind).
    pub const fn as_wire(self) -> &'static str {
        match self {
            Self::Say => "say",
            Self::Shout => "shout",
            Self::Whisper => "whisper",
            Self::Emote => "emote",
        }
    }
}

// ---------------------------------------------------------------------------
// Workflow actions
// ---------------------------------------------------------------------------

/// Lifecycle status of a workflow action record.
///
/// Records begin `Pending` and transition at most once. `Failed` marks a
/// business-rule rejection (e.g. insufficient balance) kept for audit.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum ActionStatus {
    /// Awaiting a counterparty response.
    Pending,
    /// Accepted and applied.
    Accepted,
    /// Declined by the counterparty.
    Declined,
    /// Forfeited by the originator.
    Forfeited,
    /// Rejected by a business rule; no protected state was mutated.
    Failed,
}

// ---------------------------------------------------------------------------
// Competitions
// ---------------------------------------------------------------------------

/// Status of a challenge between two actors.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum CompetitionStatus {
    /// Issued but not yet accepted.
    Pending,
    /// Accepted; scores may be recorded.
    Active,
    /// A participant forfeited.
    Forfeited,
}

// ---------------------------------------------------------------------------
// Governance
// ---------------------------------------------------------------------------

/// A voter's position on an amendment.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum VoteChoice {
    /// In favour.
    For,
    /// Opposed.
    Against,
}

impl VoteChoice {
    /// Parse a vote from its wire tag (`"for"` / `"against"`).
    pub fn from_wire(tag: &str) -> Option<Self> {
        match tag {
            "for" => Some(Self::For),
            "against" => Some(Self::Against),
            _ => None,
        }
    }
}

/// Lifecycle status of an amendment.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum AmendmentStatus {
    /// In its discussion window; votes are accepted.
    Open,
    /// Closed with a final result and tally.
    Closed,
}

/// Final outcome of a closed amendment.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum AmendmentResult {
    /// More than half of the weighted votes were in favour.
    Approved,
    /// Anything else.
    Rejected,
}

impl AmendmentResult {
    /// Parse a result from its wire tag.
    pub fn from_wire(tag: &str) -> Option<Self> {
        match tag {
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

/// Lifecycle status of a zone election.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum ElectionStatus {
    /// Accepting votes.
    Open,
    /// Tallied; the winner has been installed as steward.
    Finalized,
}

// ---------------------------------------------------------------------------
// CRM simulation
// ---------------------------------------------------------------------------

/// Sales pipeline stage of a CRM opportunity.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum PipelineStage {
    /// Initial outreach.
    Prospecting,
    /// Qualified lead.
    Qualification,
    /// Proposal delivered.
    Proposal,
    /// Terms under negotiation.
    Negotiation,
    /// Won; the deal is closed.
    ClosedWon,
    /// Lost; the deal is closed.
    ClosedLost,
}

impl PipelineStage {
    /// Parse a stage from its wire tag.
    pub fn from_wire(tag: &str) -> Option<Self> {
        match tag {
            "prospecting" => Some(Self::Prospecting),
            "qualification" => Some(Self::Qualification),
            "proposal" => Some(Self::Proposal),
            "negotiation" => Some(Self::Negotiation),
            "closed_won" => Some(Self::ClosedWon),
            "closed_lost" => Some(Self::ClosedLost),
            _ => None,
        }
    }

    /// Default win probability (percent) associated with the stage.
    pub const fn probability(self) -> u8 {
        match self {
            Self::Prospecting => 10,
            Self::Qualification => 25,
            Self::Proposal => 50,
            Self::Negotiation => 75,
            Self::ClosedWon => 100,
            Self::ClosedLost => 0,
        }
    }

    /// Whether the stage is terminal (won or lost).
    pub const fn is_closed(self) -> bool {
        matches!(self, Self::ClosedWon | Self::ClosedLost)
    }
}

/// Category of a logged CRM activity.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS, Default,
)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum CrmActivityType {
    /// Phone call.
    Call,
    /// Email.
    Email,
    /// Meeting.
    Meeting,
    /// Generic task (the fallback for unknown types).
    #[default]
    Task,
}

impl CrmActivityType {
    /// Parse an activity type, falling back to [`Self::Task`].
    pub fn from_wire_or_default(tag: &str) -> Self {
        match tag {
            "call" => Self::Call,
            "email" => Self::Email,
            "meeting" => Self::Meeting,
            _ => Self::Task,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zone_wire_roundtrip() {
        for zone in [
            Zone::Nexus,
            Zone::Gardens,
            Zone::Athenaeum,
            Zone::Studio,
            Zone::Wilds,
            Zone::Agora,
            Zone::Commons,
            Zone::Arena,
        ] {
            assert_eq!(Zone::from_wire(zone.as_wire()), Some(zone));
        }
    }

    #[test]
    fn unknown_zone_is_none() {
        assert_eq!(Zone::from_wire("atlantis"), None);
    }

    #[test]
    fn zone_serializes_lowercase() {
        let json = serde_json::to_string(&Zone::Agora).ok();
        assert_eq!(json.as_deref(), Some("\"agora\""));
    }

    #[test]
    fn closed_stages_are_terminal() {
        assert!(PipelineStage::ClosedWon.is_closed());
        assert!(PipelineStage::ClosedLost.is_closed());
        assert!(!PipelineStage::Negotiation.is_closed());
    }

    #[test]
    fn stage_probabilities_match_pipeline() {
        assert_eq!(PipelineStage::Prospecting.probability(), 10);
        assert_eq!(PipelineStage::ClosedWon.probability(), 100);
        assert_eq!(PipelineStage::ClosedLost.probability(), 0);
    }
}
