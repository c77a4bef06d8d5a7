//! The closed set of event kinds and their payload records.
//!
//! Each protocol `kind` gets its own explicit payload type -- no loosely
//! typed field bags -- and the whole set forms the [`EventKind`] tagged
//! union, so adding a kind is a compile-time-checked exercise. Kinds that
//! arrive off the wire with an unrecognized tag or an unparsable payload
//! degrade to [`EventKind::Unknown`], which the reducer treats as a
//! change-log-only no-op.

use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use meridian_types::{ActionId, ActorId, AmendmentId, CompetitionId, ListingId, Position};

// ---------------------------------------------------------------------------
// Payload records
// ---------------------------------------------------------------------------

/// Payload of `join`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct JoinPayload {
    /// Display name to show for the actor.
    #[serde(default)]
    pub name: Option<String>,
}

/// Payload of `idle`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdlePayload {
    /// Whether the actor is going idle (`true`) or returning (`false`).
    #[serde(default = "default_true")]
    pub idle: bool,
}

/// Payload of `move`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct MovePayload {
    /// Destination; when absent the envelope position is used.
    #[serde(default)]
    pub position: Option<Position>,
}

/// Payload of `warp`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarpPayload {
    /// Destination zone name; unknown names fall back to the nexus.
    pub zone: String,
}

/// Payload of the four chat kinds (`say`, `shout`, `whisper`, `emote`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatPayload {
    /// Message text.
    pub text: String,
    /// Recipient, for whispers.
    #[serde(default)]
    pub to: Option<ActorId>,
}

/// Payload of `build`.
///
/// When `sim` names an embedded simulation, the build is routed to that
/// simulation instead of placing a structure; `action`/`data` carry the
/// simulation action in that case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct BuildPayload {
    /// Structure type to place.
    #[serde(default)]
    pub structure: Option<String>,
    /// Embedded simulation name (`"crm"`), when routing.
    #[serde(default)]
    pub sim: Option<String>,
    /// Simulation action name, when routing.
    #[serde(default)]
    pub action: Option<String>,
    /// Simulation action data, when routing.
    #[serde(default)]
    pub data: Option<Value>,
}

/// Payload of `plant`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantPayload {
    /// Plot name to plant in.
    pub plot: String,
    /// Species to plant; also the eventual harvest item.
    #[serde(default)]
    pub species: Option<String>,
}

/// Payload of `harvest`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarvestPayload {
    /// Plot name to harvest from.
    pub plot: String,
}

/// Payload of `craft`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CraftPayload {
    /// Recipe name; the crafted item carries this name.
    pub recipe: String,
}

/// Payload of `compose`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ComposePayload {
    /// Title of the work.
    #[serde(default)]
    pub title: Option<String>,
    /// Medium or kind of the work.
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

/// Payload of `trade_offer`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeOfferPayload {
    /// Counterparty the offer is addressed to.
    pub to: ActorId,
    /// Item names the proposer offers.
    #[serde(default)]
    pub offered: Vec<String>,
    /// Item names the proposer requests in return.
    #[serde(default)]
    pub requested: Vec<String>,
}

/// Payload of `trade_accept` and `trade_decline`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeAnswerPayload {
    /// The pending offer being answered.
    pub offer_id: ActionId,
}

/// Payload of `buy`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuyPayload {
    /// The listing being bought.
    pub listing_id: ListingId,
}

/// Payload of `sell`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SellPayload {
    /// Item offered for sale.
    pub item: String,
    /// Asking price in Spark.
    pub price: Decimal,
}

/// Payload of `gift`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GiftPayload {
    /// Recipient of the gift.
    pub to: ActorId,
    /// Spark amount (defaults to 1).
    #[serde(default = "default_one")]
    pub amount: Decimal,
}

/// Payload of `teach`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeachPayload {
    /// The student.
    pub to: ActorId,
    /// Skill being taught.
    pub skill: String,
}

/// Payload of `learn`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearnPayload {
    /// Skill being studied.
    pub skill: String,
}

/// Payload of `mentor_offer`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MentorOfferPayload {
    /// The prospective mentee.
    pub to: ActorId,
    /// Topic of mentorship.
    pub topic: String,
}

/// Payload of `mentor_accept`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MentorAcceptPayload {
    /// The mentorship offer being accepted.
    pub offer_id: ActionId,
}

/// Payload of `challenge`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChallengePayload {
    /// The challenged actor.
    pub to: ActorId,
    /// Name of the game (defaults to `"contest"`).
    #[serde(default = "default_game")]
    pub game: String,
}

/// Payload of `accept_challenge` and `forfeit`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChallengeAnswerPayload {
    /// The competition being answered.
    pub challenge_id: CompetitionId,
}

/// Payload of `score`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScorePayload {
    /// The competition scored.
    pub challenge_id: CompetitionId,
    /// Points earned (defaults to 1).
    #[serde(default = "default_points")]
    pub points: i64,
}

/// Payload of `discover`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DiscoverPayload {
    /// Name of what was found.
    #[serde(default)]
    pub name: Option<String>,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Legacy field: older clients send the find under `exploration`.
    #[serde(default)]
    pub exploration: Option<String>,
}

/// Payload of `anchor_place`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnchorPlacePayload {
    /// Anchor name.
    pub name: String,
    /// Real-world latitude.
    pub lat: f64,
    /// Real-world longitude.
    pub lon: f64,
}

/// Payload of `inspect`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InspectPayload {
    /// Free-form target description.
    pub target: String,
}

/// Payload of `intention_set`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentionSetPayload {
    /// The stated intention.
    pub intention: String,
}

/// Payload of `warp_fork`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarpForkPayload {
    /// Name of the world being visited.
    pub world: String,
}

/// Payload of `federation_announce`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FederationAnnouncePayload {
    /// Peer world name.
    pub world: String,
    /// Public endpoint of the peer.
    #[serde(default)]
    pub url: Option<String>,
}

/// Payload of `federation_handshake`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FederationHandshakePayload {
    /// Peer world completing the handshake.
    pub world: String,
}

/// Payload of `star_register`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StarRegisterPayload {
    /// Name given to the star.
    pub star_name: String,
    /// Constellation the star is filed under.
    #[serde(default)]
    pub constellation: Option<String>,
}

/// Payload of `election_start`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElectionStartPayload {
    /// Zone the election is for.
    pub zone: String,
}

/// Payload of `election_vote`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElectionVotePayload {
    /// Zone the election is for.
    pub zone: String,
    /// The candidate voted for.
    pub candidate: ActorId,
}

/// Payload of `election_finalize`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElectionFinalizePayload {
    /// Zone whose election is being finalized.
    pub zone: String,
}

/// Payload of `steward_set_welcome`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StewardWelcomePayload {
    /// The stewarded zone.
    pub zone: String,
    /// Welcome message for arrivals.
    pub message: String,
}

/// Payload of `steward_set_policy`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StewardPolicyPayload {
    /// The stewarded zone.
    pub zone: String,
    /// Policy text.
    pub policy: String,
}

/// Payload of `steward_moderate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StewardModeratePayload {
    /// The stewarded zone.
    pub zone: String,
    /// Actor the moderation act is directed at.
    pub target: ActorId,
    /// What the steward did (free-form).
    pub action: String,
}

/// Payload of `sim_crm_action`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrmActionPayload {
    /// CRM action name (`create_account`, `update_stage`, ...).
    pub action: String,
    /// Action data; field meanings depend on the action.
    #[serde(default)]
    pub data: Value,
}

/// Payload of `propose_amendment`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposeAmendmentPayload {
    /// Short amendment title.
    pub title: String,
    /// Full amendment text and rationale.
    pub description: String,
    /// Diff-style text showing the proposed change.
    pub diff_text: String,
    /// Requested discussion period; clamped up to the constitutional minimum.
    #[serde(default)]
    pub discussion_period_days: Option<u32>,
}

/// Payload of `vote_amendment`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoteAmendmentPayload {
    /// The amendment voted on.
    pub amendment_id: AmendmentId,
    /// `"for"` or `"against"`.
    pub vote: String,
}

/// Weighted tally carried by a `close_amendment` message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct WireTally {
    /// Total weight of votes in favour.
    #[serde(default)]
    pub for_weight: Decimal,
    /// Total weight of votes against.
    #[serde(default)]
    pub against_weight: Decimal,
    /// Number of distinct voters.
    #[serde(default)]
    pub total_voters: u64,
}

/// Payload of `close_amendment`.
///
/// Originates from the privileged governance aggregator, not a participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloseAmendmentPayload {
    /// The amendment being closed.
    pub amendment_id: AmendmentId,
    /// `"approved"` or `"rejected"`.
    pub result: String,
    /// Final tally as computed by the aggregator.
    #[serde(default)]
    pub tally: Option<WireTally>,
}

fn default_true() -> bool {
    true
}

fn default_one() -> Decimal {
    Decimal::ONE
}

fn default_points() -> i64 {
    1
}

fn default_game() -> String {
    "contest".to_owned()
}

// ---------------------------------------------------------------------------
// EventKind
// ---------------------------------------------------------------------------

/// The closed tagged union of every event kind the reducer understands.
#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    /// An actor enters the world.
    Join(JoinPayload),
    /// An actor goes offline; the presence record is kept.
    Leave,
    /// Keep-alive refreshing `last_seen`.
    Heartbeat,
    /// Idle flag toggle.
    Idle(IdlePayload),
    /// Position update.
    Move(MovePayload),
    /// Zone change.
    Warp(WarpPayload),
    /// Local speech.
    Say(ChatPayload),
    /// World-wide broadcast.
    Shout(ChatPayload),
    /// Private message.
    Whisper(ChatPayload),
    /// Emote text.
    Emote(ChatPayload),
    /// Place a structure (or route to an embedded simulation).
    Build(BuildPayload),
    /// Plant a garden.
    Plant(PlantPayload),
    /// Harvest a ready garden.
    Harvest(HarvestPayload),
    /// Craft an item into the actor's inventory.
    Craft(CraftPayload),
    /// Record a composed creation.
    Compose(ComposePayload),
    /// Propose an item exchange.
    TradeOffer(TradeOfferPayload),
    /// Accept a pending trade.
    TradeAccept(TradeAnswerPayload),
    /// Decline a pending trade.
    TradeDecline(TradeAnswerPayload),
    /// Buy a marketplace listing.
    Buy(BuyPayload),
    /// Create a marketplace listing.
    Sell(SellPayload),
    /// Gift Spark to another actor.
    Gift(GiftPayload),
    /// Teach a skill.
    Teach(TeachPayload),
    /// Study a skill.
    Learn(LearnPayload),
    /// Offer mentorship.
    MentorOffer(MentorOfferPayload),
    /// Accept mentorship.
    MentorAccept(MentorAcceptPayload),
    /// Issue a challenge.
    Challenge(ChallengePayload),
    /// Accept a challenge.
    AcceptChallenge(ChallengeAnswerPayload),
    /// Forfeit a competition.
    Forfeit(ChallengeAnswerPayload),
    /// Record competition points.
    Score(ScorePayload),
    /// Record a discovery.
    Discover(DiscoverPayload),
    /// Place a geographic anchor.
    AnchorPlace(AnchorPlacePayload),
    /// Take a close look at something.
    Inspect(InspectPayload),
    /// State an intention.
    IntentionSet(IntentionSetPayload),
    /// Clear the stated intention.
    IntentionClear,
    /// Travel to another world.
    WarpFork(WarpForkPayload),
    /// Return from another world.
    ReturnHome,
    /// Announce a federated peer world.
    FederationAnnounce(FederationAnnouncePayload),
    /// Complete a federation handshake.
    FederationHandshake(FederationHandshakePayload),
    /// Register a star in the shared sky.
    StarRegister(StarRegisterPayload),
    /// Open a zone election.
    ElectionStart(ElectionStartPayload),
    /// Vote in a zone election.
    ElectionVote(ElectionVotePayload),
    /// Tally a zone election and install the steward.
    ElectionFinalize(ElectionFinalizePayload),
    /// Steward sets the zone welcome message.
    StewardSetWelcome(StewardWelcomePayload),
    /// Steward sets the zone policy.
    StewardSetPolicy(StewardPolicyPayload),
    /// Steward moderates in their zone.
    StewardModerate(StewardModeratePayload),
    /// Drive the embedded CRM simulation.
    SimCrmAction(CrmActionPayload),
    /// Propose a constitutional amendment.
    ProposeAmendment(ProposeAmendmentPayload),
    /// Vote on an open amendment.
    VoteAmendment(VoteAmendmentPayload),
    /// Close an amendment with a final result (privileged aggregator).
    CloseAmendment(CloseAmendmentPayload),
    /// Anything the codec did not recognize; a change-log-only no-op.
    Unknown {
        /// The unrecognized wire tag.
        kind: String,
        /// The raw payload as received.
        payload: Value,
    },
}

impl EventKind {
    /// Return the wire tag for this kind.
    pub fn tag(&self) -> &str {
        match self {
            Self::Join(_) => "join",
            Self::Leave => "leave",
            Self::Heartbeat => "heartbeat",
            Self::Idle(_) => "idle",
            Self::Move(_) => "move",
            Self::Warp(_) => "warp",
            Self::Say(_) => "say",
            Self::Shout(_) => "shout",
            Self::Whisper(_) => "whisper",
            Self::Emote(_) => "emote",
            Self::Build(_) => "build",
            Self::Plant(_) => "plant",
            Self::Harvest(_) => "harvest",
            Self::Craft(_) => "craft",
            Self::Compose(_) => "compose",
            Self::TradeOffer(_) => "trade_offer",
            Self::TradeAccept(_) => "trade_accept",
            Self::TradeDecline(_) => "trade_decline",
            Self::Buy(_) => "buy",
            Self::Sell(_) => "sell",
            Self::Gift(_) => "gift",
            Self::Teach(_) => "teach",
            Self::Learn(_) => "learn",
            Self::MentorOffer(_) => "mentor_offer",
            Self::MentorAccept(_) => "mentor_accept",
            Self::Challenge(_) => "challenge",
            Self::AcceptChallenge(_) => "accept_challenge",
            Self::Forfeit(_) => "forfeit",
            Self::Score(_) => "score",
            Self::Discover(_) => "discover",
            Self::AnchorPlace(_) => "anchor_place",
            Self::Inspect(_) => "inspect",
            Self::IntentionSet(_) => "intention_set",
            Self::IntentionClear => "intention_clear",
            Self::WarpFork(_) => "warp_fork",
            Self::ReturnHome => "return_home",
            Self::FederationAnnounce(_) => "federation_announce",
            Self::FederationHandshake(_) => "federation_handshake",
            Self::StarRegister(_) => "star_register",
            Self::ElectionStart(_) => "election_start",
            Self::ElectionVote(_) => "election_vote",
            Self::ElectionFinalize(_) => "election_finalize",
            Self::StewardSetWelcome(_) => "steward_set_welcome",
            Self::StewardSetPolicy(_) => "steward_set_policy",
            Self::StewardModerate(_) => "steward_moderate",
            Self::SimCrmAction(_) => "sim_crm_action",
            Self::ProposeAmendment(_) => "propose_amendment",
            Self::VoteAmendment(_) => "vote_amendment",
            Self::CloseAmendment(_) => "close_amendment",
            Self::Unknown { kind, .. } => kind.as_str(),
        }
    }

    /// Decode a kind from its wire tag and raw payload.
    ///
    /// Unrecognized tags and payloads that fail to parse both degrade to
    /// [`Self::Unknown`]; decoding never fails.
    pub fn from_wire(kind: &str, payload: Value) -> Self {
        match kind {
            "join" => parse(kind, payload, Self::Join),
            "leave" => Self::Leave,
            "heartbeat" => Self::Heartbeat,
            "idle" => parse(kind, payload, Self::Idle),
            "move" => parse(kind, payload, Self::Move),
            "warp" => parse(kind, payload, Self::Warp),
            "say" => parse(kind, payload, Self::Say),
            "shout" => parse(kind, payload, Self::Shout),
            "whisper" => parse(kind, payload, Self::Whisper),
            "emote" => parse(kind, payload, Self::Emote),
            "build" => parse(kind, payload, Self::Build),
            "plant" => parse(kind, payload, Self::Plant),
            "harvest" => parse(kind, payload, Self::Harvest),
            "craft" => parse(kind, payload, Self::Craft),
            "compose" => parse(kind, payload, Self::Compose),
            "trade_offer" => parse(kind, payload, Self::TradeOffer),
            "trade_accept" => parse(kind, payload, Self::TradeAccept),
            "trade_decline" => parse(kind, payload, Self::TradeDecline),
            "buy" => parse(kind, payload, Self::Buy),
            "sell" => parse(kind, payload, Self::Sell),
            "gift" => parse(kind, payload, Self::Gift),
            "teach" => parse(kind, payload, Self::Teach),
            "learn" => parse(kind, payload, Self::Learn),
            "mentor_offer" => parse(kind, payload, Self::MentorOffer),
            "mentor_accept" => parse(kind, payload, Self::MentorAccept),
            "challenge" => parse(kind, payload, Self::Challenge),
            "accept_challenge" => parse(kind, payload, Self::AcceptChallenge),
            "forfeit" => parse(kind, payload, Self::Forfeit),
            "score" => parse(kind, payload, Self::Score),
            "discover" => parse(kind, payload, Self::Discover),
            "anchor_place" => parse(kind, payload, Self::AnchorPlace),
            "inspect" => parse(kind, payload, Self::Inspect),
            "intention_set" => parse(kind, payload, Self::IntentionSet),
            "intention_clear" => Self::IntentionClear,
            "warp_fork" => parse(kind, payload, Self::WarpFork),
            "return_home" => Self::ReturnHome,
            "federation_announce" => parse(kind, payload, Self::FederationAnnounce),
            "federation_handshake" => parse(kind, payload, Self::FederationHandshake),
            "star_register" => parse(kind, payload, Self::StarRegister),
            "election_start" => parse(kind, payload, Self::ElectionStart),
            "election_vote" => parse(kind, payload, Self::ElectionVote),
            "election_finalize" => parse(kind, payload, Self::ElectionFinalize),
            "steward_set_welcome" => parse(kind, payload, Self::StewardSetWelcome),
            "steward_set_policy" => parse(kind, payload, Self::StewardSetPolicy),
            "steward_moderate" => parse(kind, payload, Self::StewardModerate),
            "sim_crm_action" => parse(kind, payload, Self::SimCrmAction),
            "propose_amendment" => parse(kind, payload, Self::ProposeAmendment),
            "vote_amendment" => parse(kind, payload, Self::VoteAmendment),
            "close_amendment" => parse(kind, payload, Self::CloseAmendment),
            _ => Self::Unknown {
                kind: kind.to_owned(),
                payload,
            },
        }
    }

    /// Encode this kind's payload back to a raw JSON value.
    pub fn payload_value(&self) -> Value {
        match self {
            Self::Leave | Self::Heartbeat | Self::IntentionClear | Self::ReturnHome => {
                Value::Object(serde_json::Map::new())
            }
            Self::Join(p) => to_value(p),
            Self::Idle(p) => to_value(p),
            Self::Move(p) => to_value(p),
            Self::Warp(p) => to_value(p),
            Self::Say(p) | Self::Shout(p) | Self::Whisper(p) | Self::Emote(p) => to_value(p),
            Self::Build(p) => to_value(p),
            Self::Plant(p) => to_value(p),
            Self::Harvest(p) => to_value(p),
            Self::Craft(p) => to_value(p),
            Self::Compose(p) => to_value(p),
            Self::TradeOffer(p) => to_value(p),
            Self::TradeAccept(p) | Self::TradeDecline(p) => to_value(p),
            Self::Buy(p) => to_value(p),
            Self::Sell(p) => to_value(p),
            Self::Gift(p) => to_value(p),
            Self::Teach(p) => to_value(p),
            Self::Learn(p) => to_value(p),
            Self::MentorOffer(p) => to_value(p),
            Self::MentorAccept(p) => to_value(p),
            Self::Challenge(p) => to_value(p),
            Self::AcceptChallenge(p) | Self::Forfeit(p) => to_value(p),
            Self::Score(p) => to_value(p),
            Self::Discover(p) => to_value(p),
            Self::AnchorPlace(p) => to_value(p),
            Self::Inspect(p) => to_value(p),
            Self::IntentionSet(p) => to_value(p),
            Self::WarpFork(p) => to_value(p),
            Self::FederationAnnounce(p) => to_value(p),
            Self::FederationHandshake(p) => to_value(p),
            Self::StarRegister(p) => to_value(p),
            Self::ElectionStart(p) => to_value(p),
            Self::ElectionVote(p) => to_value(p),
            Self::ElectionFinalize(p) => to_value(p),
            Self::StewardSetWelcome(p) => to_value(p),
            Self::StewardSetPolicy(p) => to_value(p),
            Self::StewardModerate(p) => to_value(p),
            Self::SimCrmAction(p) => to_value(p),
            Self::ProposeAmendment(p) => to_value(p),
            Self::VoteAmendment(p) => to_value(p),
            Self::CloseAmendment(p) => to_value(p),
            Self::Unknown { payload, .. } => payload.clone(),
        }
    }

    /// Text carried by the payload, when the kind carries free text the
    /// transport boundary wants to length-check.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Say(p) | Self::Shout(p) | Self::Whisper(p) | Self::Emote(p) => {
                Some(p.text.as_str())
            }
            Self::IntentionSet(p) => Some(p.intention.as_str()),
            _ => None,
        }
    }
}

/// Parse a payload into the given constructor, degrading to `Unknown`.
fn parse<P: DeserializeOwned>(
    kind: &str,
    payload: Value,
    constructor: impl FnOnce(P) -> EventKind,
) -> EventKind {
    match serde_json::from_value(payload.clone()) {
        Ok(parsed) => constructor(parsed),
        Err(_) => EventKind::Unknown {
            kind: kind.to_owned(),
            payload,
        },
    }
}

/// Encode a payload struct, falling back to an empty object. Payload
/// structs contain only JSON-representable fields, so the fallback is
/// unreachable in practice.
fn to_value<P: Serialize>(payload: &P) -> Value {
    serde_json::to_value(payload).unwrap_or_else(|_| Value::Object(serde_json::Map::new()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn known_kind_parses_payload() {
        let kind = EventKind::from_wire("warp", json!({"zone": "agora"}));
        assert_eq!(
            kind,
            EventKind::Warp(WarpPayload {
                zone: "agora".to_owned()
            })
        );
    }

    #[test]
    fn unknown_tag_degrades() {
        let kind = EventKind::from_wire("teleport", json!({"zone": "agora"}));
        assert!(matches!(kind, EventKind::Unknown { .. }));
        assert_eq!(kind.tag(), "teleport");
    }

    #[test]
    fn malformed_payload_degrades() {
        // `sell` requires a price; a payload without one is not a sell.
        let kind = EventKind::from_wire("sell", json!({"item": "lantern"}));
        assert!(matches!(kind, EventKind::Unknown { .. }));
    }

    #[test]
    fn every_known_tag_roundtrips() {
        let tags = [
            "join",
            "leave",
            "heartbeat",
            "intention_clear",
            "return_home",
        ];
        for tag in tags {
            let kind = EventKind::from_wire(tag, json!({}));
            assert_eq!(kind.tag(), tag);
        }
    }

    #[test]
    fn gift_amount_defaults_to_one() {
        let kind = EventKind::from_wire("gift", json!({"to": "p2"}));
        let amount = match kind {
            EventKind::Gift(p) => Some(p.amount),
            _ => None,
        };
        assert_eq!(amount, Some(Decimal::ONE));
    }
}
