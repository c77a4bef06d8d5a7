//! Type-safe identifier wrappers for world entities.
//!
//! Every entity in the world has a strongly-typed ID to prevent accidental
//! mixing of identifiers at compile time. Entity IDs use UUID v5 derived
//! deterministically from `(kind tag, actor, timestamp)`: a retried delivery
//! of the same event derives the same ID, which is what makes content
//! creation idempotent and lets the reconciler union collections by key.
//!
//! Actors are identified by the name they join with, so [`ActorId`] wraps a
//! string rather than a UUID.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Namespace for all deterministically derived (v5) Meridian identifiers.
const MERIDIAN_NAMESPACE: Uuid = Uuid::from_bytes([
    0x6d, 0x65, 0x72, 0x69, 0x64, 0x69, 0x61, 0x6e, 0x2d, 0x77, 0x6f, 0x72, 0x6c, 0x64, 0x2d,
    0x31,
]);

// ---------------------------------------------------------------------------
// ActorId
// ---------------------------------------------------------------------------

/// Identifier of a participant (human or agent) in the world.
///
/// Actors choose their own identifier when they first `join`; it is carried
/// in the `from` field of every event they originate.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS, Default,
)]
#[serde(transparent)]
#[ts(export, export_to = "bindings/")]
pub struct ActorId(pub String);

impl ActorId {
    /// Create an actor identifier from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Return the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Return whether the identifier is empty (never valid on the wire).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl core::fmt::Display for ActorId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ActorId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for ActorId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

// ---------------------------------------------------------------------------
// Entity IDs
// ---------------------------------------------------------------------------

/// Generates a newtype wrapper around [`Uuid`] with standard derives and a
/// deterministic v5 derivation constructor.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident, $tag:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a fresh (non-deterministic) identifier using UUID v7.
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Derive the identifier deterministically from the originating
            /// actor and event timestamp.
            ///
            /// Two replicas applying the same event derive the same ID, so
            /// retried deliveries and merge-time unions deduplicate cleanly.
            pub fn derived(actor: &ActorId, ts: DateTime<Utc>) -> Self {
                Self(derive_uuid($tag, actor.as_str(), ts))
            }

            /// Derive the identifier from an extra qualifier in addition to
            /// actor and timestamp (e.g. a plot name or listing item).
            pub fn derived_with(actor: &ActorId, ts: DateTime<Utc>, qualifier: &str) -> Self {
                let composite = format!("{}#{qualifier}", actor.as_str());
                Self(derive_uuid($tag, &composite, ts))
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

/// Derive a v5 UUID from a kind tag, an actor key, and a timestamp.
fn derive_uuid(tag: &str, actor: &str, ts: DateTime<Utc>) -> Uuid {
    let key = format!("{tag}|{actor}|{}", ts.timestamp_millis());
    Uuid::new_v5(&MERIDIAN_NAMESPACE, key.as_bytes())
}

/// Derive a deterministic short string id with a collection prefix
/// (`acc_`, `con_`, `opp_`, `act_`), for records keyed by plain strings.
pub fn derive_string_id(
    prefix: &str,
    actor: &ActorId,
    ts: DateTime<Utc>,
    qualifier: &str,
) -> String {
    let composite = format!("{}#{qualifier}", actor.as_str());
    let uuid = derive_uuid(prefix, &composite, ts);
    let simple = uuid.simple().to_string();
    let short = simple.get(..12).unwrap_or(&simple).to_owned();
    format!("{prefix}_{short}")
}

define_id! {
    /// Unique identifier for a chat log entry.
    ChatId, "chat"
}

define_id! {
    /// Unique identifier for a structure placed in the world.
    StructureId, "structure"
}

define_id! {
    /// Unique identifier for a garden (planted plot awaiting harvest).
    GardenId, "garden"
}

define_id! {
    /// Unique identifier for a named discovery.
    DiscoveryId, "discovery"
}

define_id! {
    /// Unique identifier for a geographic anchor.
    AnchorId, "anchor"
}

define_id! {
    /// Unique identifier for a composed creation (music, art, writing).
    CreationId, "creation"
}

define_id! {
    /// Unique identifier for a marketplace listing.
    ListingId, "listing"
}

define_id! {
    /// Unique identifier for a ledger transaction record.
    TransactionId, "transaction"
}

define_id! {
    /// Unique identifier for a workflow action record (trade, mentoring,
    /// moderation, failure markers).
    ActionId, "action"
}

define_id! {
    /// Unique identifier for a competition between two actors.
    CompetitionId, "competition"
}

define_id! {
    /// Unique identifier for a registered star.
    StarId, "star"
}

define_id! {
    /// Unique identifier for a governance amendment.
    AmendmentId, "amendment"
}

#[cfg(test)]
#[allow(clippy::arithmetic_side_effects)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).single().unwrap_or_default()
    }

    #[test]
    fn derived_ids_are_stable() {
        let actor = ActorId::from("p1");
        let a = StructureId::derived(&actor, ts());
        let b = StructureId::derived(&actor, ts());
        assert_eq!(a, b);
    }

    #[test]
    fn derived_ids_differ_by_kind() {
        let actor = ActorId::from("p1");
        let s = StructureId::derived(&actor, ts());
        let g = GardenId::derived(&actor, ts());
        assert_ne!(s.into_inner(), g.into_inner());
    }

    #[test]
    fn derived_ids_differ_by_actor_and_time() {
        let a = ChatId::derived(&ActorId::from("p1"), ts());
        let b = ChatId::derived(&ActorId::from("p2"), ts());
        assert_ne!(a, b);

        let later = ts() + chrono::Duration::seconds(1);
        let c = ChatId::derived(&ActorId::from("p1"), later);
        assert_ne!(a, c);
    }

    #[test]
    fn qualifier_distinguishes_same_instant() {
        let actor = ActorId::from("p1");
        let a = GardenId::derived_with(&actor, ts(), "plot_a");
        let b = GardenId::derived_with(&actor, ts(), "plot_b");
        assert_ne!(a, b);
    }

    #[test]
    fn string_ids_are_stable_and_prefixed() {
        let actor = ActorId::from("p1");
        let a = derive_string_id("acc", &actor, ts(), "Northwind");
        let b = derive_string_id("acc", &actor, ts(), "Northwind");
        assert_eq!(a, b);
        assert!(a.starts_with("acc_"));
        assert_ne!(a, derive_string_id("con", &actor, ts(), "Northwind"));
    }

    #[test]
    fn actor_id_roundtrip_serde() {
        let original = ActorId::from("alice");
        let json = serde_json::to_string(&original).ok();
        assert_eq!(json.as_deref(), Some("\"alice\""));
    }
}
