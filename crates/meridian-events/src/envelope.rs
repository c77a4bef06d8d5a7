//! The event envelope and its wire codec.
//!
//! An [`Event`] is the immutable unit of change: who did what, when, and
//! optionally where. On the wire it is a flat JSON object
//! `{kind, from, ts, position?, payload}`; in memory the tag and payload
//! collapse into the typed [`EventKind`]. Decoding is total -- anything
//! that parses as the envelope shape becomes an event, with unrecognized
//! content degrading to [`EventKind::Unknown`].

use chrono::{DateTime, Utc};
use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use meridian_types::{ActorId, Position};

use crate::change::ChangeRecord;
use crate::kind::EventKind;

/// Maximum length of free-text payload fields accepted at the boundary.
pub const MAX_TEXT_LEN: usize = 500;

/// One domain action: origin, time, optional position, and typed payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// The originating actor.
    pub from: ActorId,
    /// When the action happened, per the origin replica.
    pub ts: DateTime<Utc>,
    /// Where the actor was, when the client supplied it.
    pub position: Option<Position>,
    /// What happened.
    pub kind: EventKind,
}

/// The flat wire shape of an envelope.
#[derive(Debug, Serialize, Deserialize)]
struct WireEvent {
    kind: String,
    from: ActorId,
    ts: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    position: Option<Position>,
    #[serde(default)]
    payload: Value,
}

impl Event {
    /// Build an event with no position.
    pub fn new(from: impl Into<ActorId>, ts: DateTime<Utc>, kind: EventKind) -> Self {
        Self {
            from: from.into(),
            ts,
            position: None,
            kind,
        }
    }

    /// Attach a position to the envelope.
    #[must_use]
    pub fn at(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    /// The change-log record (and dedup key) for this event.
    pub fn change_record(&self) -> ChangeRecord {
        ChangeRecord {
            ts: self.ts,
            from: self.from.clone(),
            kind: self.kind.tag().to_owned(),
        }
    }

    /// Check the envelope at the transport boundary.
    ///
    /// Returns every violation found, empty when the envelope is clean.
    /// The reducer itself does not require this -- it is total -- but
    /// transports use it to reject garbage before it enters the log.
    pub fn validate(&self) -> Vec<String> {
        let mut violations = Vec::new();
        if self.from.is_empty() {
            violations.push("missing origin actor".to_owned());
        }
        if let Some(position) = &self.position
            && !position.is_finite()
        {
            violations.push("non-finite position coordinates".to_owned());
        }
        if let Some(text) = self.kind.text()
            && text.chars().count() > MAX_TEXT_LEN
        {
            violations.push(format!("text exceeds {MAX_TEXT_LEN} characters"));
        }
        violations
    }
}

impl Serialize for Event {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        WireEvent {
            kind: self.kind.tag().to_owned(),
            from: self.from.clone(),
            ts: self.ts,
            position: self.position.clone(),
            payload: self.kind.payload_value(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Event {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = WireEvent::deserialize(deserializer)?;
        Ok(Self {
            from: wire.from,
            ts: wire.ts,
            position: wire.position,
            kind: EventKind::from_wire(&wire.kind, wire.payload),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::{ChatPayload, WarpPayload};
    use chrono::TimeZone;
    use serde_json::json;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0)
            .single()
            .unwrap_or_default()
    }

    #[test]
    fn roundtrips_through_wire_shape() {
        let event = Event::new(
            "p1",
            ts(),
            EventKind::Warp(WarpPayload {
                zone: "gardens".to_owned(),
            }),
        );
        let encoded = serde_json::to_value(&event).ok();
        let decoded: Option<Event> = encoded.and_then(|v| serde_json::from_value(v).ok());
        assert_eq!(decoded, Some(event));
    }

    #[test]
    fn unknown_kind_survives_decode() {
        let wire = json!({
            "kind": "levitate",
            "from": "p1",
            "ts": ts(),
            "payload": {"height": 3}
        });
        let event: Option<Event> = serde_json::from_value(wire).ok();
        let event = event.unwrap_or_else(|| Event::new("", ts(), EventKind::Leave));
        assert_eq!(event.kind.tag(), "levitate");
        assert!(matches!(event.kind, EventKind::Unknown { .. }));
    }

    #[test]
    fn validate_flags_empty_actor() {
        let event = Event::new("", ts(), EventKind::Heartbeat);
        assert_eq!(event.validate().len(), 1);
    }

    #[test]
    fn validate_flags_oversized_text() {
        let event = Event::new(
            "p1",
            ts(),
            EventKind::Say(ChatPayload {
                text: "x".repeat(MAX_TEXT_LEN.saturating_add(1)),
                to: None,
            }),
        );
        assert!(!event.validate().is_empty());
    }

    #[test]
    fn validate_flags_nan_position() {
        let position = Position {
            x: f64::NAN,
            ..Position::default()
        };
        let event = Event::new("p1", ts(), EventKind::Heartbeat).at(position);
        assert!(!event.validate().is_empty());
    }

    #[test]
    fn clean_event_validates() {
        let event = Event::new("p1", ts(), EventKind::Heartbeat);
        assert!(event.validate().is_empty());
    }

    #[test]
    fn change_record_uses_wire_tag() {
        let event = Event::new("p1", ts(), EventKind::IntentionClear);
        let record = event.change_record();
        assert_eq!(record.kind, "intention_clear");
        assert_eq!(record.from, ActorId::from("p1"));
        assert_eq!(record.ts, ts());
    }
}
