//! The change log record: one tuple per event ever applied.
//!
//! A [`ChangeRecord`] is both the audit trail entry and the reconciler's
//! deduplication key -- two replicas that both applied an event agree on
//! its `(ts, from, kind)` tuple, so the merged log unions cleanly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use meridian_types::ActorId;

/// A record of one applied event.
///
/// `Ord` sorts by timestamp first, then origin and kind, which gives the
/// merged change log a total order independent of merge direction.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChangeRecord {
    /// When the event happened.
    pub ts: DateTime<Utc>,
    /// The originating actor.
    pub from: ActorId,
    /// Wire tag of the event kind.
    pub kind: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(secs: u32, from: &str, kind: &str) -> ChangeRecord {
        ChangeRecord {
            ts: Utc
                .with_ymd_and_hms(2025, 1, 1, 0, 0, secs)
                .single()
                .unwrap_or_default(),
            from: ActorId::from(from),
            kind: kind.to_owned(),
        }
    }

    #[test]
    fn orders_by_timestamp_first() {
        let early = record(1, "zz", "say");
        let late = record(2, "aa", "say");
        assert!(early < late);
    }

    #[test]
    fn equal_records_dedup() {
        assert_eq!(record(1, "p1", "move"), record(1, "p1", "move"));
    }
}
