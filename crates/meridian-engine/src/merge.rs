//! The snapshot reconciler: `merge_snapshots(a, b) -> merged`.
//!
//! Replicas diverge while partitioned and reconcile by merging whole
//! snapshots. The merge never fails; each sub-tree has its own
//! deterministic rule:
//!
//! - change log: union, deduped by `(ts, from, kind)`, timestamp-sorted
//! - presence: last-writer-wins per actor by `last_seen`, left on ties
//! - id-keyed collections: union, conflicts to the fresher record
//! - chat / transactions / activities: union deduped by id, sorted
//! - action records: the left occurrence survives per id
//! - balances: pointwise, the right operand overrides the left
//! - clock and version: the more advanced value
//!
//! Because event ids derive deterministically from `(kind, actor, ts)`,
//! both replicas of the same event carry the same ids and the unions
//! collapse duplicates instead of doubling them.

use std::collections::{BTreeMap, BTreeSet};

use meridian_ledger::EconomyState;
use meridian_types::{
    ActionRecord, AmendmentStatus, ChatEntry, CrmState, ElectionStatus, Garden, Listing,
    PeerStatus, Transaction,
};

use crate::snapshot::{CHAT_CAP, WorldSnapshot, enforce_structure_cap};

/// Merge two diverged snapshots into one that contains both histories.
pub fn merge_snapshots(a: &WorldSnapshot, b: &WorldSnapshot) -> WorldSnapshot {
    let mut merged = WorldSnapshot::new();

    // Change log: union on the dedup key, then timestamp order.
    let changes: BTreeSet<_> = a.changes.iter().chain(b.changes.iter()).cloned().collect();
    *merged.changes_mut() = changes.into_iter().collect();

    // Presence: LWW per actor.
    *merged.citizens_mut() = union_by_key(&a.citizens, &b.citizens, |left, right| {
        right.last_seen > left.last_seen
    });

    *merged.economy_mut() = merge_economy(&a.economy, &b.economy);

    *merged.chat_mut() = merge_chat(&a.chat, &b.chat);

    // Structures: union, then the same cap eviction the reducer applies,
    // so a merge of two full worlds stays within bounds.
    let mut structures = union_by_key(&a.structures, &b.structures, |left, right| {
        right.built_at > left.built_at
    });
    enforce_structure_cap(&mut structures);
    *merged.structures_mut() = structures;
    *merged.gardens_mut() = union_by_key(&a.gardens, &b.gardens, garden_fresher);
    *merged.discoveries_mut() =
        union_by_key(&a.discoveries, &b.discoveries, |left, right| {
            right.ts > left.ts
        });
    *merged.anchors_mut() = union_by_key(&a.anchors, &b.anchors, |left, right| {
        right.placed_at > left.placed_at
    });
    *merged.creations_mut() = union_by_key(&a.creations, &b.creations, |left, right| {
        right.ts > left.ts
    });

    *merged.actions_mut() = merge_actions(&a.actions, &b.actions);

    *merged.competitions_mut() =
        union_by_key(&a.competitions, &b.competitions, |left, right| {
            right.updated_at > left.updated_at
        });

    *merged.federation_mut() = union_by_key(&a.federation, &b.federation, |left, right| {
        right.updated_at > left.updated_at
            || (right.updated_at == left.updated_at
                && right.status == PeerStatus::Connected
                && left.status == PeerStatus::Announced)
    });
    *merged.stars_mut() = union_by_key(&a.stars, &b.stars, |left, right| right.ts > left.ts);

    *merged.elections_mut() = union_by_key(&a.elections, &b.elections, |left, right| {
        right.updated_at > left.updated_at
            || (right.updated_at == left.updated_at
                && right.status == ElectionStatus::Finalized
                && left.status == ElectionStatus::Open)
    });
    *merged.stewards_mut() = union_by_key(&a.stewards, &b.stewards, |left, right| {
        right.installed_at > left.installed_at
    });

    // Amendments: a closed record beats an open one; otherwise the side
    // that has seen more votes.
    *merged.amendments_mut() = union_by_key(&a.amendments, &b.amendments, |left, right| {
        match (left.status, right.status) {
            (AmendmentStatus::Open, AmendmentStatus::Closed) => true,
            (AmendmentStatus::Closed, AmendmentStatus::Open) => false,
            _ => right.votes.len() > left.votes.len(),
        }
    });

    *merged.crm_mut() = merge_crm(&a.crm, &b.crm);

    // Scalars: the more advanced world wins.
    merged.clock = if b.clock.world_time > a.clock.world_time {
        b.clock
    } else {
        a.clock
    };
    merged.version = a.version.max(b.version);

    merged
}

/// Union two id-keyed maps; on conflict `prefer_right` decides.
fn union_by_key<K: Ord + Clone, V: Clone>(
    a: &BTreeMap<K, V>,
    b: &BTreeMap<K, V>,
    prefer_right: impl Fn(&V, &V) -> bool,
) -> BTreeMap<K, V> {
    let mut merged = a.clone();
    for (key, right) in b {
        match merged.get(key) {
            Some(left) if !prefer_right(left, right) => {}
            _ => {
                merged.insert(key.clone(), right.clone());
            }
        }
    }
    merged
}

/// The fresher of two replicas of the same garden: ripeness first, then
/// growth progress.
fn garden_fresher(left: &Garden, right: &Garden) -> bool {
    (right.ready && !left.ready) || right.growth_stage > left.growth_stage
}

fn merge_economy(a: &EconomyState, b: &EconomyState) -> EconomyState {
    // Balances merge pointwise with the right operand overriding the
    // left wherever both have an account.
    let mut balances = a.balances.clone();
    for (actor, balance) in &b.balances {
        balances.insert(actor.clone(), *balance);
    }

    let mut by_id: BTreeMap<_, Transaction> = BTreeMap::new();
    for transaction in a.transactions.iter().chain(b.transactions.iter()) {
        by_id.entry(transaction.id).or_insert_with(|| transaction.clone());
    }
    let mut transactions: Vec<Transaction> = by_id.into_values().collect();
    transactions.sort_by(|x, y| (x.ts, x.id).cmp(&(y.ts, y.id)));

    // A settled listing stays settled whichever side saw the sale.
    let listings = union_by_key(&a.listings, &b.listings, |left: &Listing, right: &Listing| {
        left.active && !right.active
    });

    EconomyState {
        balances,
        transactions,
        listings,
    }
}

fn merge_chat(a: &[ChatEntry], b: &[ChatEntry]) -> Vec<ChatEntry> {
    let mut by_id: BTreeMap<_, ChatEntry> = BTreeMap::new();
    for entry in a.iter().chain(b.iter()) {
        by_id.entry(entry.id).or_insert_with(|| entry.clone());
    }
    let mut merged: Vec<ChatEntry> = by_id.into_values().collect();
    merged.sort_by(|x, y| (x.ts, x.id).cmp(&(y.ts, y.id)));
    let excess = merged.len().saturating_sub(CHAT_CAP);
    if excess > 0 {
        merged.drain(..excess);
    }
    merged
}

/// Union action records; the left side's version of a record survives.
fn merge_actions(a: &[ActionRecord], b: &[ActionRecord]) -> Vec<ActionRecord> {
    let mut by_id: BTreeMap<_, ActionRecord> = BTreeMap::new();
    for record in a.iter().chain(b.iter()) {
        by_id.entry(record.id).or_insert_with(|| record.clone());
    }
    let mut merged: Vec<ActionRecord> = by_id.into_values().collect();
    merged.sort_by(|x, y| (x.ts, x.id).cmp(&(y.ts, y.id)));
    merged
}

fn merge_crm(a: &CrmState, b: &CrmState) -> CrmState {
    let accounts = union_by_key(&a.accounts, &b.accounts, |left, right| {
        right.updated_at.unwrap_or(right.created_at) > left.updated_at.unwrap_or(left.created_at)
    });
    let contacts = union_by_key(&a.contacts, &b.contacts, |left, right| {
        right.updated_at.unwrap_or(right.created_at) > left.updated_at.unwrap_or(left.created_at)
    });
    let opportunities = union_by_key(&a.opportunities, &b.opportunities, |left, right| {
        right.updated_at.unwrap_or(right.created_at) > left.updated_at.unwrap_or(left.created_at)
    });

    let mut by_id: BTreeMap<String, _> = BTreeMap::new();
    for activity in a.activities.iter().chain(b.activities.iter()) {
        by_id
            .entry(activity.id.clone())
            .or_insert_with(|| activity.clone());
    }
    let mut activities: Vec<_> = by_id.into_values().collect();
    activities.sort_by(|x, y| {
        (x.created_at, x.id.clone()).cmp(&(y.created_at, y.id.clone()))
    });

    CrmState {
        accounts,
        contacts,
        opportunities,
        activities,
    }
}
