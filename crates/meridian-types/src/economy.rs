//! Economy records: Spark transactions and marketplace listings.
//!
//! Balances live in the ledger's balance map; this module defines the
//! append-only records that describe how Spark and items move.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::{ActorId, ListingId, TransactionId};

/// One entry in the append-only transaction log.
///
/// Transactions are never modified or deleted; the reconciler unions two
/// logs by `id` and sorts by timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Transaction {
    /// Deterministic transaction identifier.
    pub id: TransactionId,
    /// Event kind that produced the transaction (`buy`, `gift`, `harvest`, ...).
    pub kind: String,
    /// Paying / originating actor.
    pub from: ActorId,
    /// Receiving actor, when the transaction has a counterparty.
    pub to: Option<ActorId>,
    /// Spark amount moved, when currency was involved.
    #[ts(as = "Option<String>")]
    pub amount: Option<Decimal>,
    /// Item involved, when goods changed hands.
    pub item: Option<String>,
    /// When the originating event happened.
    pub ts: DateTime<Utc>,
}

/// A marketplace listing.
///
/// Created by `sell`, settled (deactivated) by a successful `buy`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Listing {
    /// Deterministic listing identifier.
    pub id: ListingId,
    /// The selling actor.
    pub seller: ActorId,
    /// Item offered.
    pub item: String,
    /// Asking price in Spark.
    #[ts(as = "String")]
    pub price: Decimal,
    /// Whether the listing can still be bought.
    pub active: bool,
    /// When the listing was created.
    pub listed_at: DateTime<Utc>,
}
