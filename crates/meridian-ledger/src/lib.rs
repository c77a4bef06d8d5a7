//! Spark currency ledger for the Meridian world engine.
//!
//! Tracks every unit of Spark in a world: per-actor balances, an
//! append-only transaction log, marketplace listings, and the progressive
//! harvest tax. Balances are never driven negative -- callers that cannot
//! cover a debit get an error and the economy is left untouched.
//!
//! # Architecture
//!
//! - [`economy`] -- The [`EconomyState`] sub-tree: balances, transactions,
//!   listings, and atomic marketplace settlement.
//! - [`tax`] -- The progressive harvest tax schedule and split.
//!
//! The reducer owns when these operations run; this crate owns that they
//! run soundly.

pub mod economy;
pub mod tax;

pub use economy::{EconomyState, SettleParams, SettledSale, TREASURY};

use rust_decimal::Decimal;

use meridian_types::{ActorId, ListingId};

/// Errors from economy operations.
///
/// The reducer converts these into failed action records; they never
/// escape as panics or poisoned state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// A debit would overdraw the account.
    #[error("{actor} has {balance} Spark, cannot cover {amount}")]
    InsufficientBalance {
        /// The account that came up short.
        actor: ActorId,
        /// Its balance at the time.
        balance: Decimal,
        /// The amount requested.
        amount: Decimal,
    },

    /// Transfers must move a strictly positive amount.
    #[error("transfer amount must be positive, got {amount}")]
    NonPositiveAmount {
        /// The offending amount.
        amount: Decimal,
    },

    /// No listing with the given id.
    #[error("listing {id} not found")]
    ListingNotFound {
        /// The missing listing id.
        id: ListingId,
    },

    /// The listing was already settled or withdrawn.
    #[error("listing {id} is no longer active")]
    ListingInactive {
        /// The inactive listing id.
        id: ListingId,
    },
}
