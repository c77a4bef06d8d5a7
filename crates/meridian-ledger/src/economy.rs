//! The Spark economy state: balances, transaction log, marketplace.
//!
//! [`EconomyState`] is one sub-tree of the world snapshot. Balances are
//! non-negative by construction -- every debit path checks funds first --
//! and every movement of Spark appends a [`Transaction`] so the economy
//! can be audited from the log alone.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use meridian_types::{ActorId, Listing, ListingId, Transaction, TransactionId};

use crate::LedgerError;

/// Account name that accrues harvest tax.
pub const TREASURY: &str = "TREASURY";

/// Parameters for settling a marketplace purchase.
pub struct SettleParams {
    /// The listing being bought.
    pub listing_id: ListingId,
    /// The buyer.
    pub buyer: ActorId,
    /// Deterministic id for the settlement transaction.
    pub txn_id: TransactionId,
    /// Settlement time.
    pub ts: DateTime<Utc>,
}

/// A completed marketplace settlement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettledSale {
    /// The item sold, for delivery to the buyer's inventory.
    pub item: String,
    /// The seller, now credited.
    pub seller: ActorId,
    /// The price paid.
    pub price: Decimal,
}

/// Balances, transaction log, and marketplace listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EconomyState {
    /// Spark balance per actor. Absent means zero.
    pub balances: BTreeMap<ActorId, Decimal>,
    /// Append-only transaction log, sorted by `(ts, id)`.
    pub transactions: Vec<Transaction>,
    /// Marketplace listings by id. Settled listings stay, deactivated.
    pub listings: BTreeMap<ListingId, Listing>,
}

impl EconomyState {
    /// Create an empty economy.
    pub const fn new() -> Self {
        Self {
            balances: BTreeMap::new(),
            transactions: Vec::new(),
            listings: BTreeMap::new(),
        }
    }

    /// Return an actor's balance, zero when they have no account yet.
    pub fn balance(&self, actor: &ActorId) -> Decimal {
        self.balances.get(actor).copied().unwrap_or(Decimal::ZERO)
    }

    /// Credit Spark to an actor, creating the account if needed.
    pub fn credit(&mut self, actor: &ActorId, amount: Decimal) {
        let balance = self
            .balances
            .entry(actor.clone())
            .or_insert(Decimal::ZERO);
        *balance = balance.saturating_add(amount);
    }

    /// Debit Spark from an actor.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InsufficientBalance`] when the actor cannot
    /// cover the amount; the balance is left untouched.
    pub fn try_debit(&mut self, actor: &ActorId, amount: Decimal) -> Result<(), LedgerError> {
        let balance = self.balance(actor);
        if balance < amount {
            return Err(LedgerError::InsufficientBalance {
                actor: actor.clone(),
                balance,
                amount,
            });
        }
        self.balances
            .insert(actor.clone(), balance.saturating_sub(amount));
        Ok(())
    }

    /// Move Spark between two actors.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NonPositiveAmount`] for a zero or negative
    /// amount, or [`LedgerError::InsufficientBalance`] when the sender
    /// cannot cover it. Neither balance changes on error.
    pub fn transfer(
        &mut self,
        from: &ActorId,
        to: &ActorId,
        amount: Decimal,
    ) -> Result<(), LedgerError> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::NonPositiveAmount { amount });
        }
        self.try_debit(from, amount)?;
        self.credit(to, amount);
        Ok(())
    }

    /// Add a transaction to the log, keeping `(ts, id)` order. Late
    /// deliveries land where reconciliation would place them.
    pub fn record(&mut self, transaction: Transaction) {
        let index = self
            .transactions
            .binary_search_by_key(&(transaction.ts, transaction.id), |held| (held.ts, held.id))
            .unwrap_or_else(|index| index);
        self.transactions.insert(index, transaction);
    }

    /// Add a marketplace listing.
    pub fn add_listing(&mut self, listing: Listing) {
        self.listings.insert(listing.id, listing);
    }

    /// Settle a purchase atomically: debit the buyer, credit the seller,
    /// deactivate the listing, and log the transaction. On error nothing
    /// changes.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::ListingNotFound`] or
    /// [`LedgerError::ListingInactive`] for a bad listing id, or
    /// [`LedgerError::InsufficientBalance`] when the buyer cannot pay.
    pub fn settle_listing(&mut self, params: SettleParams) -> Result<SettledSale, LedgerError> {
        let listing = self
            .listings
            .get(&params.listing_id)
            .ok_or(LedgerError::ListingNotFound {
                id: params.listing_id,
            })?;
        if !listing.active {
            return Err(LedgerError::ListingInactive {
                id: params.listing_id,
            });
        }
        let sale = SettledSale {
            item: listing.item.clone(),
            seller: listing.seller.clone(),
            price: listing.price,
        };

        // Funds check happens before any mutation.
        self.try_debit(&params.buyer, sale.price)?;
        self.credit(&sale.seller, sale.price);
        if let Some(listing) = self.listings.get_mut(&params.listing_id) {
            listing.active = false;
        }
        self.record(Transaction {
            id: params.txn_id,
            kind: "purchase".to_owned(),
            from: params.buyer,
            to: Some(sale.seller.clone()),
            amount: Some(sale.price),
            item: Some(sale.item.clone()),
            ts: params.ts,
        });
        tracing::debug!(item = %sale.item, price = %sale.price, "listing settled");
        Ok(sale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use meridian_types::ListingId;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0)
            .single()
            .unwrap_or_default()
    }

    fn actor(name: &str) -> ActorId {
        ActorId::from(name)
    }

    fn listed(economy: &mut EconomyState, seller: &str, item: &str, price: i64) -> ListingId {
        let id = ListingId::new();
        economy.add_listing(Listing {
            id,
            seller: actor(seller),
            item: item.to_owned(),
            price: Decimal::from(price),
            active: true,
            listed_at: ts(),
        });
        id
    }

    #[test]
    fn record_keeps_the_log_in_timestamp_order() {
        let at = |secs: u32| {
            Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, secs)
                .single()
                .unwrap_or_default()
        };
        let entry = |secs: u32| Transaction {
            id: TransactionId::new(),
            kind: "gift".to_owned(),
            from: actor("p1"),
            to: None,
            amount: None,
            item: None,
            ts: at(secs),
        };

        let mut economy = EconomyState::new();
        economy.record(entry(20));
        economy.record(entry(10));

        assert_eq!(economy.transactions.first().map(|t| t.ts), Some(at(10)));
        assert_eq!(economy.transactions.get(1).map(|t| t.ts), Some(at(20)));
    }

    #[test]
    fn missing_account_reads_as_zero() {
        let economy = EconomyState::new();
        assert_eq!(economy.balance(&actor("p1")), Decimal::ZERO);
    }

    #[test]
    fn debit_refuses_overdraw() {
        let mut economy = EconomyState::new();
        economy.credit(&actor("p1"), Decimal::from(3));

        let result = economy.try_debit(&actor("p1"), Decimal::from(5));
        assert!(matches!(
            result,
            Err(LedgerError::InsufficientBalance { .. })
        ));
        assert_eq!(economy.balance(&actor("p1")), Decimal::from(3));
    }

    #[test]
    fn transfer_moves_funds() {
        let mut economy = EconomyState::new();
        economy.credit(&actor("p1"), Decimal::from(10));

        assert!(
            economy
                .transfer(&actor("p1"), &actor("p2"), Decimal::from(4))
                .is_ok()
        );
        assert_eq!(economy.balance(&actor("p1")), Decimal::from(6));
        assert_eq!(economy.balance(&actor("p2")), Decimal::from(4));
    }

    #[test]
    fn transfer_rejects_non_positive() {
        let mut economy = EconomyState::new();
        economy.credit(&actor("p1"), Decimal::from(10));

        let result = economy.transfer(&actor("p1"), &actor("p2"), Decimal::ZERO);
        assert!(matches!(result, Err(LedgerError::NonPositiveAmount { .. })));
    }

    #[test]
    fn settlement_is_atomic() {
        let mut economy = EconomyState::new();
        economy.credit(&actor("buyer"), Decimal::from(20));
        let listing_id = listed(&mut economy, "seller", "lantern", 8);

        let sale = economy.settle_listing(SettleParams {
            listing_id,
            buyer: actor("buyer"),
            txn_id: TransactionId::new(),
            ts: ts(),
        });

        let sale = sale.ok();
        assert_eq!(sale.map(|s| s.item), Some("lantern".to_owned()));
        assert_eq!(economy.balance(&actor("buyer")), Decimal::from(12));
        assert_eq!(economy.balance(&actor("seller")), Decimal::from(8));
        assert_eq!(
            economy.listings.get(&listing_id).map(|l| l.active),
            Some(false)
        );
        assert_eq!(economy.transactions.len(), 1);
    }

    #[test]
    fn settlement_failure_changes_nothing() {
        let mut economy = EconomyState::new();
        economy.credit(&actor("buyer"), Decimal::from(2));
        let listing_id = listed(&mut economy, "seller", "lantern", 8);

        let result = economy.settle_listing(SettleParams {
            listing_id,
            buyer: actor("buyer"),
            txn_id: TransactionId::new(),
            ts: ts(),
        });

        assert!(matches!(
            result,
            Err(LedgerError::InsufficientBalance { .. })
        ));
        assert_eq!(economy.balance(&actor("buyer")), Decimal::from(2));
        assert_eq!(economy.balance(&actor("seller")), Decimal::ZERO);
        assert_eq!(
            economy.listings.get(&listing_id).map(|l| l.active),
            Some(true)
        );
        assert!(economy.transactions.is_empty());
    }

    #[test]
    fn settled_listing_cannot_settle_twice() {
        let mut economy = EconomyState::new();
        economy.credit(&actor("buyer"), Decimal::from(20));
        let listing_id = listed(&mut economy, "seller", "lantern", 8);

        let first = economy.settle_listing(SettleParams {
            listing_id,
            buyer: actor("buyer"),
            txn_id: TransactionId::new(),
            ts: ts(),
        });
        assert!(first.is_ok());

        let second = economy.settle_listing(SettleParams {
            listing_id,
            buyer: actor("buyer"),
            txn_id: TransactionId::new(),
            ts: ts(),
        });
        assert!(matches!(second, Err(LedgerError::ListingInactive { .. })));
        assert_eq!(economy.balance(&actor("buyer")), Decimal::from(12));
    }
}
