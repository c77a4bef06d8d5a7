//! Trade, gift and marketplace handlers.
//!
//! Trades are two-phase: `trade_offer` records a pending action and
//! `trade_accept` performs the paired exchange. Items named in the offer
//! that the holder no longer carries are skipped, not substituted -- the
//! exchange moves what actually exists.

use rust_decimal::Decimal;

use meridian_events::{
    BuyPayload, Event, GiftPayload, SellPayload, TradeAnswerPayload, TradeOfferPayload,
};
use meridian_ledger::SettleParams;
use meridian_types::{
    ActionDetail, ActionId, ActionStatus, ActorId, InventoryItem, Listing, ListingId, Transaction,
    TransactionId,
};

use crate::snapshot::WorldSnapshot;

use super::{record_action, reject};

pub(super) fn offer(snapshot: &mut WorldSnapshot, event: &Event, payload: &TradeOfferPayload) {
    record_action(
        snapshot,
        &event.from,
        event.ts,
        ActionId::derived_with(&event.from, event.ts, "trade_offer"),
        ActionStatus::Pending,
        ActionDetail::TradeOffer {
            to: payload.to.clone(),
            offered: payload.offered.clone(),
            requested: payload.requested.clone(),
        },
    );
}

pub(super) fn accept(snapshot: &mut WorldSnapshot, event: &Event, payload: &TradeAnswerPayload) {
    let Some((index, proposer, offered, requested)) = pending_offer(snapshot, payload.offer_id)
    else {
        reject(snapshot, event, "no pending trade offer with that id");
        return;
    };
    if !counterparty_is(snapshot, index, &event.from) {
        reject(snapshot, event, "trade offer is addressed to someone else");
        return;
    }

    if let Some(record) = snapshot.actions_mut().get_mut(index) {
        record.status = ActionStatus::Accepted;
    }

    // Offered items flow proposer -> acceptor, requested items the other
    // way. Items the holder no longer carries are skipped.
    for item in &offered {
        move_item(snapshot, event, &proposer, &event.from, item);
    }
    for item in &requested {
        move_item(snapshot, event, &event.from, &proposer, item);
    }
}

pub(super) fn decline(snapshot: &mut WorldSnapshot, event: &Event, payload: &TradeAnswerPayload) {
    let Some((index, _, _, _)) = pending_offer(snapshot, payload.offer_id) else {
        reject(snapshot, event, "no pending trade offer with that id");
        return;
    };
    if !counterparty_is(snapshot, index, &event.from) {
        reject(snapshot, event, "trade offer is addressed to someone else");
        return;
    }
    if let Some(record) = snapshot.actions_mut().get_mut(index) {
        record.status = ActionStatus::Declined;
    }
}

pub(super) fn gift(snapshot: &mut WorldSnapshot, event: &Event, payload: &GiftPayload) {
    let outcome = snapshot
        .economy_mut()
        .transfer(&event.from, &payload.to, payload.amount);
    match outcome {
        Ok(()) => {
            snapshot.economy_mut().record(Transaction {
                id: TransactionId::derived_with(&event.from, event.ts, "gift"),
                kind: "gift".to_owned(),
                from: event.from.clone(),
                to: Some(payload.to.clone()),
                amount: Some(payload.amount),
                item: None,
                ts: event.ts,
            });
        }
        Err(error) => reject(snapshot, event, &error.to_string()),
    }
}

pub(super) fn sell(snapshot: &mut WorldSnapshot, event: &Event, payload: &SellPayload) {
    if payload.price <= Decimal::ZERO {
        reject(snapshot, event, "listing price must be positive");
        return;
    }
    let id = ListingId::derived_with(&event.from, event.ts, &payload.item);
    snapshot.economy_mut().add_listing(Listing {
        id,
        seller: event.from.clone(),
        item: payload.item.clone(),
        price: payload.price,
        active: true,
        listed_at: event.ts,
    });
}

pub(super) fn buy(snapshot: &mut WorldSnapshot, event: &Event, payload: &BuyPayload) {
    let outcome = snapshot.economy_mut().settle_listing(SettleParams {
        listing_id: payload.listing_id,
        buyer: event.from.clone(),
        txn_id: TransactionId::derived_with(&event.from, event.ts, "purchase"),
        ts: event.ts,
    });
    match outcome {
        Ok(sale) => {
            snapshot
                .citizen_mut(&event.from, event.ts)
                .inventory
                .push(InventoryItem {
                    item: sale.item,
                    acquired_at: event.ts,
                });
        }
        Err(error) => reject(snapshot, event, &error.to_string()),
    }
}

/// Locate a pending trade offer by id and pull out its exchange terms.
fn pending_offer(
    snapshot: &WorldSnapshot,
    offer_id: ActionId,
) -> Option<(usize, ActorId, Vec<String>, Vec<String>)> {
    let (index, record) = snapshot
        .actions
        .iter()
        .enumerate()
        .find(|(_, record)| record.id == offer_id)?;
    if record.status != ActionStatus::Pending {
        return None;
    }
    match &record.detail {
        ActionDetail::TradeOffer {
            offered, requested, ..
        } => Some((
            index,
            record.from.clone(),
            offered.clone(),
            requested.clone(),
        )),
        _ => None,
    }
}

/// Whether the offer at `index` is addressed to `actor`.
fn counterparty_is(snapshot: &WorldSnapshot, index: usize, actor: &ActorId) -> bool {
    snapshot
        .actions
        .get(index)
        .is_some_and(|record| match &record.detail {
            ActionDetail::TradeOffer { to, .. } => to == actor,
            _ => false,
        })
}

/// Move one item between inventories, preserving its acquisition time.
fn move_item(
    snapshot: &mut WorldSnapshot,
    event: &Event,
    from: &ActorId,
    to: &ActorId,
    item: &str,
) {
    let taken = snapshot.citizen_mut(from, event.ts).take_item(item);
    match taken {
        Some(held) => snapshot.citizen_mut(to, event.ts).inventory.push(held),
        None => {
            tracing::debug!(item, holder = %from, "trade item not held, skipped");
        }
    }
}
