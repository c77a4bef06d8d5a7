//! End-to-end scenarios through the reducer and the reconciler.
//!
//! Each test folds a short event history into a snapshot (or two diverged
//! snapshots) and asserts on the resulting world, the way a replica would
//! build state from its log.

// Integration tests use expect/unwrap extensively for clarity -- panicking
// on failure is the correct behavior in test code.
#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::missing_panics_doc,
    clippy::too_many_lines,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::arithmetic_side_effects
)]

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use serde_json::json;

use meridian_engine::{
    GOVERNANCE_ACTOR, STRUCTURE_CAP, WorldSnapshot, apply_event, merge_snapshots,
};
use meridian_events::{Event, EventKind};
use meridian_types::{
    ActionId, ActionStatus, ActorId, AmendmentId, AmendmentResult, AmendmentStatus,
    DEFAULT_GROWTH_SECS, ElectionStatus, ListingId, PipelineStage, Zone, derive_string_id,
};

fn ts(secs: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0)
        .single()
        .expect("valid timestamp")
        + Duration::seconds(secs)
}

fn event(from: &str, secs: i64, kind: &str, payload: serde_json::Value) -> Event {
    Event::new(from, ts(secs), EventKind::from_wire(kind, payload))
}

fn fold(events: &[Event]) -> WorldSnapshot {
    events
        .iter()
        .fold(WorldSnapshot::new(), |world, e| apply_event(&world, e))
}

// =============================================================================
// Reducer basics
// =============================================================================

#[test]
fn join_then_move_updates_presence() {
    let world = fold(&[
        event("p1", 0, "join", json!({"name": "Ada"})),
        event(
            "p1",
            5,
            "move",
            json!({"position": {"x": 10.0, "y": 0.0, "z": 2.0, "zone": "nexus"}}),
        ),
    ]);

    let citizen = world.citizens.get(&ActorId::from("p1")).expect("citizen");
    assert!(citizen.online);
    assert_eq!(citizen.name.as_deref(), Some("Ada"));
    assert_eq!(citizen.position.x, 10.0);
    assert_eq!(citizen.position.zone, Zone::Nexus);
    assert_eq!(citizen.last_seen, ts(5));
    assert_eq!(world.version, 2);
    assert_eq!(world.changes.len(), 2);
}

#[test]
fn move_without_a_zone_lands_in_the_nexus() {
    // Clients may omit the zone from a reported position; the move must
    // still decode and apply rather than degrade to an unknown kind.
    let world = fold(&[
        event("p1", 0, "join", json!({})),
        event(
            "p1",
            5,
            "move",
            json!({"position": {"x": 10.0, "y": 0.0, "z": 3.0}}),
        ),
    ]);

    assert_eq!(world.changes[1].kind, "move");
    let citizen = world.citizens.get(&ActorId::from("p1")).expect("citizen");
    assert_eq!(citizen.position.x, 10.0);
    assert_eq!(citizen.position.z, 3.0);
    assert_eq!(citizen.position.zone, Zone::Nexus);
}

#[test]
fn duplicate_event_is_not_applied_twice() {
    let gift = event("p1", 10, "gift", json!({"to": "p2", "amount": "4"}));
    let mut world = WorldSnapshot::new();
    world.economy_mut().credit(&ActorId::from("p1"), Decimal::from(10));

    let once = apply_event(&world, &gift);
    let twice = apply_event(&once, &gift);

    assert_eq!(once.economy.balance(&ActorId::from("p2")), Decimal::from(4));
    assert_eq!(twice, once);
    assert_eq!(twice.economy.transactions.len(), 1);
}

#[test]
fn apply_leaves_input_untouched_and_shares_sub_trees() {
    let before = fold(&[event("p1", 0, "join", json!({}))]);
    let frozen = before.clone();

    let after = apply_event(&before, &event("p1", 1, "say", json!({"text": "hello"})));

    // The input snapshot is a value; applying must not have changed it.
    assert_eq!(before, frozen);
    // Chat was written; presence was touched; everything else is shared.
    assert!(!Arc::ptr_eq(&before.chat, &after.chat));
    assert!(Arc::ptr_eq(&before.economy, &after.economy));
    assert!(Arc::ptr_eq(&before.structures, &after.structures));
    assert!(Arc::ptr_eq(&before.gardens, &after.gardens));
    assert!(Arc::ptr_eq(&before.amendments, &after.amendments));
    assert!(Arc::ptr_eq(&before.crm, &after.crm));
}

#[test]
fn unknown_kind_is_a_change_log_only_no_op() {
    let world = fold(&[event("p1", 0, "levitate", json!({"height": 3}))]);
    assert_eq!(world.changes.len(), 1);
    assert_eq!(world.changes[0].kind, "levitate");
    assert_eq!(world.version, 1);
    // Presence is still touched: any event is a sign of life.
    assert!(world.citizens.contains_key(&ActorId::from("p1")));
}

// =============================================================================
// Marketplace
// =============================================================================

#[test]
fn sell_then_buy_settles_funds_item_and_listing() {
    let seller = ActorId::from("p1");
    let buyer = ActorId::from("p2");
    let listing_id = ListingId::derived_with(&seller, ts(10), "lantern");

    let mut world = fold(&[
        event("p1", 0, "join", json!({})),
        event("p2", 1, "join", json!({})),
        event("p1", 10, "sell", json!({"item": "lantern", "price": "7"})),
    ]);
    world.economy_mut().credit(&buyer, Decimal::from(20));

    let world = apply_event(
        &world,
        &event("p2", 20, "buy", json!({"listing_id": listing_id})),
    );

    assert_eq!(world.economy.balance(&buyer), Decimal::from(13));
    assert_eq!(world.economy.balance(&seller), Decimal::from(7));
    let listing = world.economy.listings.get(&listing_id).expect("listing");
    assert!(!listing.active);
    let buyer_record = world.citizens.get(&buyer).expect("buyer");
    assert!(buyer_record.has_item("lantern"));
    assert_eq!(world.economy.transactions.len(), 1);
}

#[test]
fn underfunded_buy_fails_without_side_effects() {
    let seller = ActorId::from("p1");
    let buyer = ActorId::from("p2");
    let listing_id = ListingId::derived_with(&seller, ts(10), "lantern");

    let world = fold(&[
        event("p1", 10, "sell", json!({"item": "lantern", "price": "7"})),
        event("p2", 20, "buy", json!({"listing_id": listing_id})),
    ]);

    // The buy still consumed an event: change logged, version bumped,
    // and a failed action recorded. Nothing economic moved.
    assert_eq!(world.version, 2);
    assert_eq!(world.economy.balance(&buyer), Decimal::ZERO);
    assert_eq!(world.economy.balance(&seller), Decimal::ZERO);
    assert!(world.economy.listings.get(&listing_id).expect("listing").active);
    let failed = world
        .actions
        .iter()
        .find(|record| record.status == ActionStatus::Failed)
        .expect("failure record");
    assert_eq!(failed.from, buyer);
}

// =============================================================================
// Reconciliation
// =============================================================================

#[test]
fn merge_is_idempotent_and_commutative() {
    let base = fold(&[event("p1", 0, "join", json!({}))]);
    let a = apply_event(&base, &event("p1", 5, "say", json!({"text": "east"})));
    let b = apply_event(
        &base,
        &event("p2", 6, "build", json!({"structure": "fountain"})),
    );

    let ab = merge_snapshots(&a, &b);
    let ba = merge_snapshots(&b, &a);
    assert_eq!(ab, ba);
    assert_eq!(merge_snapshots(&ab, &ab), ab);
    assert_eq!(merge_snapshots(&ab, &b), ab);
}

#[test]
fn out_of_order_delivery_is_already_a_merge_fixed_point() {
    // Late deliveries land in timestamp order, so a snapshot merged with
    // itself is unchanged even when its history arrived shuffled.
    let world = fold(&[
        event("p1", 0, "join", json!({})),
        event("p1", 20, "say", json!({"text": "second"})),
        event("p1", 10, "say", json!({"text": "first"})),
        event("p1", 40, "craft", json!({"recipe": "rope"})),
        event("p1", 35, "craft", json!({"recipe": "twine"})),
    ]);

    assert_eq!(world.chat[0].text, "first");
    assert_eq!(world.chat[1].text, "second");
    assert_eq!(world.economy.transactions[0].ts, ts(35));
    assert!(world.changes.windows(2).all(|pair| pair[0] <= pair[1]));

    assert_eq!(merge_snapshots(&world, &world), world);
}

#[test]
fn merged_structures_stay_within_the_cap() {
    let base = WorldSnapshot::new();
    let mut a = base.clone();
    for i in 0..150 {
        a = apply_event(
            &a,
            &event("p1", i, "build", json!({"structure": format!("kiln-{i}")})),
        );
    }
    let mut b = base;
    for i in 0..150 {
        b = apply_event(
            &b,
            &event("p2", 1000 + i, "build", json!({"structure": format!("loom-{i}")})),
        );
    }

    let merged = merge_snapshots(&a, &b);
    assert_eq!(merged.structures.len(), STRUCTURE_CAP);
    // The overflow came out of the oldest builds.
    assert!(merged.structures.values().all(|s| s.built_at >= ts(100)));
    assert_eq!(merged.changes.len(), 300);
}

#[test]
fn disjoint_builds_both_survive_the_merge() {
    let base = WorldSnapshot::new();
    let a = apply_event(
        &base,
        &event("p1", 1, "build", json!({"structure": "tower"})),
    );
    let b = apply_event(
        &base,
        &event("p2", 2, "build", json!({"structure": "bridge"})),
    );

    let merged = merge_snapshots(&a, &b);
    assert_eq!(merged.structures.len(), 2);
    assert_eq!(merged.changes.len(), 2);
    let kinds: Vec<_> = merged
        .structures
        .values()
        .map(|s| s.kind.clone())
        .collect();
    assert!(kinds.contains(&"tower".to_owned()));
    assert!(kinds.contains(&"bridge".to_owned()));
}

#[test]
fn replayed_history_converges_with_merge() {
    // The same sale applied on both replicas must not double after a merge:
    // deterministic ids make the unions collapse.
    let seller = ActorId::from("p1");
    let listing_id = ListingId::derived_with(&seller, ts(10), "rope");
    let history = [
        event("p1", 10, "sell", json!({"item": "rope", "price": "2"})),
        event("p2", 20, "buy", json!({"listing_id": listing_id})),
    ];

    let mut base = WorldSnapshot::new();
    base.economy_mut().credit(&ActorId::from("p2"), Decimal::from(5));
    let a = history.iter().fold(base.clone(), |w, e| apply_event(&w, e));
    let b = history.iter().fold(base, |w, e| apply_event(&w, e));

    let merged = merge_snapshots(&a, &b);
    assert_eq!(merged.economy.transactions.len(), 1);
    assert_eq!(merged.economy.balance(&seller), Decimal::from(2));
    let buyer = merged.citizens.get(&ActorId::from("p2")).expect("buyer");
    assert_eq!(
        buyer.inventory.iter().filter(|i| i.item == "rope").count(),
        1
    );
}

#[test]
fn presence_merge_is_last_writer_wins() {
    let base = fold(&[event("p1", 0, "join", json!({}))]);
    let a = apply_event(&base, &event("p1", 10, "warp", json!({"zone": "gardens"})));
    let b = apply_event(&base, &event("p1", 20, "warp", json!({"zone": "arena"})));

    let merged = merge_snapshots(&a, &b);
    let citizen = merged.citizens.get(&ActorId::from("p1")).expect("citizen");
    assert_eq!(citizen.position.zone, Zone::Arena);
    assert_eq!(citizen.last_seen, ts(20));
}

// =============================================================================
// Elections
// =============================================================================

#[test]
fn election_runs_votes_and_installs_the_steward() {
    let world = fold(&[
        event("p1", 0, "election_start", json!({"zone": "commons"})),
        event(
            "v1",
            10,
            "election_vote",
            json!({"zone": "commons", "candidate": "alice"}),
        ),
        event(
            "v2",
            11,
            "election_vote",
            json!({"zone": "commons", "candidate": "alice"}),
        ),
        event(
            "v3",
            12,
            "election_vote",
            json!({"zone": "commons", "candidate": "bob"}),
        ),
        event("p1", 60, "election_finalize", json!({"zone": "commons"})),
    ]);

    let election = world.elections.get(&Zone::Commons).expect("election");
    assert_eq!(election.status, ElectionStatus::Finalized);
    assert_eq!(election.winner, Some(ActorId::from("alice")));

    let steward = world.stewards.get(&Zone::Commons).expect("steward");
    assert_eq!(steward.steward, ActorId::from("alice"));
    assert_eq!(steward.installed_at, ts(60));
    assert_eq!(steward.term_ends_at, ts(60) + Duration::days(30));
}

#[test]
fn steward_powers_are_gated_on_the_sitting_steward() {
    let world = fold(&[
        event("p1", 0, "election_start", json!({"zone": "commons"})),
        event(
            "v1",
            1,
            "election_vote",
            json!({"zone": "commons", "candidate": "alice"}),
        ),
        event("p1", 2, "election_finalize", json!({"zone": "commons"})),
        event(
            "alice",
            3,
            "steward_set_welcome",
            json!({"zone": "commons", "message": "welcome home"}),
        ),
        event(
            "bob",
            4,
            "steward_set_policy",
            json!({"zone": "commons", "policy": "no policy"}),
        ),
    ]);

    let steward = world.stewards.get(&Zone::Commons).expect("steward");
    assert_eq!(steward.welcome.as_deref(), Some("welcome home"));
    assert_eq!(steward.policy, None);
    assert!(
        world
            .actions
            .iter()
            .any(|record| record.status == ActionStatus::Failed
                && record.from == ActorId::from("bob"))
    );
}

#[test]
fn diverged_election_merges_to_the_finalized_side() {
    let base = fold(&[
        event("p1", 0, "election_start", json!({"zone": "arena"})),
        event(
            "v1",
            1,
            "election_vote",
            json!({"zone": "arena", "candidate": "zed"}),
        ),
    ]);
    let open = apply_event(
        &base,
        &event(
            "v2",
            2,
            "election_vote",
            json!({"zone": "arena", "candidate": "zed"}),
        ),
    );
    let finalized = apply_event(
        &base,
        &event("p1", 2, "election_finalize", json!({"zone": "arena"})),
    );

    // Same updated_at on both sides; the finalized record must win either way.
    for merged in [
        merge_snapshots(&open, &finalized),
        merge_snapshots(&finalized, &open),
    ] {
        let election = merged.elections.get(&Zone::Arena).expect("election");
        assert_eq!(election.status, ElectionStatus::Finalized);
        assert_eq!(election.winner, Some(ActorId::from("zed")));
    }
}

// =============================================================================
// Trades
// =============================================================================

#[test]
fn trade_accept_swaps_the_offered_items() {
    let proposer = ActorId::from("p1");
    let acceptor = ActorId::from("p2");
    let offer_id = ActionId::derived_with(&proposer, ts(10), "trade_offer");

    let world = fold(&[
        event("p1", 0, "craft", json!({"recipe": "rope"})),
        event("p2", 1, "craft", json!({"recipe": "lantern"})),
        event(
            "p1",
            10,
            "trade_offer",
            json!({"to": "p2", "offered": ["rope"], "requested": ["lantern"]}),
        ),
        event("p2", 20, "trade_accept", json!({"offer_id": offer_id})),
    ]);

    let p1 = world.citizens.get(&proposer).expect("proposer");
    let p2 = world.citizens.get(&acceptor).expect("acceptor");
    assert!(p1.has_item("lantern"));
    assert!(!p1.has_item("rope"));
    assert!(p2.has_item("rope"));
    assert!(!p2.has_item("lantern"));

    let offer = world
        .actions
        .iter()
        .find(|record| record.id == offer_id)
        .expect("offer record");
    assert_eq!(offer.status, ActionStatus::Accepted);
}

#[test]
fn trade_accept_skips_items_no_longer_held() {
    let proposer = ActorId::from("p1");
    let offer_id = ActionId::derived_with(&proposer, ts(10), "trade_offer");

    // The offer names a compass the proposer never crafted; the exchange
    // moves what actually exists and skips the rest.
    let world = fold(&[
        event("p1", 0, "craft", json!({"recipe": "rope"})),
        event(
            "p1",
            10,
            "trade_offer",
            json!({"to": "p2", "offered": ["rope", "compass"], "requested": []}),
        ),
        event("p2", 20, "trade_accept", json!({"offer_id": offer_id})),
    ]);

    let p2 = world.citizens.get(&ActorId::from("p2")).expect("acceptor");
    assert!(p2.has_item("rope"));
    assert!(!p2.has_item("compass"));
    let offer = world
        .actions
        .iter()
        .find(|record| record.id == offer_id)
        .expect("offer record");
    assert_eq!(offer.status, ActionStatus::Accepted);
}

#[test]
fn trade_answers_are_gated_on_the_counterparty() {
    let proposer = ActorId::from("p1");
    let offer_id = ActionId::derived_with(&proposer, ts(10), "trade_offer");

    let world = fold(&[
        event("p1", 0, "craft", json!({"recipe": "rope"})),
        event(
            "p1",
            10,
            "trade_offer",
            json!({"to": "p2", "offered": ["rope"], "requested": []}),
        ),
        event("p3", 15, "trade_accept", json!({"offer_id": offer_id})),
        event("p2", 20, "trade_decline", json!({"offer_id": offer_id})),
    ]);

    // The interloper's accept failed; the addressee's decline stood.
    assert!(
        world
            .actions
            .iter()
            .any(|record| record.status == ActionStatus::Failed
                && record.from == ActorId::from("p3"))
    );
    let offer = world
        .actions
        .iter()
        .find(|record| record.id == offer_id)
        .expect("offer record");
    assert_eq!(offer.status, ActionStatus::Declined);
    let p1 = world.citizens.get(&proposer).expect("proposer");
    assert!(p1.has_item("rope"));
}

// =============================================================================
// Gardens
// =============================================================================

#[test]
fn harvest_waits_for_growth_and_pays_taxed_spark() {
    let farmer = ActorId::from("p1");
    let mut world = fold(&[event(
        "p1",
        0,
        "plant",
        json!({"plot": "east", "species": "moonflower"}),
    )]);
    world.economy_mut().credit(&farmer, Decimal::from(120));

    let early = apply_event(&world, &event("p1", 10, "harvest", json!({"plot": "east"})));
    assert_eq!(early.gardens.len(), 1);
    assert!(
        early
            .actions
            .iter()
            .any(|record| record.status == ActionStatus::Failed)
    );

    let done = apply_event(
        &world,
        &event("p1", DEFAULT_GROWTH_SECS, "harvest", json!({"plot": "east"})),
    );
    assert!(done.gardens.is_empty());
    assert!(done.citizens.get(&farmer).expect("farmer").has_item("moonflower"));
    // One Spark gross, 15% bracket at a balance of 120.
    assert_eq!(
        done.economy.balance(&farmer),
        Decimal::from(120) + Decimal::new(85, 2)
    );
    assert_eq!(
        done.economy.balance(&ActorId::from("TREASURY")),
        Decimal::new(15, 2)
    );
    assert_eq!(done.economy.transactions.len(), 1);
}

#[test]
fn harvest_picks_a_ready_garden_over_an_unripe_one() {
    let mut world = fold(&[
        event("p1", 0, "plant", json!({"plot": "east", "species": "moonflower"})),
        event("p1", 1, "plant", json!({"plot": "east", "species": "starfruit"})),
    ]);
    let ids: Vec<_> = world.gardens.keys().copied().collect();
    // Ripen only the garden that sorts second, so an unripe one sits
    // ahead of it in id order.
    if let Some(garden) = world.gardens_mut().get_mut(&ids[1]) {
        garden.ready = true;
    }

    let world = apply_event(&world, &event("p1", 30, "harvest", json!({"plot": "east"})));

    assert_eq!(world.gardens.len(), 1);
    assert!(world.gardens.contains_key(&ids[0]));
    assert!(
        !world
            .actions
            .iter()
            .any(|record| record.status == ActionStatus::Failed)
    );
}

// =============================================================================
// Amendments
// =============================================================================

#[test]
fn amendment_votes_are_weighted_and_close_is_gated() {
    let proposer = ActorId::from("p1");
    let amendment_id = AmendmentId::derived_with(&proposer, ts(0), "Open the archives");
    let mut base = WorldSnapshot::new();
    base.economy_mut().credit(&ActorId::from("v2"), Decimal::from(10));

    let history = [
        event(
            "p1",
            0,
            "propose_amendment",
            json!({
                "title": "Open the archives",
                "description": "Publish the steward logs for every zone.",
                "diff_text": "+ steward logs are public",
            }),
        ),
        event(
            "v1",
            10,
            "vote_amendment",
            json!({"amendment_id": amendment_id, "vote": "for"}),
        ),
        event(
            "v1",
            11,
            "vote_amendment",
            json!({"amendment_id": amendment_id, "vote": "for"}),
        ),
        event(
            "v2",
            12,
            "vote_amendment",
            json!({"amendment_id": amendment_id, "vote": "against"}),
        ),
        event(
            "bob",
            20,
            "close_amendment",
            json!({"amendment_id": amendment_id, "result": "rejected"}),
        ),
    ];
    let world = history.iter().fold(base, |w, e| apply_event(&w, e));

    // The repeat vote was refused and a non-aggregator cannot close.
    let amendment = world.amendments.get(&amendment_id).expect("amendment");
    assert_eq!(amendment.status, AmendmentStatus::Open);
    assert_eq!(amendment.votes.len(), 2);
    assert_eq!(amendment.votes[0].weight, Decimal::ONE);
    assert_eq!(amendment.votes[1].weight, Decimal::from(10));

    let world = apply_event(
        &world,
        &event(
            GOVERNANCE_ACTOR,
            30,
            "close_amendment",
            json!({"amendment_id": amendment_id, "result": "rejected"}),
        ),
    );
    let amendment = world.amendments.get(&amendment_id).expect("amendment");
    assert_eq!(amendment.status, AmendmentStatus::Closed);
    assert_eq!(amendment.result, Some(AmendmentResult::Rejected));
    let tally = amendment.tally.as_ref().expect("tally");
    assert_eq!(tally.for_weight, Decimal::ONE);
    assert_eq!(tally.against_weight, Decimal::from(10));
    assert_eq!(tally.total_voters, 2);
}

#[test]
fn unconstitutional_proposals_never_open() {
    let world = fold(&[event(
        "p1",
        0,
        "propose_amendment",
        json!({
            "title": "Efficiency",
            "description": "Move the engine to a closed source license.",
            "diff_text": "+ private repo",
        }),
    )]);

    assert!(world.amendments.is_empty());
    assert!(
        world
            .actions
            .iter()
            .any(|record| record.status == ActionStatus::Failed
                && record.from == ActorId::from("p1"))
    );
}

// =============================================================================
// CRM simulation
// =============================================================================

#[test]
fn crm_actions_drive_deals_through_the_pipeline() {
    let owner = ActorId::from("p1");
    let account_id = derive_string_id("acc", &owner, ts(0), "Nexus Lanterns");
    let opportunity_id = derive_string_id("opp", &owner, ts(10), "Lantern refresh");

    let world = fold(&[
        event(
            "p1",
            0,
            "sim_crm_action",
            json!({"action": "create_account", "data": {"name": "Nexus Lanterns", "industry": "retail"}}),
        ),
        event(
            "p1",
            10,
            "sim_crm_action",
            json!({"action": "create_opportunity", "data": {"name": "Lantern refresh", "accountId": account_id, "value": 40}}),
        ),
        event(
            "p1",
            20,
            "sim_crm_action",
            json!({"action": "update_stage", "data": {"id": opportunity_id, "stage": "negotiation"}}),
        ),
        event(
            "p1",
            30,
            "sim_crm_action",
            json!({"action": "close_deal", "data": {"id": opportunity_id, "won": true}}),
        ),
        event(
            "p1",
            40,
            "sim_crm_action",
            json!({"action": "update_stage", "data": {"id": opportunity_id, "stage": "prospecting"}}),
        ),
    ]);

    let account = world.crm.accounts.get(&account_id).expect("account");
    assert_eq!(account.industry, "retail");
    assert_eq!(account.owner, owner);

    // Won deals are terminal; the late stage update changed nothing.
    let deal = world.crm.opportunities.get(&opportunity_id).expect("deal");
    assert_eq!(deal.stage, PipelineStage::ClosedWon);
    assert_eq!(deal.probability, 100);
    assert_eq!(deal.value, Decimal::from(40));
    assert_eq!(deal.closed_at, Some(ts(30)));
}
