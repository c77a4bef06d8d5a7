//! The embedded CRM simulation.
//!
//! Actors in the agora drive a small CRM -- accounts, contacts, deals
//! moving through a pipeline, an activity log -- through `sim_crm_action`
//! events (or `build` events routed here by their `sim` field). Action
//! data arrives as loose JSON; missing fields take the simulation's
//! defaults and unknown actions are rejected.

use rust_decimal::Decimal;
use serde_json::Value;

use meridian_events::Event;
use meridian_types::{
    CrmAccount, CrmActivity, CrmActivityType, CrmContact, CrmNote, CrmOpportunity, PipelineStage,
    Zone, derive_string_id,
};

use crate::snapshot::WorldSnapshot;

use super::reject;

fn str_field(data: &Value, key: &str) -> Option<String> {
    data.get(key).and_then(Value::as_str).map(str::to_owned)
}

fn decimal_field(data: &Value, key: &str) -> Option<Decimal> {
    match data.get(key) {
        Some(Value::Number(number)) => number
            .as_i64()
            .map(Decimal::from)
            .or_else(|| number.as_f64().and_then(|f| Decimal::try_from(f).ok())),
        Some(Value::String(text)) => text.parse().ok(),
        _ => None,
    }
}

pub(super) fn apply(snapshot: &mut WorldSnapshot, event: &Event, action: &str, data: &Value) {
    match action {
        "create_account" => create_account(snapshot, event, data),
        "update_account" => update_account(snapshot, event, data),
        "create_contact" => create_contact(snapshot, event, data),
        "update_contact" => update_contact(snapshot, event, data),
        "create_opportunity" => create_opportunity(snapshot, event, data),
        "update_stage" => update_stage(snapshot, event, data),
        "close_deal" => close_deal(snapshot, event, data),
        "log_activity" => log_activity(snapshot, event, data),
        "add_note" => add_note(snapshot, event, data),
        _ => reject(snapshot, event, &format!("unknown crm action '{action}'")),
    }
}

fn create_account(snapshot: &mut WorldSnapshot, event: &Event, data: &Value) {
    let name = str_field(data, "name").unwrap_or_else(|| "Unnamed Account".to_owned());
    let id = derive_string_id("acc", &event.from, event.ts, &name);
    let zone = str_field(data, "zone")
        .and_then(|tag| Zone::from_wire(&tag))
        .unwrap_or(Zone::Agora);
    snapshot.crm_mut().accounts.insert(
        id.clone(),
        CrmAccount {
            id,
            name,
            industry: str_field(data, "industry").unwrap_or_else(|| "general".to_owned()),
            revenue: decimal_field(data, "revenue").unwrap_or(Decimal::ZERO),
            owner: str_field(data, "owner").map_or_else(|| event.from.clone(), Into::into),
            status: str_field(data, "status").unwrap_or_else(|| "active".to_owned()),
            zone,
            notes: Vec::new(),
            created_at: event.ts,
            updated_at: None,
        },
    );
}

fn update_account(snapshot: &mut WorldSnapshot, event: &Event, data: &Value) {
    let Some(id) = str_field(data, "id") else {
        reject(snapshot, event, "update_account requires an id");
        return;
    };
    let Some(account) = snapshot.crm_mut().accounts.get_mut(&id) else {
        reject(snapshot, event, &format!("no account '{id}'"));
        return;
    };
    if let Some(name) = str_field(data, "name") {
        account.name = name;
    }
    if let Some(industry) = str_field(data, "industry") {
        account.industry = industry;
    }
    if let Some(revenue) = decimal_field(data, "revenue") {
        account.revenue = revenue;
    }
    if let Some(owner) = str_field(data, "owner") {
        account.owner = owner.into();
    }
    if let Some(status) = str_field(data, "status") {
        account.status = status;
    }
    if let Some(zone) = str_field(data, "zone").and_then(|tag| Zone::from_wire(&tag)) {
        account.zone = zone;
    }
    account.updated_at = Some(event.ts);
}

fn create_contact(snapshot: &mut WorldSnapshot, event: &Event, data: &Value) {
    let name = str_field(data, "name").unwrap_or_else(|| "Unnamed Contact".to_owned());
    let id = derive_string_id("con", &event.from, event.ts, &name);
    snapshot.crm_mut().contacts.insert(
        id.clone(),
        CrmContact {
            id,
            name,
            email: str_field(data, "email").unwrap_or_default(),
            phone: str_field(data, "phone").unwrap_or_default(),
            role: str_field(data, "role").unwrap_or_default(),
            account_id: str_field(data, "accountId").unwrap_or_default(),
            owner: str_field(data, "owner").map_or_else(|| event.from.clone(), Into::into),
            notes: Vec::new(),
            created_at: event.ts,
            updated_at: None,
        },
    );
}

fn update_contact(snapshot: &mut WorldSnapshot, event: &Event, data: &Value) {
    let Some(id) = str_field(data, "id") else {
        reject(snapshot, event, "update_contact requires an id");
        return;
    };
    let Some(contact) = snapshot.crm_mut().contacts.get_mut(&id) else {
        reject(snapshot, event, &format!("no contact '{id}'"));
        return;
    };
    if let Some(name) = str_field(data, "name") {
        contact.name = name;
    }
    if let Some(email) = str_field(data, "email") {
        contact.email = email;
    }
    if let Some(phone) = str_field(data, "phone") {
        contact.phone = phone;
    }
    if let Some(role) = str_field(data, "role") {
        contact.role = role;
    }
    if let Some(account_id) = str_field(data, "accountId") {
        contact.account_id = account_id;
    }
    if let Some(owner) = str_field(data, "owner") {
        contact.owner = owner.into();
    }
    contact.updated_at = Some(event.ts);
}

fn create_opportunity(snapshot: &mut WorldSnapshot, event: &Event, data: &Value) {
    let name = str_field(data, "name").unwrap_or_else(|| "Unnamed Opportunity".to_owned());
    let id = derive_string_id("opp", &event.from, event.ts, &name);
    let stage = str_field(data, "stage")
        .and_then(|tag| PipelineStage::from_wire(&tag))
        .unwrap_or(PipelineStage::Prospecting);
    let probability = data
        .get("probability")
        .and_then(Value::as_u64)
        .and_then(|p| u8::try_from(p).ok())
        .unwrap_or_else(|| stage.probability());
    snapshot.crm_mut().opportunities.insert(
        id.clone(),
        CrmOpportunity {
            id,
            name,
            account_id: str_field(data, "accountId").unwrap_or_default(),
            stage,
            value: decimal_field(data, "value").unwrap_or(Decimal::ZERO),
            probability,
            owner: str_field(data, "owner").map_or_else(|| event.from.clone(), Into::into),
            expected_close: str_field(data, "expected_close").unwrap_or_default(),
            close_reason: None,
            notes: Vec::new(),
            created_at: event.ts,
            updated_at: None,
            closed_at: None,
        },
    );
}

fn update_stage(snapshot: &mut WorldSnapshot, event: &Event, data: &Value) {
    let Some(id) = str_field(data, "id") else {
        reject(snapshot, event, "update_stage requires an id");
        return;
    };
    let Some(stage) = str_field(data, "stage").and_then(|tag| PipelineStage::from_wire(&tag))
    else {
        reject(snapshot, event, "update_stage requires a valid stage");
        return;
    };
    let Some(opportunity) = snapshot.crm_mut().opportunities.get_mut(&id) else {
        reject(snapshot, event, &format!("no opportunity '{id}'"));
        return;
    };
    // Closed deals are terminal; a stage update cannot reopen them.
    if opportunity.stage.is_closed() {
        tracing::debug!(%id, "stage update on closed deal ignored");
        return;
    }
    opportunity.stage = stage;
    opportunity.probability = stage.probability();
    opportunity.updated_at = Some(event.ts);
}

fn close_deal(snapshot: &mut WorldSnapshot, event: &Event, data: &Value) {
    let Some(id) = str_field(data, "id") else {
        reject(snapshot, event, "close_deal requires an id");
        return;
    };
    let won = data.get("won").and_then(Value::as_bool).unwrap_or(false);
    let value = decimal_field(data, "value");
    let reason = str_field(data, "reason");
    let Some(opportunity) = snapshot.crm_mut().opportunities.get_mut(&id) else {
        reject(snapshot, event, &format!("no opportunity '{id}'"));
        return;
    };
    let stage = if won {
        PipelineStage::ClosedWon
    } else {
        PipelineStage::ClosedLost
    };
    opportunity.stage = stage;
    opportunity.probability = stage.probability();
    if let Some(value) = value {
        opportunity.value = value;
    }
    if let Some(reason) = reason {
        opportunity.close_reason = Some(reason);
    }
    opportunity.closed_at = Some(event.ts);
    opportunity.updated_at = Some(event.ts);
}

fn log_activity(snapshot: &mut WorldSnapshot, event: &Event, data: &Value) {
    let subject = str_field(data, "subject").unwrap_or_default();
    let id = derive_string_id("act", &event.from, event.ts, &subject);
    let activity_type = str_field(data, "type")
        .map_or(CrmActivityType::Task, |tag| {
            CrmActivityType::from_wire_or_default(&tag)
        });
    let activity = CrmActivity {
        id,
        activity_type,
        subject,
        regarding: str_field(data, "regarding").unwrap_or_default(),
        regarding_type: str_field(data, "regardingType").unwrap_or_default(),
        status: str_field(data, "status").unwrap_or_else(|| "open".to_owned()),
        owner: str_field(data, "owner").map_or_else(|| event.from.clone(), Into::into),
        notes: str_field(data, "notes").unwrap_or_default(),
        created_at: event.ts,
    };
    let activities = &mut snapshot.crm_mut().activities;
    let index = activities
        .binary_search_by(|held| {
            (held.created_at, held.id.as_str()).cmp(&(activity.created_at, activity.id.as_str()))
        })
        .unwrap_or_else(|index| index);
    activities.insert(index, activity);
}

fn add_note(snapshot: &mut WorldSnapshot, event: &Event, data: &Value) {
    let entity_type = str_field(data, "entityType").unwrap_or_default();
    let Some(entity_id) = str_field(data, "entityId") else {
        reject(snapshot, event, "add_note requires an entityId");
        return;
    };
    let note = CrmNote {
        text: str_field(data, "text").unwrap_or_default(),
        author: event.from.clone(),
        ts: event.ts,
    };

    let crm = snapshot.crm_mut();
    let attached = match entity_type.as_str() {
        "account" => crm.accounts.get_mut(&entity_id).map(|a| a.notes.push(note)),
        "contact" => crm.contacts.get_mut(&entity_id).map(|c| c.notes.push(note)),
        "opportunity" => crm
            .opportunities
            .get_mut(&entity_id)
            .map(|o| o.notes.push(note)),
        _ => None,
    };
    if attached.is_none() {
        reject(
            snapshot,
            event,
            &format!("no {entity_type} record '{entity_id}' to note"),
        );
    }
}
