//! CRM simulation records.
//!
//! The agora hosts an embedded CRM simulation that actors drive through
//! `sim_crm_action` events: accounts, contacts, opportunities moving
//! through a sales pipeline, and a flat activity log. Record ids are
//! deterministic strings (`acc_`, `con_`, `opp_`, `act_` prefixes) so two
//! replicas applying the same action agree on the id.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{CrmActivityType, PipelineStage, Zone};
use crate::ids::ActorId;

/// A timestamped note attached to a CRM record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CrmNote {
    /// Note text.
    pub text: String,
    /// Who wrote it.
    pub author: ActorId,
    /// When it was written.
    pub ts: DateTime<Utc>,
}

/// A CRM account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CrmAccount {
    /// Record id (`acc_` prefix).
    pub id: String,
    /// Account name.
    pub name: String,
    /// Industry label.
    pub industry: String,
    /// Annual revenue in Spark.
    #[ts(as = "String")]
    pub revenue: Decimal,
    /// Owning actor.
    pub owner: ActorId,
    /// Free-form status label (`active` by default).
    pub status: String,
    /// Zone the account operates from.
    pub zone: Zone,
    /// Attached notes.
    pub notes: Vec<CrmNote>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record was last updated.
    pub updated_at: Option<DateTime<Utc>>,
}

/// A CRM contact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CrmContact {
    /// Record id (`con_` prefix).
    pub id: String,
    /// Contact name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Phone number.
    pub phone: String,
    /// Role at the account.
    pub role: String,
    /// Id of the account the contact belongs to, when linked.
    pub account_id: String,
    /// Owning actor.
    pub owner: ActorId,
    /// Attached notes.
    pub notes: Vec<CrmNote>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record was last updated.
    pub updated_at: Option<DateTime<Utc>>,
}

/// A CRM opportunity moving through the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CrmOpportunity {
    /// Record id (`opp_` prefix).
    pub id: String,
    /// Opportunity name.
    pub name: String,
    /// Id of the related account, when linked.
    pub account_id: String,
    /// Current pipeline stage. Closed stages are terminal: `update_stage`
    /// does not reopen a closed deal.
    pub stage: PipelineStage,
    /// Deal value in Spark.
    #[ts(as = "String")]
    pub value: Decimal,
    /// Win probability percentage, following the stage by default.
    pub probability: u8,
    /// Owning actor.
    pub owner: ActorId,
    /// Expected close date label (free-form).
    pub expected_close: String,
    /// Reason supplied when the deal closed, if any.
    pub close_reason: Option<String>,
    /// Attached notes.
    pub notes: Vec<CrmNote>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record was last updated.
    pub updated_at: Option<DateTime<Utc>>,
    /// When the deal closed.
    pub closed_at: Option<DateTime<Utc>>,
}

/// A logged CRM activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CrmActivity {
    /// Record id (`act_` prefix).
    pub id: String,
    /// Activity category.
    pub activity_type: CrmActivityType,
    /// Subject line.
    pub subject: String,
    /// Id of the record the activity regards, when linked.
    pub regarding: String,
    /// Type of the regarded record (free-form).
    pub regarding_type: String,
    /// Free-form status label (`open` by default).
    pub status: String,
    /// Owning actor.
    pub owner: ActorId,
    /// Free-form notes.
    pub notes: String,
    /// When the activity was logged.
    pub created_at: DateTime<Utc>,
}

/// The whole CRM simulation sub-tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, Default)]
#[ts(export, export_to = "bindings/")]
pub struct CrmState {
    /// Accounts by record id.
    pub accounts: BTreeMap<String, CrmAccount>,
    /// Contacts by record id.
    pub contacts: BTreeMap<String, CrmContact>,
    /// Opportunities by record id.
    pub opportunities: BTreeMap<String, CrmOpportunity>,
    /// Activity log, sorted by `(created_at, id)`.
    pub activities: Vec<CrmActivity>,
}
