//! Serializable read models returned by the driving ports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{Accounting, Item, LedgerEntry, Participant, Ticket, User};

/// A participant of an item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantPayload {
    pub id: Uuid,
    #[schema(example = "alice")]
    pub username: String,
}

/// One ticket line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemPayload {
    #[schema(example = "pizza")]
    pub name: String,
    #[schema(example = 1)]
    pub quantity: u32,
    #[schema(example = 10.0)]
    pub price: f64,
    pub participants: Vec<ParticipantPayload>,
}

/// One ledger edge of a ticket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccountingPayload {
    pub id: Uuid,
    pub ticket_id: Uuid,
    pub user_from: Uuid,
    pub user_to: Uuid,
    #[schema(example = 5.0)]
    pub total_price: f64,
    #[schema(example = 0.0)]
    pub paid_price: f64,
}

/// Full ticket representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TicketPayload {
    pub id: Uuid,
    pub buyer: Uuid,
    pub created_at: DateTime<Utc>,
    pub items: Vec<ItemPayload>,
    pub accountings: Vec<AccountingPayload>,
}

/// An accounting listed with its ticket context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntryPayload {
    #[serde(flatten)]
    pub accounting: AccountingPayload,
    pub ticket_created_at: DateTime<Utc>,
    pub items: Vec<ItemPayload>,
}

/// Public user representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserPayload {
    pub id: Uuid,
    #[schema(example = "alice")]
    pub username: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Participant> for ParticipantPayload {
    fn from(value: &Participant) -> Self {
        Self {
            id: *value.id.as_uuid(),
            username: value.username.to_string(),
        }
    }
}

impl From<&Item> for ItemPayload {
    fn from(value: &Item) -> Self {
        Self {
            name: value.name.clone(),
            quantity: value.quantity,
            price: value.price,
            participants: value.participants.iter().map(Into::into).collect(),
        }
    }
}

impl From<&Accounting> for AccountingPayload {
    fn from(value: &Accounting) -> Self {
        Self {
            id: *value.id.as_uuid(),
            ticket_id: *value.ticket_id.as_uuid(),
            user_from: *value.user_from.as_uuid(),
            user_to: *value.user_to.as_uuid(),
            total_price: value.total_price,
            paid_price: value.paid_price,
        }
    }
}

impl From<Ticket> for TicketPayload {
    fn from(value: Ticket) -> Self {
        Self {
            id: *value.id.as_uuid(),
            buyer: *value.buyer.as_uuid(),
            created_at: value.created_at,
            items: value.items.iter().map(Into::into).collect(),
            accountings: value.accountings.iter().map(Into::into).collect(),
        }
    }
}

impl From<LedgerEntry> for LedgerEntryPayload {
    fn from(value: LedgerEntry) -> Self {
        Self {
            accounting: AccountingPayload::from(&value.accounting),
            ticket_created_at: value.ticket_created_at,
            items: value.items.iter().map(Into::into).collect(),
        }
    }
}

impl From<User> for UserPayload {
    fn from(value: User) -> Self {
        Self {
            id: *value.id().as_uuid(),
            username: value.username().to_string(),
            created_at: value.created_at(),
        }
    }
}
