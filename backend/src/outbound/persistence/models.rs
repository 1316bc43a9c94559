//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{accountings, item_participants, items, tickets, users};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub username: &'a str,
    pub created_at: DateTime<Utc>,
}

/// Ticket header row; used for both reads and inserts.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = tickets)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct TicketRow {
    pub id: Uuid,
    pub buyer_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Row struct for reading from the items table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ItemRow {
    pub id: Uuid,
    pub ticket_id: Uuid,
    pub name: String,
    pub quantity: i32,
    pub price: f64,
}

/// Insertable struct for creating item records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = items)]
pub(crate) struct NewItemRow<'a> {
    pub id: Uuid,
    pub ticket_id: Uuid,
    pub position: i32,
    pub name: &'a str,
    pub quantity: i32,
    pub price: f64,
}

/// Insertable struct linking an item to a participant.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = item_participants)]
pub(crate) struct NewItemParticipantRow {
    pub item_id: Uuid,
    pub user_id: Uuid,
}

/// Accounting row; used for reads, inserts and `RETURNING` clauses.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = accountings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AccountingRow {
    pub id: Uuid,
    pub ticket_id: Uuid,
    pub user_from: Uuid,
    pub user_to: Uuid,
    pub total_price: f64,
    pub paid_price: f64,
}
