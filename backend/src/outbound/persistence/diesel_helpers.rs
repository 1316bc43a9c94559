//! Shared Diesel helpers for loading and writing ticket graphs.
//!
//! A ticket graph is the ticket row plus its items, item participants and
//! accountings. Loading is split into a database step returning raw rows and
//! a pure assembly step that validates them into domain types.

use std::collections::HashMap;

use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::{Accounting, Item, Participant, Ticket, UserId, Username};

use super::models::{
    AccountingRow, ItemRow, NewItemParticipantRow, NewItemRow, TicketRow, UserRow,
};
use super::schema::{accountings, item_participants, items, tickets, users};

/// Item rows and their participants for a set of tickets.
pub(super) struct ItemRows {
    items: Vec<ItemRow>,
    participants: Vec<(Uuid, UserRow)>,
}

/// Load every item of `ticket_ids`, in ticket position order.
pub(super) async fn load_item_rows(
    conn: &mut AsyncPgConnection,
    ticket_ids: &[Uuid],
) -> QueryResult<ItemRows> {
    let item_rows: Vec<ItemRow> = items::table
        .filter(items::ticket_id.eq_any(ticket_ids))
        .order((items::ticket_id.asc(), items::position.asc()))
        .select(ItemRow::as_select())
        .load(conn)
        .await?;
    let item_ids: Vec<Uuid> = item_rows.iter().map(|row| row.id).collect();
    let participants: Vec<(Uuid, UserRow)> = item_participants::table
        .inner_join(users::table)
        .filter(item_participants::item_id.eq_any(&item_ids))
        .order(users::username.asc())
        .select((item_participants::item_id, UserRow::as_select()))
        .load(conn)
        .await?;

    Ok(ItemRows {
        items: item_rows,
        participants,
    })
}

/// Validate item rows into domain items grouped by ticket id.
pub(super) fn assemble_items(rows: ItemRows) -> Result<HashMap<Uuid, Vec<Item>>, String> {
    let mut participants_by_item: HashMap<Uuid, Vec<Participant>> = HashMap::new();
    for (item_id, user) in rows.participants {
        let username = Username::new(&user.username)
            .map_err(|err| format!("stored username {}: {err}", user.username))?;
        participants_by_item
            .entry(item_id)
            .or_default()
            .push(Participant {
                id: UserId::from(user.id),
                username,
            });
    }

    let mut by_ticket: HashMap<Uuid, Vec<Item>> = HashMap::new();
    for row in rows.items {
        let quantity = u32::try_from(row.quantity)
            .map_err(|_| format!("item {} has negative quantity", row.id))?;
        by_ticket.entry(row.ticket_id).or_default().push(Item {
            name: row.name,
            quantity,
            price: row.price,
            participants: participants_by_item.remove(&row.id).unwrap_or_default(),
        });
    }
    Ok(by_ticket)
}

pub(super) fn accounting_from_row(row: AccountingRow) -> Accounting {
    Accounting {
        id: row.id.into(),
        ticket_id: row.ticket_id.into(),
        user_from: row.user_from.into(),
        user_to: row.user_to.into(),
        total_price: row.total_price,
        paid_price: row.paid_price,
    }
}

fn accounting_to_row(accounting: &Accounting) -> AccountingRow {
    AccountingRow {
        id: *accounting.id.as_uuid(),
        ticket_id: *accounting.ticket_id.as_uuid(),
        user_from: *accounting.user_from.as_uuid(),
        user_to: *accounting.user_to.as_uuid(),
        total_price: accounting.total_price,
        paid_price: accounting.paid_price,
    }
}

/// Raw rows of complete ticket graphs.
pub(super) struct TicketGraphRows {
    tickets: Vec<TicketRow>,
    items: ItemRows,
    accountings: Vec<AccountingRow>,
}

/// Load the full graph of each ticket row, preserving the row order.
pub(super) async fn load_ticket_graphs(
    conn: &mut AsyncPgConnection,
    ticket_rows: Vec<TicketRow>,
) -> QueryResult<TicketGraphRows> {
    let ids: Vec<Uuid> = ticket_rows.iter().map(|row| row.id).collect();
    let item_rows = load_item_rows(conn, &ids).await?;
    let accounting_rows: Vec<AccountingRow> = accountings::table
        .filter(accountings::ticket_id.eq_any(&ids))
        .order(accountings::user_to.asc())
        .select(AccountingRow::as_select())
        .load(conn)
        .await?;

    Ok(TicketGraphRows {
        tickets: ticket_rows,
        items: item_rows,
        accountings: accounting_rows,
    })
}

/// Validate graph rows into domain tickets.
pub(super) fn assemble_tickets(rows: TicketGraphRows) -> Result<Vec<Ticket>, String> {
    let mut items = assemble_items(rows.items)?;
    let mut accountings_by_ticket: HashMap<Uuid, Vec<Accounting>> = HashMap::new();
    for row in rows.accountings {
        accountings_by_ticket
            .entry(row.ticket_id)
            .or_default()
            .push(accounting_from_row(row));
    }

    Ok(rows
        .tickets
        .into_iter()
        .map(|row| Ticket {
            id: row.id.into(),
            buyer: row.buyer_id.into(),
            created_at: row.created_at,
            items: items.remove(&row.id).unwrap_or_default(),
            accountings: accountings_by_ticket.remove(&row.id).unwrap_or_default(),
        })
        .collect())
}

/// Insert `items` for `ticket_id` with their participants.
pub(super) async fn insert_items(
    conn: &mut AsyncPgConnection,
    ticket_id: Uuid,
    ticket_items: &[Item],
) -> QueryResult<()> {
    let mut item_rows = Vec::with_capacity(ticket_items.len());
    let mut participant_rows = Vec::new();
    for (position, item) in ticket_items.iter().enumerate() {
        let id = Uuid::new_v4();
        item_rows.push(NewItemRow {
            id,
            ticket_id,
            position: i32::try_from(position).map_err(|_| {
                diesel::result::Error::QueryBuilderError("too many items on one ticket".into())
            })?,
            name: item.name.as_str(),
            quantity: i32::try_from(item.quantity).map_err(|_| {
                diesel::result::Error::QueryBuilderError("item quantity out of range".into())
            })?,
            price: item.price,
        });
        participant_rows.extend(item.participants.iter().map(|p| NewItemParticipantRow {
            item_id: id,
            user_id: *p.id.as_uuid(),
        }));
    }

    if !item_rows.is_empty() {
        diesel::insert_into(items::table)
            .values(&item_rows)
            .execute(conn)
            .await?;
    }
    if !participant_rows.is_empty() {
        diesel::insert_into(item_participants::table)
            .values(&participant_rows)
            .execute(conn)
            .await?;
    }
    Ok(())
}

/// Insert accountings.
pub(super) async fn insert_accountings(
    conn: &mut AsyncPgConnection,
    ledger: &[Accounting],
) -> QueryResult<()> {
    if ledger.is_empty() {
        return Ok(());
    }
    let rows: Vec<AccountingRow> = ledger.iter().map(accounting_to_row).collect();
    diesel::insert_into(accountings::table)
        .values(&rows)
        .execute(conn)
        .await?;
    Ok(())
}

/// Insert a whole ticket graph. Callers run this inside a transaction.
pub(super) async fn insert_ticket_graph(
    conn: &mut AsyncPgConnection,
    ticket: &Ticket,
) -> QueryResult<()> {
    let id = *ticket.id.as_uuid();
    diesel::insert_into(tickets::table)
        .values(&TicketRow {
            id,
            buyer_id: *ticket.buyer.as_uuid(),
            created_at: ticket.created_at,
        })
        .execute(conn)
        .await?;
    insert_items(conn, id, &ticket.items).await?;
    insert_accountings(conn, &ticket.accountings).await
}
