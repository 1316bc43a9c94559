//! PostgreSQL-backed `TicketRepository` implementation using Diesel ORM.
//!
//! Every write runs in one transaction so an edit and the refund tickets it
//! spawns are committed together or not at all.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::domain::ports::{TicketPersistenceError, TicketRepository};
use crate::domain::{Ticket, TicketId, UserId};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::diesel_helpers::{
    assemble_tickets, insert_accountings, insert_items, insert_ticket_graph, load_ticket_graphs,
};
use super::models::TicketRow;
use super::pool::{DbPool, PoolError};
use super::schema::{accountings, items, tickets};

/// Diesel-backed implementation of the ticket repository port.
#[derive(Clone)]
pub struct DieselTicketRepository {
    pool: DbPool,
}

impl DieselTicketRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> TicketPersistenceError {
    map_basic_pool_error(error, TicketPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> TicketPersistenceError {
    map_basic_diesel_error(
        error,
        TicketPersistenceError::query,
        TicketPersistenceError::connection,
    )
}

#[async_trait]
impl TicketRepository for DieselTicketRepository {
    async fn create(&self, ticket: &Ticket) -> Result<(), TicketPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        conn.transaction(|conn| async move { insert_ticket_graph(conn, ticket).await }.scope_boxed())
            .await
            .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, id: &TicketId) -> Result<Option<Ticket>, TicketPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<TicketRow> = tickets::table
            .find(*id.as_uuid())
            .select(TicketRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        let Some(row) = row else {
            return Ok(None);
        };

        let graph = load_ticket_graphs(&mut conn, vec![row])
            .await
            .map_err(map_diesel_error)?;
        let tickets = assemble_tickets(graph).map_err(TicketPersistenceError::query)?;
        Ok(tickets.into_iter().next())
    }

    async fn list_by_buyer(&self, buyer: &UserId) -> Result<Vec<Ticket>, TicketPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<TicketRow> = tickets::table
            .filter(tickets::buyer_id.eq(*buyer.as_uuid()))
            .order((tickets::created_at.desc(), tickets::id.asc()))
            .select(TicketRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let graph = load_ticket_graphs(&mut conn, rows)
            .await
            .map_err(map_diesel_error)?;
        assemble_tickets(graph).map_err(TicketPersistenceError::query)
    }

    async fn save_edit(
        &self,
        edited: &Ticket,
        refunds: &[Ticket],
    ) -> Result<(), TicketPersistenceError> {
        let ticket_id = *edited.id.as_uuid();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        conn.transaction(|conn| {
            async move {
                // Participants cascade with their items.
                diesel::delete(items::table.filter(items::ticket_id.eq(ticket_id)))
                    .execute(conn)
                    .await?;
                insert_items(conn, ticket_id, &edited.items).await?;
                diesel::delete(accountings::table.filter(accountings::ticket_id.eq(ticket_id)))
                    .execute(conn)
                    .await?;
                insert_accountings(conn, &edited.accountings).await?;
                for refund in refunds {
                    insert_ticket_graph(conn, refund).await?;
                }
                Ok::<_, diesel::result::Error>(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn delete(&self, id: &TicketId) -> Result<bool, TicketPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(tickets::table.find(*id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }
}
