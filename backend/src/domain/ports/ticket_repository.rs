//! Port abstraction for ticket persistence.
//!
//! Adapters persist a ticket together with its items, participants and
//! accountings. Every write is a single transaction.
use async_trait::async_trait;

use crate::domain::{Ticket, TicketId, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by ticket repository adapters.
    pub enum TicketPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "ticket repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "ticket repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TicketRepository: Send + Sync {
    /// Insert a ticket with its items and accountings.
    async fn create(&self, ticket: &Ticket) -> Result<(), TicketPersistenceError>;

    /// Fetch a ticket with its items and accountings.
    async fn find_by_id(&self, id: &TicketId) -> Result<Option<Ticket>, TicketPersistenceError>;

    /// Tickets bought by `buyer`, newest first.
    async fn list_by_buyer(&self, buyer: &UserId) -> Result<Vec<Ticket>, TicketPersistenceError>;

    /// Replace the items and accountings of `edited` and insert `refunds`,
    /// atomically.
    async fn save_edit(
        &self,
        edited: &Ticket,
        refunds: &[Ticket],
    ) -> Result<(), TicketPersistenceError>;

    /// Delete a ticket and everything it owns. Returns `false` when absent.
    async fn delete(&self, id: &TicketId) -> Result<bool, TicketPersistenceError>;
}
