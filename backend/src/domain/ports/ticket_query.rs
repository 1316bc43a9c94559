//! Driving port for ticket reads.

use async_trait::async_trait;

use crate::domain::{Error, TicketId, UserId};

use super::TicketPayload;

/// Driving port for ticket read operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TicketQuery: Send + Sync {
    /// Tickets bought by `actor`, newest first.
    async fn list_my_tickets(&self, actor: &UserId) -> Result<Vec<TicketPayload>, Error>;

    /// One ticket, visible to its buyer and to either endpoint of any of its
    /// accountings.
    async fn get_ticket(&self, actor: &UserId, ticket_id: &TicketId)
    -> Result<TicketPayload, Error>;
}
