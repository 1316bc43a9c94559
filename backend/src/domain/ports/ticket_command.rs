//! Driving port for ticket mutations: create, edit and delete.

use async_trait::async_trait;

use crate::domain::{Error, RawItem, TicketId, UserId};

use super::TicketPayload;

/// Request to create a ticket bought by `actor`.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTicketRequest {
    pub actor: UserId,
    pub items: Vec<RawItem>,
}

/// Request to replace the items of an existing ticket.
#[derive(Debug, Clone, PartialEq)]
pub struct EditTicketRequest {
    pub actor: UserId,
    pub ticket_id: TicketId,
    pub items: Vec<RawItem>,
}

/// Request to delete a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteTicketRequest {
    pub actor: UserId,
    pub ticket_id: TicketId,
}

/// Driving port for ticket write operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TicketCommand: Send + Sync {
    /// Split the items and record a new ticket with the actor as buyer.
    ///
    /// Fails with `invalid_request` for malformed items and `unauthorized`
    /// when the actor is unknown.
    async fn create_ticket(&self, request: CreateTicketRequest) -> Result<TicketPayload, Error>;

    /// Re-split the ticket and reconcile its ledger. Refund tickets produced
    /// by the edit are persisted in the same transaction but not returned.
    ///
    /// Fails with `not_found` for a missing ticket and `unauthorized` unless
    /// the actor is its buyer.
    async fn edit_ticket(&self, request: EditTicketRequest) -> Result<TicketPayload, Error>;

    /// Delete a ticket. Only its buyer may do so.
    async fn delete_ticket(&self, request: DeleteTicketRequest) -> Result<(), Error>;
}
