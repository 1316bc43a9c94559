//! Ticket domain service.
//!
//! Implements the ticket driving ports: splitting raw items into a new
//! ticket, reconciling edits (including refund tickets), deletion and reads.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{info, warn};

use crate::domain::ports::{
    CreateTicketRequest, DeleteTicketRequest, EditTicketRequest, TicketCommand,
    TicketPayload, TicketPersistenceError, TicketQuery, TicketRepository, UserRepository,
};
use crate::domain::{
    Error, Participant, RawItem, Ticket, TicketId, User, UserId, Username, build_accountings,
    reconcile, split_items,
};

use super::user_service::{map_user_repository_error, resolve_actor};

fn map_ticket_repository_error(error: TicketPersistenceError) -> Error {
    match error {
        TicketPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("ticket repository unavailable: {message}"))
        }
        TicketPersistenceError::Query { message } => {
            Error::internal(format!("ticket repository error: {message}"))
        }
    }
}

/// Ticket service implementing [`TicketCommand`] and [`TicketQuery`].
#[derive(Clone)]
pub struct TicketService<U, T> {
    user_repo: Arc<U>,
    ticket_repo: Arc<T>,
    clock: Arc<dyn Clock>,
}

impl<U, T> TicketService<U, T> {
    /// Create a new service over the user and ticket repositories.
    pub fn new(user_repo: Arc<U>, ticket_repo: Arc<T>, clock: Arc<dyn Clock>) -> Self {
        Self {
            user_repo,
            ticket_repo,
            clock,
        }
    }
}

impl<U, T> TicketService<U, T>
where
    U: UserRepository,
    T: TicketRepository,
{
    /// Resolve every participant username mentioned by `items`.
    ///
    /// Strings that are not valid usernames cannot match anybody and are left
    /// for the splitter to report as unknown.
    async fn participant_directory(
        &self,
        items: &[RawItem],
    ) -> Result<HashMap<String, Participant>, Error> {
        let usernames: Vec<Username> = items
            .iter()
            .flat_map(|item| item.participants.iter())
            .filter_map(|raw| Username::new(raw).ok())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if usernames.is_empty() {
            return Ok(HashMap::new());
        }

        let users = self
            .user_repo
            .find_by_usernames(&usernames)
            .await
            .map_err(map_user_repository_error)?;
        Ok(users
            .iter()
            .map(|user| (user.username().to_string(), Participant::from(user)))
            .collect())
    }

    async fn load_ticket(&self, ticket_id: &TicketId) -> Result<Ticket, Error> {
        self.ticket_repo
            .find_by_id(ticket_id)
            .await
            .map_err(map_ticket_repository_error)?
            .ok_or_else(|| Error::not_found(format!("ticket {ticket_id} not found")))
    }

    async fn load_bought_ticket(&self, actor: &User, ticket_id: &TicketId) -> Result<Ticket, Error> {
        let ticket = self.load_ticket(ticket_id).await?;
        if ticket.buyer != actor.id() {
            warn!(ticket_id = %ticket_id, user_id = %actor.id(), "ticket change rejected: not the buyer");
            return Err(Error::unauthorized("only the buyer may change this ticket"));
        }
        Ok(ticket)
    }
}

#[async_trait]
impl<U, T> TicketCommand for TicketService<U, T>
where
    U: UserRepository,
    T: TicketRepository,
{
    async fn create_ticket(&self, request: CreateTicketRequest) -> Result<TicketPayload, Error> {
        let actor = resolve_actor(self.user_repo.as_ref(), &request.actor).await?;
        let directory = self.participant_directory(&request.items).await?;
        let outcome = split_items(&request.items, &directory)?;

        let id = TicketId::random();
        let ticket = Ticket {
            id,
            buyer: actor.id(),
            created_at: self.clock.utc(),
            accountings: build_accountings(id, &outcome.amounts, actor.id()),
            items: outcome.items,
        };

        self.ticket_repo
            .create(&ticket)
            .await
            .map_err(map_ticket_repository_error)?;

        info!(
            ticket_id = %ticket.id,
            buyer = %ticket.buyer,
            items = ticket.items.len(),
            accountings = ticket.accountings.len(),
            "ticket created"
        );
        Ok(ticket.into())
    }

    async fn edit_ticket(&self, request: EditTicketRequest) -> Result<TicketPayload, Error> {
        let actor = resolve_actor(self.user_repo.as_ref(), &request.actor).await?;
        let existing = self.load_bought_ticket(&actor, &request.ticket_id).await?;
        let directory = self.participant_directory(&request.items).await?;
        let outcome = split_items(&request.items, &directory)?;

        let edit = reconcile(existing, outcome, &actor, self.clock.utc());

        self.ticket_repo
            .save_edit(&edit.ticket, &edit.refunds)
            .await
            .map_err(map_ticket_repository_error)?;

        info!(
            ticket_id = %edit.ticket.id,
            accountings = edit.ticket.accountings.len(),
            refunds = edit.refunds.len(),
            "ticket edited"
        );
        Ok(edit.ticket.into())
    }

    async fn delete_ticket(&self, request: DeleteTicketRequest) -> Result<(), Error> {
        let actor = resolve_actor(self.user_repo.as_ref(), &request.actor).await?;
        let ticket = self.load_bought_ticket(&actor, &request.ticket_id).await?;

        let deleted = self
            .ticket_repo
            .delete(&ticket.id)
            .await
            .map_err(map_ticket_repository_error)?;
        if !deleted {
            return Err(Error::not_found(format!("ticket {} not found", ticket.id)));
        }

        info!(ticket_id = %ticket.id, "ticket deleted");
        Ok(())
    }
}

#[async_trait]
impl<U, T> TicketQuery for TicketService<U, T>
where
    U: UserRepository,
    T: TicketRepository,
{
    async fn list_my_tickets(&self, actor: &UserId) -> Result<Vec<TicketPayload>, Error> {
        let actor = resolve_actor(self.user_repo.as_ref(), actor).await?;
        let tickets = self
            .ticket_repo
            .list_by_buyer(&actor.id())
            .await
            .map_err(map_ticket_repository_error)?;
        Ok(tickets.into_iter().map(Into::into).collect())
    }

    async fn get_ticket(
        &self,
        actor: &UserId,
        ticket_id: &TicketId,
    ) -> Result<TicketPayload, Error> {
        let actor = resolve_actor(self.user_repo.as_ref(), actor).await?;
        let ticket = self.load_ticket(ticket_id).await?;
        if !ticket.is_visible_to(actor.id()) {
            warn!(ticket_id = %ticket_id, user_id = %actor.id(), "ticket read rejected");
            return Err(Error::unauthorized("ticket is not shared with you"));
        }
        Ok(ticket.into())
    }
}

#[cfg(test)]
#[path = "ticket_service_tests.rs"]
mod tests;
