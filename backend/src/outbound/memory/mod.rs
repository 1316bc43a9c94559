//! In-process repositories over a snapshot-and-swap store.
//!
//! [`MemoryStore`] implements every repository port. Each write clones the
//! current state, applies its changes to the copy and swaps it in only when
//! the whole operation succeeded, giving the same all-or-nothing behaviour as
//! the database adapters. It backs the server when no database is configured
//! and the integration test suites.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{
    AccountingFilter, AccountingPersistenceError, AccountingRepository, SettlementScope,
    TicketPersistenceError, TicketRepository, UserPersistenceError, UserRepository,
};
use crate::domain::{Accounting, LedgerEntry, Ticket, TicketId, User, UserId, Username};

#[derive(Debug, Clone, Default)]
struct State {
    users: BTreeMap<UserId, User>,
    tickets: BTreeMap<TicketId, Ticket>,
}

impl State {
    fn accountings(&self) -> impl Iterator<Item = (&Ticket, &Accounting)> {
        self.tickets
            .values()
            .flat_map(|ticket| ticket.accountings.iter().map(move |a| (ticket, a)))
    }
}

/// Failure raised by the store itself.
#[derive(Debug, Clone, PartialEq, Eq)]
enum StoreFailure {
    Poisoned,
    Injected(String),
}

impl StoreFailure {
    fn message(self) -> String {
        match self {
            Self::Poisoned => "memory store lock poisoned".to_owned(),
            Self::Injected(message) => message,
        }
    }
}

/// Shared in-memory store implementing the repository ports.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
    write_failure: Mutex<Option<String>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail with `message` after its changes were
    /// staged, or clear the failure with `None`. Used to exercise rollback.
    pub fn set_write_failure(&self, message: Option<String>) {
        match self.write_failure.lock() {
            Ok(mut guard) => *guard = message,
            Err(poisoned) => *poisoned.into_inner() = message,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, StoreFailure> {
        self.state.lock().map_err(|_| StoreFailure::Poisoned)
    }

    fn read<R>(&self, f: impl FnOnce(&State) -> R) -> Result<R, StoreFailure> {
        let guard = self.lock()?;
        Ok(f(&guard))
    }

    /// Apply `f` to a copy of the state and publish it only on success.
    fn transact<R, E>(
        &self,
        f: impl FnOnce(&mut State) -> Result<R, E>,
        store_error: impl Fn(StoreFailure) -> E,
    ) -> Result<R, E> {
        let mut guard = self.lock().map_err(&store_error)?;
        let mut staged = guard.clone();
        let result = f(&mut staged)?;
        let injected = self
            .write_failure
            .lock()
            .map_err(|_| store_error(StoreFailure::Poisoned))?
            .clone();
        if let Some(message) = injected {
            return Err(store_error(StoreFailure::Injected(message)));
        }
        *guard = staged;
        Ok(result)
    }
}

fn user_error(failure: StoreFailure) -> UserPersistenceError {
    UserPersistenceError::query(failure.message())
}

fn ticket_error(failure: StoreFailure) -> TicketPersistenceError {
    TicketPersistenceError::query(failure.message())
}

fn accounting_error(failure: StoreFailure) -> AccountingPersistenceError {
    AccountingPersistenceError::query(failure.message())
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError> {
        self.transact(
            |state| {
                if state
                    .users
                    .values()
                    .any(|existing| existing.username() == user.username())
                {
                    return Err(UserPersistenceError::duplicate_username(
                        user.username().as_ref(),
                    ));
                }
                state.users.insert(user.id(), user.clone());
                Ok(())
            },
            user_error,
        )
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        self.read(|state| state.users.get(id).cloned())
            .map_err(user_error)
    }

    async fn find_by_usernames(
        &self,
        usernames: &[Username],
    ) -> Result<Vec<User>, UserPersistenceError> {
        self.read(|state| {
            state
                .users
                .values()
                .filter(|user| usernames.contains(user.username()))
                .cloned()
                .collect()
        })
        .map_err(user_error)
    }

    async fn list_all(&self) -> Result<Vec<User>, UserPersistenceError> {
        self.read(|state| {
            let mut users: Vec<User> = state.users.values().cloned().collect();
            users.sort_by(|a, b| a.username().cmp(b.username()));
            users
        })
        .map_err(user_error)
    }

    async fn delete_cascade(&self, id: &UserId) -> Result<bool, UserPersistenceError> {
        let id = *id;
        self.transact(
            |state| {
                if state.users.remove(&id).is_none() {
                    return Ok(false);
                }
                state.tickets.retain(|_, ticket| ticket.buyer != id);
                for ticket in state.tickets.values_mut() {
                    ticket.accountings.retain(|a| !a.touches(id));
                    for item in &mut ticket.items {
                        item.participants.retain(|p| p.id != id);
                    }
                }
                Ok(true)
            },
            user_error,
        )
    }
}

#[async_trait]
impl TicketRepository for MemoryStore {
    async fn create(&self, ticket: &Ticket) -> Result<(), TicketPersistenceError> {
        self.transact(
            |state| {
                if state.tickets.contains_key(&ticket.id) {
                    return Err(TicketPersistenceError::query(format!(
                        "ticket {} already exists",
                        ticket.id
                    )));
                }
                state.tickets.insert(ticket.id, ticket.clone());
                Ok(())
            },
            ticket_error,
        )
    }

    async fn find_by_id(&self, id: &TicketId) -> Result<Option<Ticket>, TicketPersistenceError> {
        self.read(|state| state.tickets.get(id).cloned())
            .map_err(ticket_error)
    }

    async fn list_by_buyer(&self, buyer: &UserId) -> Result<Vec<Ticket>, TicketPersistenceError> {
        self.read(|state| {
            let mut tickets: Vec<Ticket> = state
                .tickets
                .values()
                .filter(|ticket| ticket.buyer == *buyer)
                .cloned()
                .collect();
            tickets.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
            tickets
        })
        .map_err(ticket_error)
    }

    async fn save_edit(
        &self,
        edited: &Ticket,
        refunds: &[Ticket],
    ) -> Result<(), TicketPersistenceError> {
        self.transact(
            |state| {
                let Some(stored) = state.tickets.get_mut(&edited.id) else {
                    return Err(TicketPersistenceError::query(format!(
                        "ticket {} no longer exists",
                        edited.id
                    )));
                };
                stored.items.clone_from(&edited.items);
                stored.accountings.clone_from(&edited.accountings);
                for refund in refunds {
                    state.tickets.insert(refund.id, refund.clone());
                }
                Ok(())
            },
            ticket_error,
        )
    }

    async fn delete(&self, id: &TicketId) -> Result<bool, TicketPersistenceError> {
        self.transact(|state| Ok(state.tickets.remove(id).is_some()), ticket_error)
    }
}

#[async_trait]
impl AccountingRepository for MemoryStore {
    async fn list_entries(
        &self,
        filter: &AccountingFilter,
    ) -> Result<Vec<LedgerEntry>, AccountingPersistenceError> {
        self.read(|state| {
            let mut entries: Vec<LedgerEntry> = state
                .accountings()
                .filter(|(_, accounting)| filter.matches(accounting))
                .map(|(ticket, accounting)| LedgerEntry {
                    accounting: accounting.clone(),
                    ticket_created_at: ticket.created_at,
                    items: ticket.items.clone(),
                })
                .collect();
            entries.sort_by(|a, b| {
                b.ticket_created_at
                    .cmp(&a.ticket_created_at)
                    .then(a.accounting.id.cmp(&b.accounting.id))
            });
            entries
        })
        .map_err(accounting_error)
    }

    async fn settle(
        &self,
        scope: &SettlementScope,
    ) -> Result<Vec<Accounting>, AccountingPersistenceError> {
        self.transact(
            |state| {
                let mut settled = Vec::new();
                for ticket in state.tickets.values_mut() {
                    for accounting in &mut ticket.accountings {
                        if scope.matches(accounting) {
                            accounting.paid_price = accounting.total_price;
                            settled.push(accounting.clone());
                        }
                    }
                }
                Ok(settled)
            },
            accounting_error,
        )
    }
}
