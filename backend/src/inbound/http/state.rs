//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` and only see driving ports, so
//! the same handlers run over PostgreSQL or the in-memory store.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{
    AccountingRepository, LedgerQuery, SettlementCommand, TicketCommand, TicketQuery,
    TicketRepository, UserDirectory, UserRepository,
};
use crate::domain::{LedgerService, TicketService, UserService};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub tickets: Arc<dyn TicketCommand>,
    pub tickets_query: Arc<dyn TicketQuery>,
    pub ledger: Arc<dyn LedgerQuery>,
    pub settlements: Arc<dyn SettlementCommand>,
    pub users: Arc<dyn UserDirectory>,
}

impl HttpState {
    /// Wire the domain services over one set of repositories.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use mockable::DefaultClock;
    /// use tabsplit_backend::inbound::http::state::HttpState;
    /// use tabsplit_backend::outbound::memory::MemoryStore;
    ///
    /// let store = Arc::new(MemoryStore::new());
    /// let state = HttpState::from_repositories(
    ///     store.clone(),
    ///     store.clone(),
    ///     store,
    ///     Arc::new(DefaultClock),
    /// );
    /// let _ledger = state.ledger.clone();
    /// ```
    pub fn from_repositories<U, T, A>(
        user_repo: Arc<U>,
        ticket_repo: Arc<T>,
        accounting_repo: Arc<A>,
        clock: Arc<dyn Clock>,
    ) -> Self
    where
        U: UserRepository + 'static,
        T: TicketRepository + 'static,
        A: AccountingRepository + 'static,
    {
        let tickets = Arc::new(TicketService::new(
            user_repo.clone(),
            ticket_repo,
            clock.clone(),
        ));
        let ledger = Arc::new(LedgerService::new(user_repo.clone(), accounting_repo));
        Self {
            tickets: tickets.clone(),
            tickets_query: tickets,
            ledger: ledger.clone(),
            settlements: ledger,
            users: Arc::new(UserService::new(user_repo, clock)),
        }
    }
}
