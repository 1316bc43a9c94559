//! Port wiring for the HTTP state.

use std::sync::Arc;

use mockable::DefaultClock;
use tabsplit_backend::inbound::http::state::HttpState;
use tabsplit_backend::outbound::memory::MemoryStore;
use tabsplit_backend::outbound::persistence::{
    DbPool, DieselAccountingRepository, DieselTicketRepository, DieselUserRepository,
};
use tracing::{info, warn};

/// Diesel adapters when a pool is configured, the in-memory store otherwise.
pub(super) fn build_http_state(db_pool: Option<&DbPool>) -> HttpState {
    let clock = Arc::new(DefaultClock);
    match db_pool {
        Some(pool) => {
            info!("serving from PostgreSQL");
            HttpState::from_repositories(
                Arc::new(DieselUserRepository::new(pool.clone())),
                Arc::new(DieselTicketRepository::new(pool.clone())),
                Arc::new(DieselAccountingRepository::new(pool.clone())),
                clock,
            )
        }
        None => {
            warn!("no database configured; data lives in memory and is lost on restart");
            let store = Arc::new(MemoryStore::new());
            HttpState::from_repositories(store.clone(), store.clone(), store, clock)
        }
    }
}
