//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (repositories) are implemented by outbound adapters; driving
//! ports (commands and queries) are implemented by domain services and
//! consumed by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod accounting_repository;
mod ledger_query;
mod payloads;
mod settlement_command;
mod ticket_command;
mod ticket_query;
mod ticket_repository;
mod user_directory;
mod user_repository;

#[cfg(test)]
pub use accounting_repository::MockAccountingRepository;
pub use accounting_repository::{
    AccountingFilter, AccountingPersistenceError, AccountingRepository, SettlementScope,
};
#[cfg(test)]
pub use ledger_query::MockLedgerQuery;
pub use ledger_query::LedgerQuery;
pub use payloads::{
    AccountingPayload, ItemPayload, LedgerEntryPayload, ParticipantPayload, TicketPayload,
    UserPayload,
};
#[cfg(test)]
pub use settlement_command::MockSettlementCommand;
pub use settlement_command::SettlementCommand;
#[cfg(test)]
pub use ticket_command::MockTicketCommand;
pub use ticket_command::{
    CreateTicketRequest, DeleteTicketRequest, EditTicketRequest, TicketCommand,
};
#[cfg(test)]
pub use ticket_query::MockTicketQuery;
pub use ticket_query::TicketQuery;
#[cfg(test)]
pub use ticket_repository::MockTicketRepository;
pub use ticket_repository::{TicketPersistenceError, TicketRepository};
#[cfg(test)]
pub use user_directory::MockUserDirectory;
pub use user_directory::UserDirectory;
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
