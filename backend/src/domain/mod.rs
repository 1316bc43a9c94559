//! Domain primitives, the split and reconciliation engine, and services.
//!
//! Purpose: Define strongly typed entities used by the API and persistence
//! layers, the pure functions that turn ticket items into ledger entries, and
//! the services that drive them through the ports.
//!
//! Public surface:
//! - Error (alias to `error::Error`) — API error response payload.
//! - ErrorCode (alias to `error::ErrorCode`) — stable error identifier.
//! - User, Ticket, Item, Accounting — entities.
//! - split_items, build_accountings, reconcile — the engine.
//! - TicketService, LedgerService, UserService — driving port implementations.

pub mod error;
mod ledger;
mod ledger_service;
pub mod ports;
mod reconcile;
mod split;
mod ticket;
mod ticket_service;
pub mod trace_id;
pub mod user;
mod user_service;

pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::ledger::build_accountings;
pub use self::ledger_service::LedgerService;
pub use self::reconcile::{ReconciledEdit, reconcile};
pub use self::split::{RawItem, RawScalar, SplitOutcome, TicketInputError, split_items};
pub use self::ticket::{
    Accounting, AccountingId, Item, LedgerEntry, Participant, REFUND_ITEM_NAME, Ticket, TicketId,
};
pub use self::ticket_service::TicketService;
pub use self::trace_id::TraceId;
pub use self::user::{User, UserId, UserValidationError, Username};
pub use self::user_service::UserService;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use tabsplit_backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::unauthorized("login required"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
