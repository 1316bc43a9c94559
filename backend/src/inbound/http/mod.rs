//! HTTP inbound adapter exposing the REST endpoints.

use actix_web::web;

pub mod error;
pub mod health;
pub mod ledger;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod tickets;
pub mod users;
pub mod validation;

pub use error::ApiResult;

/// Register every `/api/v1` handler on `cfg`.
///
/// Literal segments (`/debts/paid`, `/users/me`) are registered before the
/// parameterised routes they would otherwise collide with.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(users::register_user)
        .service(users::list_users)
        .service(users::current_user)
        .service(users::delete_self)
        .service(tickets::create_ticket)
        .service(tickets::list_my_tickets)
        .service(tickets::get_ticket)
        .service(tickets::edit_ticket)
        .service(tickets::delete_ticket)
        .service(ledger::debts_of)
        .service(ledger::paid_debts)
        .service(ledger::debts_from)
        .service(ledger::settle_debt)
        .service(ledger::credits_of)
        .service(ledger::credits_to)
        .service(ledger::mark_credit_paid)
        .service(ledger::self_accountings)
        .service(ledger::settle_all_with);
}
