//! Ledger listing and settlement endpoints.
//!
//! ```text
//! GET  /api/v1/debts                            accountings the caller owes
//! GET  /api/v1/debts/paid                       ... of which something was paid
//! GET  /api/v1/debts/{user_id}                  outstanding debts owed to user_id
//! POST /api/v1/debts/{accounting_id}/settle
//! GET  /api/v1/credits                          accountings owed to the caller
//! GET  /api/v1/credits/{user_id}                outstanding credits owed by user_id
//! POST /api/v1/credits/{accounting_id}/paid
//! GET  /api/v1/accountings/self                 the caller's own shares
//! POST /api/v1/counterparties/{user_id}/settle  settle both directions
//! ```

use actix_web::{get, post, web};

use crate::domain::ports::{AccountingPayload, LedgerEntryPayload};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{parse_accounting_id, parse_user_id};

type Entries = ApiResult<web::Json<Vec<LedgerEntryPayload>>>;
type Settled = ApiResult<web::Json<Vec<AccountingPayload>>>;

/// Accountings whose debtor is the caller.
#[utoipa::path(
    get,
    path = "/api/v1/debts",
    responses(
        (status = 200, description = "Debts", body = [LedgerEntryPayload]),
        (status = 401, description = "Unauthorized", body = ErrorSchema)
    ),
    tags = ["ledger"],
    operation_id = "debtsOf",
    security(("SessionCookie" = []))
)]
#[get("/debts")]
pub async fn debts_of(state: web::Data<HttpState>, session: SessionContext) -> Entries {
    let actor = session.require_user_id()?;
    Ok(web::Json(state.ledger.debts_of(&actor).await?))
}

/// Debts of the caller on which something has been paid.
#[utoipa::path(
    get,
    path = "/api/v1/debts/paid",
    responses(
        (status = 200, description = "Paid debts", body = [LedgerEntryPayload]),
        (status = 401, description = "Unauthorized", body = ErrorSchema)
    ),
    tags = ["ledger"],
    operation_id = "paidDebts",
    security(("SessionCookie" = []))
)]
#[get("/debts/paid")]
pub async fn paid_debts(state: web::Data<HttpState>, session: SessionContext) -> Entries {
    let actor = session.require_user_id()?;
    Ok(web::Json(state.ledger.paid_debts(&actor).await?))
}

/// Outstanding debts the caller owes to one creditor.
#[utoipa::path(
    get,
    path = "/api/v1/debts/{user_id}",
    params(("user_id" = String, Path, description = "Creditor id")),
    responses(
        (status = 200, description = "Outstanding debts", body = [LedgerEntryPayload]),
        (status = 400, description = "Malformed id", body = ErrorSchema),
        (status = 401, description = "Unauthorized", body = ErrorSchema)
    ),
    tags = ["ledger"],
    operation_id = "debtsFrom",
    security(("SessionCookie" = []))
)]
#[get("/debts/{user_id}")]
pub async fn debts_from(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> Entries {
    let actor = session.require_user_id()?;
    let counterparty = parse_user_id(&path.into_inner())?;
    Ok(web::Json(
        state.ledger.debts_from(&actor, &counterparty).await?,
    ))
}

/// Mark one of the caller's debts as fully paid.
#[utoipa::path(
    post,
    path = "/api/v1/debts/{accounting_id}/settle",
    params(("accounting_id" = String, Path, description = "Accounting id")),
    responses(
        (status = 200, description = "Settled accountings", body = [AccountingPayload]),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 404, description = "No such debt of the caller", body = ErrorSchema)
    ),
    tags = ["ledger"],
    operation_id = "settleDebt",
    security(("SessionCookie" = []))
)]
#[post("/debts/{accounting_id}/settle")]
pub async fn settle_debt(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> Settled {
    let actor = session.require_user_id()?;
    let accounting_id = parse_accounting_id(&path.into_inner())?;
    Ok(web::Json(
        state.settlements.settle_debt(&actor, &accounting_id).await?,
    ))
}

/// Accountings whose creditor is the caller.
#[utoipa::path(
    get,
    path = "/api/v1/credits",
    responses(
        (status = 200, description = "Credits", body = [LedgerEntryPayload]),
        (status = 401, description = "Unauthorized", body = ErrorSchema)
    ),
    tags = ["ledger"],
    operation_id = "creditsOf",
    security(("SessionCookie" = []))
)]
#[get("/credits")]
pub async fn credits_of(state: web::Data<HttpState>, session: SessionContext) -> Entries {
    let actor = session.require_user_id()?;
    Ok(web::Json(state.ledger.credits_of(&actor).await?))
}

/// Outstanding credits one debtor owes the caller.
#[utoipa::path(
    get,
    path = "/api/v1/credits/{user_id}",
    params(("user_id" = String, Path, description = "Debtor id")),
    responses(
        (status = 200, description = "Outstanding credits", body = [LedgerEntryPayload]),
        (status = 400, description = "Malformed id", body = ErrorSchema),
        (status = 401, description = "Unauthorized", body = ErrorSchema)
    ),
    tags = ["ledger"],
    operation_id = "creditsTo",
    security(("SessionCookie" = []))
)]
#[get("/credits/{user_id}")]
pub async fn credits_to(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> Entries {
    let actor = session.require_user_id()?;
    let counterparty = parse_user_id(&path.into_inner())?;
    Ok(web::Json(
        state.ledger.credits_to(&actor, &counterparty).await?,
    ))
}

/// Confirm that a debtor paid one of the caller's credits.
#[utoipa::path(
    post,
    path = "/api/v1/credits/{accounting_id}/paid",
    params(("accounting_id" = String, Path, description = "Accounting id")),
    responses(
        (status = 200, description = "Settled accountings", body = [AccountingPayload]),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 404, description = "No such credit of the caller", body = ErrorSchema)
    ),
    tags = ["ledger"],
    operation_id = "markCreditPaid",
    security(("SessionCookie" = []))
)]
#[post("/credits/{accounting_id}/paid")]
pub async fn mark_credit_paid(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> Settled {
    let actor = session.require_user_id()?;
    let accounting_id = parse_accounting_id(&path.into_inner())?;
    Ok(web::Json(
        state
            .settlements
            .mark_credit_paid(&actor, &accounting_id)
            .await?,
    ))
}

/// The caller's own shares on tickets they bought.
#[utoipa::path(
    get,
    path = "/api/v1/accountings/self",
    responses(
        (status = 200, description = "Self accountings", body = [LedgerEntryPayload]),
        (status = 401, description = "Unauthorized", body = ErrorSchema)
    ),
    tags = ["ledger"],
    operation_id = "selfAccountings",
    security(("SessionCookie" = []))
)]
#[get("/accountings/self")]
pub async fn self_accountings(state: web::Data<HttpState>, session: SessionContext) -> Entries {
    let actor = session.require_user_id()?;
    Ok(web::Json(state.ledger.self_accountings(&actor).await?))
}

/// Settle every accounting between the caller and a counterparty.
#[utoipa::path(
    post,
    path = "/api/v1/counterparties/{user_id}/settle",
    params(("user_id" = String, Path, description = "Counterparty id")),
    responses(
        (status = 200, description = "Settled accountings", body = [AccountingPayload]),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 404, description = "Nothing to settle", body = ErrorSchema)
    ),
    tags = ["ledger"],
    operation_id = "settleAllDebtsTo",
    security(("SessionCookie" = []))
)]
#[post("/counterparties/{user_id}/settle")]
pub async fn settle_all_with(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> Settled {
    let actor = session.require_user_id()?;
    let counterparty = parse_user_id(&path.into_inner())?;
    Ok(web::Json(
        state
            .settlements
            .settle_all_with(&actor, &counterparty)
            .await?,
    ))
}

#[cfg(test)]
#[path = "ledger_tests.rs"]
mod tests;
