//! Driving port for full settlement of accountings.

use async_trait::async_trait;

use crate::domain::{AccountingId, Error, UserId};

use super::AccountingPayload;

/// Write side of the ledger. Settlement always sets `paidPrice = totalPrice`;
/// an id or ownership mismatch is reported as `not_found`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SettlementCommand: Send + Sync {
    /// Settle an accounting whose `user_to` is `actor`.
    async fn settle_debt(
        &self,
        actor: &UserId,
        accounting_id: &AccountingId,
    ) -> Result<Vec<AccountingPayload>, Error>;

    /// Settle every accounting between `actor` and `counterparty`, both ways.
    async fn settle_all_with(
        &self,
        actor: &UserId,
        counterparty: &UserId,
    ) -> Result<Vec<AccountingPayload>, Error>;

    /// Confirm receipt on an accounting whose `user_from` is `actor`.
    async fn mark_credit_paid(
        &self,
        actor: &UserId,
        accounting_id: &AccountingId,
    ) -> Result<Vec<AccountingPayload>, Error>;
}
