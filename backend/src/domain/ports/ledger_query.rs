//! Driving port for ledger listings scoped to the acting user.

use async_trait::async_trait;

use crate::domain::{Error, UserId};

use super::LedgerEntryPayload;

/// Read side of the ledger.
///
/// "Debts" are accountings whose `user_to` is the actor and "credits" those
/// whose `user_from` is the actor.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LedgerQuery: Send + Sync {
    /// Accountings with `user_to = actor`.
    async fn debts_of(&self, actor: &UserId) -> Result<Vec<LedgerEntryPayload>, Error>;

    /// Accountings with `user_from = actor`.
    async fn credits_of(&self, actor: &UserId) -> Result<Vec<LedgerEntryPayload>, Error>;

    /// Accountings with `user_from = user_to = actor`.
    async fn self_accountings(&self, actor: &UserId) -> Result<Vec<LedgerEntryPayload>, Error>;

    /// Outstanding accountings from `counterparty` to `actor`, each showing
    /// only the items `counterparty` takes part in.
    async fn debts_from(
        &self,
        actor: &UserId,
        counterparty: &UserId,
    ) -> Result<Vec<LedgerEntryPayload>, Error>;

    /// Outstanding accountings from `actor` to `counterparty`, each showing
    /// only the items `counterparty` takes part in.
    async fn credits_to(
        &self,
        actor: &UserId,
        counterparty: &UserId,
    ) -> Result<Vec<LedgerEntryPayload>, Error>;

    /// Accountings with `user_to = actor` and something paid.
    async fn paid_debts(&self, actor: &UserId) -> Result<Vec<LedgerEntryPayload>, Error>;
}
