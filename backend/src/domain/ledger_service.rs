//! Ledger query and settlement service.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::domain::ports::{
    AccountingFilter, AccountingPayload, AccountingPersistenceError, AccountingRepository,
    LedgerEntryPayload, LedgerQuery, SettlementCommand, SettlementScope, UserRepository,
};
use crate::domain::{AccountingId, Error, UserId};

use super::user_service::resolve_actor;

fn map_accounting_repository_error(error: AccountingPersistenceError) -> Error {
    match error {
        AccountingPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("accounting repository unavailable: {message}"))
        }
        AccountingPersistenceError::Query { message } => {
            Error::internal(format!("accounting repository error: {message}"))
        }
    }
}

/// Ledger service implementing [`LedgerQuery`] and [`SettlementCommand`].
#[derive(Clone)]
pub struct LedgerService<U, A> {
    user_repo: Arc<U>,
    accounting_repo: Arc<A>,
}

impl<U, A> LedgerService<U, A> {
    /// Create a new service over the user and accounting repositories.
    pub fn new(user_repo: Arc<U>, accounting_repo: Arc<A>) -> Self {
        Self {
            user_repo,
            accounting_repo,
        }
    }
}

impl<U, A> LedgerService<U, A>
where
    U: UserRepository,
    A: AccountingRepository,
{
    async fn entries(
        &self,
        actor: &UserId,
        filter: impl FnOnce(UserId) -> AccountingFilter + Send,
        items_for: Option<UserId>,
    ) -> Result<Vec<LedgerEntryPayload>, Error> {
        let actor = resolve_actor(self.user_repo.as_ref(), actor).await?;
        let entries = self
            .accounting_repo
            .list_entries(&filter(actor.id()))
            .await
            .map_err(map_accounting_repository_error)?;
        Ok(entries
            .into_iter()
            .map(|entry| match items_for {
                Some(counterparty) => entry.retain_items_involving(counterparty),
                None => entry,
            })
            .map(Into::into)
            .collect())
    }

    async fn settle(
        &self,
        actor: &UserId,
        scope: impl FnOnce(UserId) -> SettlementScope + Send,
    ) -> Result<Vec<AccountingPayload>, Error> {
        let actor = resolve_actor(self.user_repo.as_ref(), actor).await?;
        let scope = scope(actor.id());
        let settled = self
            .accounting_repo
            .settle(&scope)
            .await
            .map_err(map_accounting_repository_error)?;
        if settled.is_empty() {
            return Err(Error::not_found("no matching accounting"));
        }

        info!(user_id = %actor.id(), ?scope, settled = settled.len(), "accountings settled");
        Ok(settled.iter().map(Into::into).collect())
    }
}

#[async_trait]
impl<U, A> LedgerQuery for LedgerService<U, A>
where
    U: UserRepository,
    A: AccountingRepository,
{
    async fn debts_of(&self, actor: &UserId) -> Result<Vec<LedgerEntryPayload>, Error> {
        self.entries(actor, AccountingFilter::ToUser, None).await
    }

    async fn credits_of(&self, actor: &UserId) -> Result<Vec<LedgerEntryPayload>, Error> {
        self.entries(actor, AccountingFilter::FromUser, None).await
    }

    async fn self_accountings(&self, actor: &UserId) -> Result<Vec<LedgerEntryPayload>, Error> {
        self.entries(actor, AccountingFilter::SelfEdges, None).await
    }

    async fn debts_from(
        &self,
        actor: &UserId,
        counterparty: &UserId,
    ) -> Result<Vec<LedgerEntryPayload>, Error> {
        let counterparty = *counterparty;
        self.entries(
            actor,
            |me| AccountingFilter::Outstanding {
                user_from: counterparty,
                user_to: me,
            },
            Some(counterparty),
        )
        .await
    }

    async fn credits_to(
        &self,
        actor: &UserId,
        counterparty: &UserId,
    ) -> Result<Vec<LedgerEntryPayload>, Error> {
        let counterparty = *counterparty;
        self.entries(
            actor,
            |me| AccountingFilter::Outstanding {
                user_from: me,
                user_to: counterparty,
            },
            Some(counterparty),
        )
        .await
    }

    async fn paid_debts(&self, actor: &UserId) -> Result<Vec<LedgerEntryPayload>, Error> {
        self.entries(actor, AccountingFilter::PaidToUser, None).await
    }
}

#[async_trait]
impl<U, A> SettlementCommand for LedgerService<U, A>
where
    U: UserRepository,
    A: AccountingRepository,
{
    async fn settle_debt(
        &self,
        actor: &UserId,
        accounting_id: &AccountingId,
    ) -> Result<Vec<AccountingPayload>, Error> {
        let accounting = *accounting_id;
        self.settle(actor, |me| SettlementScope::Debt {
            accounting,
            user_to: me,
        })
        .await
    }

    async fn settle_all_with(
        &self,
        actor: &UserId,
        counterparty: &UserId,
    ) -> Result<Vec<AccountingPayload>, Error> {
        let counterparty = *counterparty;
        self.settle(actor, |me| SettlementScope::Between {
            user: me,
            counterparty,
        })
        .await
    }

    async fn mark_credit_paid(
        &self,
        actor: &UserId,
        accounting_id: &AccountingId,
    ) -> Result<Vec<AccountingPayload>, Error> {
        let accounting = *accounting_id;
        self.settle(actor, |me| SettlementScope::Credit {
            accounting,
            user_from: me,
        })
        .await
    }
}

#[cfg(test)]
#[path = "ledger_service_tests.rs"]
mod tests;
