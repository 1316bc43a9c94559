//! Port abstraction for ledger reads and settlement writes.
use async_trait::async_trait;

use crate::domain::{Accounting, AccountingId, LedgerEntry, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by accounting repository adapters.
    pub enum AccountingPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "accounting repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "accounting repository query failed: {message}",
    }
}

/// Row selection for ledger listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountingFilter {
    /// `user_to = user`.
    ToUser(UserId),
    /// `user_from = user`.
    FromUser(UserId),
    /// `user_from = user_to = user`.
    SelfEdges(UserId),
    /// `user_to = user` with `paid_price > 0`.
    PaidToUser(UserId),
    /// The given direction with `paid_price < total_price`.
    Outstanding { user_from: UserId, user_to: UserId },
}

impl AccountingFilter {
    /// Whether `accounting` is selected by the filter.
    pub fn matches(&self, accounting: &Accounting) -> bool {
        match *self {
            Self::ToUser(user) => accounting.user_to == user,
            Self::FromUser(user) => accounting.user_from == user,
            Self::SelfEdges(user) => accounting.user_from == user && accounting.user_to == user,
            Self::PaidToUser(user) => accounting.user_to == user && accounting.paid_price > 0.0,
            Self::Outstanding { user_from, user_to } => {
                accounting.user_from == user_from
                    && accounting.user_to == user_to
                    && accounting.is_outstanding()
            }
        }
    }
}

/// Row selection for settlement writes. Every matched row gets
/// `paid_price = total_price`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettlementScope {
    /// One accounting, provided its `user_to` is `user_to`.
    Debt {
        accounting: AccountingId,
        user_to: UserId,
    },
    /// One accounting, provided its `user_from` is `user_from`.
    Credit {
        accounting: AccountingId,
        user_from: UserId,
    },
    /// Every accounting between the two users, in both directions.
    Between { user: UserId, counterparty: UserId },
}

impl SettlementScope {
    /// Whether `accounting` is selected by the scope.
    pub fn matches(&self, accounting: &Accounting) -> bool {
        match *self {
            Self::Debt {
                accounting: id,
                user_to,
            } => accounting.id == id && accounting.user_to == user_to,
            Self::Credit {
                accounting: id,
                user_from,
            } => accounting.id == id && accounting.user_from == user_from,
            Self::Between { user, counterparty } => {
                (accounting.user_from == user && accounting.user_to == counterparty)
                    || (accounting.user_from == counterparty && accounting.user_to == user)
            }
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountingRepository: Send + Sync {
    /// Accountings selected by `filter` with their ticket context, newest
    /// ticket first.
    async fn list_entries(
        &self,
        filter: &AccountingFilter,
    ) -> Result<Vec<LedgerEntry>, AccountingPersistenceError>;

    /// Settle every accounting selected by `scope` in one transaction and
    /// return the updated rows.
    async fn settle(
        &self,
        scope: &SettlementScope,
    ) -> Result<Vec<Accounting>, AccountingPersistenceError>;
}
