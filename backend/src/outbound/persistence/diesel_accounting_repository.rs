//! PostgreSQL-backed `AccountingRepository` implementation using Diesel ORM.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::{Accounting, LedgerEntry};
use crate::domain::ports::{
    AccountingFilter, AccountingPersistenceError, AccountingRepository, SettlementScope,
};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::diesel_helpers::{accounting_from_row, assemble_items, load_item_rows};
use super::models::AccountingRow;
use super::pool::{DbPool, PoolError};
use super::schema::{accountings, tickets};

/// Diesel-backed implementation of the accounting repository port.
#[derive(Clone)]
pub struct DieselAccountingRepository {
    pool: DbPool,
}

impl DieselAccountingRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> AccountingPersistenceError {
    map_basic_pool_error(error, AccountingPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> AccountingPersistenceError {
    map_basic_diesel_error(
        error,
        AccountingPersistenceError::query,
        AccountingPersistenceError::connection,
    )
}

#[async_trait]
impl AccountingRepository for DieselAccountingRepository {
    async fn list_entries(
        &self,
        filter: &AccountingFilter,
    ) -> Result<Vec<LedgerEntry>, AccountingPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query = accountings::table
            .inner_join(tickets::table)
            .select((AccountingRow::as_select(), tickets::created_at))
            .into_boxed();
        query = match *filter {
            AccountingFilter::ToUser(user) => {
                query.filter(accountings::user_to.eq(*user.as_uuid()))
            }
            AccountingFilter::FromUser(user) => {
                query.filter(accountings::user_from.eq(*user.as_uuid()))
            }
            AccountingFilter::SelfEdges(user) => query
                .filter(accountings::user_from.eq(*user.as_uuid()))
                .filter(accountings::user_to.eq(*user.as_uuid())),
            AccountingFilter::PaidToUser(user) => query
                .filter(accountings::user_to.eq(*user.as_uuid()))
                .filter(accountings::paid_price.gt(0.0)),
            AccountingFilter::Outstanding { user_from, user_to } => query
                .filter(accountings::user_from.eq(*user_from.as_uuid()))
                .filter(accountings::user_to.eq(*user_to.as_uuid()))
                .filter(accountings::paid_price.lt(accountings::total_price)),
        };

        let rows: Vec<(AccountingRow, DateTime<Utc>)> = query
            .order((tickets::created_at.desc(), accountings::id.asc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let ticket_ids: Vec<Uuid> = rows.iter().map(|(row, _)| row.ticket_id).collect();
        let item_rows = load_item_rows(&mut conn, &ticket_ids)
            .await
            .map_err(map_diesel_error)?;
        let items: HashMap<Uuid, Vec<_>> =
            assemble_items(item_rows).map_err(AccountingPersistenceError::query)?;

        Ok(rows
            .into_iter()
            .map(|(row, ticket_created_at)| LedgerEntry {
                items: items.get(&row.ticket_id).cloned().unwrap_or_default(),
                ticket_created_at,
                accounting: accounting_from_row(row),
            })
            .collect())
    }

    async fn settle(
        &self,
        scope: &SettlementScope,
    ) -> Result<Vec<Accounting>, AccountingPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let settle_all = accountings::paid_price.eq(accountings::total_price);

        // Each scope is a single UPDATE, atomic on its own.
        let rows: Vec<AccountingRow> = match *scope {
            SettlementScope::Debt {
                accounting,
                user_to,
            } => {
                diesel::update(
                    accountings::table
                        .filter(accountings::id.eq(*accounting.as_uuid()))
                        .filter(accountings::user_to.eq(*user_to.as_uuid())),
                )
                .set(settle_all)
                .returning(AccountingRow::as_returning())
                .get_results(&mut conn)
                .await
            }
            SettlementScope::Credit {
                accounting,
                user_from,
            } => {
                diesel::update(
                    accountings::table
                        .filter(accountings::id.eq(*accounting.as_uuid()))
                        .filter(accountings::user_from.eq(*user_from.as_uuid())),
                )
                .set(settle_all)
                .returning(AccountingRow::as_returning())
                .get_results(&mut conn)
                .await
            }
            SettlementScope::Between { user, counterparty } => {
                let (user, counterparty) = (*user.as_uuid(), *counterparty.as_uuid());
                diesel::update(
                    accountings::table.filter(
                        accountings::user_from
                            .eq(user)
                            .and(accountings::user_to.eq(counterparty))
                            .or(accountings::user_from
                                .eq(counterparty)
                                .and(accountings::user_to.eq(user))),
                    ),
                )
                .set(settle_all)
                .returning(AccountingRow::as_returning())
                .get_results(&mut conn)
                .await
            }
        }
        .map_err(map_diesel_error)?;

        Ok(rows.into_iter().map(accounting_from_row).collect())
    }
}
