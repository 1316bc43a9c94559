//! Ledger builder: owed amounts to accountings.

use std::collections::BTreeMap;

use super::ticket::{Accounting, AccountingId, TicketId};
use super::user::UserId;

/// Emit one unpaid accounting per participant other than `payer`.
///
/// Entries come out ordered by participant id. The payer's own share is never
/// recorded as a debt.
///
/// # Examples
/// ```
/// use std::collections::BTreeMap;
/// use tabsplit_backend::domain::{build_accountings, TicketId, UserId};
///
/// let payer = UserId::random();
/// let friend = UserId::random();
/// let amounts = BTreeMap::from([(payer, 5.0), (friend, 5.0)]);
///
/// let accountings = build_accountings(TicketId::random(), &amounts, payer);
/// assert_eq!(accountings.len(), 1);
/// assert_eq!(accountings[0].user_to, friend);
/// assert_eq!(accountings[0].total_price, 5.0);
/// ```
pub fn build_accountings(
    ticket_id: TicketId,
    amounts: &BTreeMap<UserId, f64>,
    payer: UserId,
) -> Vec<Accounting> {
    amounts
        .iter()
        .filter(|(participant, _)| **participant != payer)
        .map(|(participant, total)| Accounting {
            id: AccountingId::random(),
            ticket_id,
            user_from: payer,
            user_to: *participant,
            total_price: *total,
            paid_price: 0.0,
        })
        .collect()
}
