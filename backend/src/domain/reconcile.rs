//! Ticket reconciler.
//!
//! Merges a ticket's existing accountings with the set rebuilt from its edited
//! items. Amounts already paid carry over per participant; where a participant
//! now owes less than they paid, the difference is split off into a separate
//! refund ticket whose ledger edge points back at the editor.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use super::ledger::build_accountings;
use super::split::SplitOutcome;
use super::ticket::{Accounting, AccountingId, Item, Participant, REFUND_ITEM_NAME, Ticket, TicketId};
use super::user::{User, UserId};

/// Result of reconciling an edit.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconciledEdit {
    /// The edited ticket with its new items and surviving accountings.
    pub ticket: Ticket,
    /// Refund tickets to persist alongside the edit.
    pub refunds: Vec<Ticket>,
}

/// Reconcile `existing` against the freshly split `outcome`.
///
/// The ticket's buyer is the payer of the rebuilt accountings, so `editor`
/// is expected to be that buyer. Comparisons between paid and total amounts
/// are exact.
pub fn reconcile(
    existing: Ticket,
    outcome: SplitOutcome,
    editor: &User,
    now: DateTime<Utc>,
) -> ReconciledEdit {
    let Ticket {
        id,
        buyer,
        created_at,
        accountings: old,
        ..
    } = existing;

    let old: BTreeMap<UserId, Accounting> =
        old.into_iter().map(|a| (a.user_to, a)).collect();
    let mut merged: BTreeMap<UserId, Accounting> = build_accountings(id, &outcome.amounts, buyer)
        .into_iter()
        .map(|a| (a.user_to, a))
        .collect();

    for (creditor, previous) in old {
        match merged.get_mut(&creditor) {
            Some(current) => current.paid_price = previous.paid_price,
            None if previous.paid_price > 0.0 => {
                merged.insert(
                    creditor,
                    Accounting {
                        total_price: 0.0,
                        ..previous
                    },
                );
            }
            None => {}
        }
    }

    let (overpaid, surviving): (Vec<Accounting>, Vec<Accounting>) = merged
        .into_values()
        .partition(|accounting| accounting.total_price < accounting.paid_price);

    let refunds = overpaid
        .iter()
        .map(|accounting| refund_ticket(accounting, editor, now))
        .collect();

    ReconciledEdit {
        ticket: Ticket {
            id,
            buyer,
            created_at,
            items: outcome.items,
            accountings: surviving,
        },
        refunds,
    }
}

fn refund_ticket(overpaid: &Accounting, editor: &User, now: DateTime<Utc>) -> Ticket {
    let refund = overpaid.paid_price - overpaid.total_price;
    let ticket_id = TicketId::random();
    Ticket {
        id: ticket_id,
        buyer: overpaid.user_to,
        created_at: now,
        items: vec![Item {
            name: REFUND_ITEM_NAME.to_owned(),
            quantity: 1,
            price: refund,
            participants: vec![Participant::from(editor)],
        }],
        accountings: vec![Accounting {
            id: AccountingId::random(),
            ticket_id,
            user_from: overpaid.user_to,
            user_to: editor.id(),
            total_price: refund,
            paid_price: 0.0,
        }],
    }
}

#[cfg(test)]
#[path = "reconcile_tests.rs"]
mod tests;
