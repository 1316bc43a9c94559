//! Ticket, item and accounting entities.
//!
//! A [`Ticket`] owns its [`Item`]s and [`Accounting`]s. Users are referenced by
//! id only; participant usernames are carried alongside for presentation.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::{User, UserId, Username};

macro_rules! uuid_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a new random identifier.
            pub fn random() -> Self {
                Self(Uuid::new_v4())
            }

            /// Access the underlying UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl From<Uuid> for $name {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

uuid_newtype! {
    /// Stable ticket identifier.
    TicketId
}

uuid_newtype! {
    /// Stable accounting identifier.
    AccountingId
}

/// Name given to the synthetic item of a refund ticket.
pub const REFUND_ITEM_NAME: &str = "Refund ticket update";

/// A user taking part in an item, resolved from its username.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub id: UserId,
    pub username: Username,
}

impl From<&User> for Participant {
    fn from(value: &User) -> Self {
        Self {
            id: value.id(),
            username: value.username().clone(),
        }
    }
}

/// One line of a ticket.
///
/// ## Invariants
/// - `name` is non-empty.
/// - `quantity` is at least one.
/// - `price` is finite and non-negative; it is a per-unit price.
/// - `participants` is non-empty with no repeated user.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub name: String,
    pub quantity: u32,
    pub price: f64,
    pub participants: Vec<Participant>,
}

impl Item {
    /// Total cost of the line: `price × quantity`.
    pub fn cost(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }

    /// Whether `user` is one of the participants.
    pub fn involves(&self, user: UserId) -> bool {
        self.participants.iter().any(|p| p.id == user)
    }

    /// Value comparison: name, price, quantity and participant set all match.
    ///
    /// Participant order is irrelevant.
    ///
    /// # Examples
    /// ```
    /// use tabsplit_backend::domain::{Item, Participant, UserId, Username};
    ///
    /// let alice = Participant { id: UserId::random(), username: Username::new("alice").unwrap() };
    /// let bob = Participant { id: UserId::random(), username: Username::new("bob").unwrap() };
    /// let a = Item { name: "pizza".into(), quantity: 1, price: 10.0, participants: vec![alice.clone(), bob.clone()] };
    /// let b = Item { participants: vec![bob, alice], ..a.clone() };
    /// assert!(a.has_same_contents(&b));
    /// ```
    pub fn has_same_contents(&self, other: &Item) -> bool {
        let ours: BTreeSet<UserId> = self.participants.iter().map(|p| p.id).collect();
        let theirs: BTreeSet<UserId> = other.participants.iter().map(|p| p.id).collect();
        self.name == other.name
            && self.quantity == other.quantity
            && self.price == other.price
            && ours == theirs
    }
}

/// A directed ledger edge for one ticket.
///
/// `user_from` is the ticket's payer and `user_to` the participant the share
/// is recorded against. Settlement always sets `paid_price = total_price`.
#[derive(Debug, Clone, PartialEq)]
pub struct Accounting {
    pub id: AccountingId,
    pub ticket_id: TicketId,
    pub user_from: UserId,
    pub user_to: UserId,
    pub total_price: f64,
    pub paid_price: f64,
}

impl Accounting {
    /// Whether some of the amount remains unsettled.
    pub fn is_outstanding(&self) -> bool {
        self.paid_price < self.total_price
    }

    /// Whether `user` is either endpoint of the edge.
    pub fn touches(&self, user: UserId) -> bool {
        self.user_from == user || self.user_to == user
    }
}

/// One purchase event.
#[derive(Debug, Clone, PartialEq)]
pub struct Ticket {
    pub id: TicketId,
    pub buyer: UserId,
    pub created_at: DateTime<Utc>,
    pub items: Vec<Item>,
    pub accountings: Vec<Accounting>,
}

impl Ticket {
    /// Whether `user` may read the ticket: its buyer or an endpoint of one of
    /// its accountings.
    pub fn is_visible_to(&self, user: UserId) -> bool {
        self.buyer == user || self.accountings.iter().any(|a| a.touches(user))
    }

    /// Sum of every item's cost.
    pub fn total_cost(&self) -> f64 {
        self.items.iter().map(Item::cost).sum()
    }
}

/// An accounting together with the ticket context it was recorded on.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerEntry {
    pub accounting: Accounting,
    pub ticket_created_at: DateTime<Utc>,
    pub items: Vec<Item>,
}

impl LedgerEntry {
    /// Keep only the items `user` participates in.
    pub fn retain_items_involving(mut self, user: UserId) -> Self {
        self.items.retain(|item| item.involves(user));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    fn participant(name: &str) -> Participant {
        Participant {
            id: UserId::random(),
            username: Username::new(name).expect("valid username"),
        }
    }

    #[fixture]
    fn pizza() -> Item {
        Item {
            name: "pizza".to_owned(),
            quantity: 2,
            price: 7.5,
            participants: vec![participant("alice"), participant("bob")],
        }
    }

    #[rstest]
    fn cost_multiplies_price_by_quantity(pizza: Item) {
        assert_eq!(pizza.cost(), 15.0);
    }

    #[rstest]
    fn same_contents_ignores_participant_order(pizza: Item) {
        let mut reversed = pizza.clone();
        reversed.participants.reverse();
        assert!(pizza.has_same_contents(&reversed));
    }

    #[rstest]
    #[case::name(|item: &mut Item| item.name = "pasta".to_owned())]
    #[case::price(|item: &mut Item| item.price = 8.0)]
    #[case::quantity(|item: &mut Item| item.quantity = 3)]
    #[case::participants(|item: &mut Item| { item.participants.pop(); })]
    fn differing_fields_break_equality(pizza: Item, #[case] change: fn(&mut Item)) {
        let mut other = pizza.clone();
        change(&mut other);
        assert!(!pizza.has_same_contents(&other));
    }

    #[rstest]
    fn visibility_covers_buyer_and_endpoints() {
        let buyer = UserId::random();
        let debtor = UserId::random();
        let stranger = UserId::random();
        let ticket_id = TicketId::random();
        let ticket = Ticket {
            id: ticket_id,
            buyer,
            created_at: Utc::now(),
            items: Vec::new(),
            accountings: vec![Accounting {
                id: AccountingId::random(),
                ticket_id,
                user_from: buyer,
                user_to: debtor,
                total_price: 5.0,
                paid_price: 0.0,
            }],
        };

        assert!(ticket.is_visible_to(buyer));
        assert!(ticket.is_visible_to(debtor));
        assert!(!ticket.is_visible_to(stranger));
    }
}
