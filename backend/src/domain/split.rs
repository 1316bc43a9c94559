//! Item splitter.
//!
//! Turns loosely typed item descriptions into validated [`Item`]s and the
//! accumulated share owed by each participant. Participant usernames are
//! resolved against a directory supplied by the caller, so splitting itself is
//! a pure function.

use std::collections::{BTreeMap, HashMap};

use serde_json::json;

use super::Error;
use super::ticket::{Item, Participant};
use super::user::UserId;

/// A scalar as received from a client: either a number or its text form.
#[derive(Debug, Clone, PartialEq)]
pub enum RawScalar {
    Number(f64),
    Text(String),
}

/// Unvalidated item description.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawItem {
    pub name: Option<String>,
    pub quantity: Option<RawScalar>,
    pub price: Option<RawScalar>,
    pub participants: Vec<String>,
}

/// Rejection reasons for ticket input. `index` is the offending item position.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TicketInputError {
    #[error("no items")]
    NoItems,
    #[error("missing name")]
    MissingName { index: usize },
    #[error("missing or invalid price")]
    InvalidPrice { index: usize },
    #[error("no participants")]
    NoParticipants { index: usize },
    #[error("unknown user {username}")]
    UnknownUser { index: usize, username: String },
    #[error("duplicate participant {username}")]
    DuplicateParticipant { index: usize, username: String },
}

impl TicketInputError {
    /// Stable machine-readable reason.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NoItems => "no_items",
            Self::MissingName { .. } => "missing_name",
            Self::InvalidPrice { .. } => "invalid_price",
            Self::NoParticipants { .. } => "no_participants",
            Self::UnknownUser { .. } => "unknown_user",
            Self::DuplicateParticipant { .. } => "duplicate_participant",
        }
    }

    /// Position of the offending item, if the error concerns one.
    pub fn index(&self) -> Option<usize> {
        match self {
            Self::NoItems => None,
            Self::MissingName { index }
            | Self::InvalidPrice { index }
            | Self::NoParticipants { index }
            | Self::UnknownUser { index, .. }
            | Self::DuplicateParticipant { index, .. } => Some(*index),
        }
    }
}

impl From<TicketInputError> for Error {
    fn from(value: TicketInputError) -> Self {
        let details = json!({ "code": value.code(), "index": value.index() });
        Error::invalid_request(value.to_string()).with_details(details)
    }
}

/// Items and per-participant totals produced by [`split_items`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SplitOutcome {
    pub items: Vec<Item>,
    pub amounts: BTreeMap<UserId, f64>,
}

impl SplitOutcome {
    /// Share accumulated by `user`, zero when they take part in nothing.
    pub fn share_of(&self, user: UserId) -> f64 {
        self.amounts.get(&user).copied().unwrap_or(0.0)
    }
}

/// Split raw items into normalised items and the amount owed per participant.
///
/// Each item's `price × quantity` is divided evenly between its participants
/// and accumulated across the whole ticket. No rounding is applied.
///
/// # Errors
/// Returns the first [`TicketInputError`] encountered, in item order.
///
/// # Examples
/// ```
/// use std::collections::HashMap;
/// use tabsplit_backend::domain::{split_items, Participant, RawItem, RawScalar, UserId, Username};
///
/// let alice = Participant { id: UserId::random(), username: Username::new("alice").unwrap() };
/// let bob = Participant { id: UserId::random(), username: Username::new("bob").unwrap() };
/// let directory = HashMap::from([
///     ("alice".to_owned(), alice.clone()),
///     ("bob".to_owned(), bob.clone()),
/// ]);
/// let raw = RawItem {
///     name: Some("pizza".into()),
///     quantity: None,
///     price: Some(RawScalar::Number(10.0)),
///     participants: vec!["alice".into(), "bob".into()],
/// };
///
/// let outcome = split_items(&[raw], &directory).unwrap();
/// assert_eq!(outcome.share_of(bob.id), 5.0);
/// ```
pub fn split_items(
    raw_items: &[RawItem],
    directory: &HashMap<String, Participant>,
) -> Result<SplitOutcome, TicketInputError> {
    let mut outcome = SplitOutcome::default();
    for (index, raw) in raw_items.iter().enumerate() {
        let item = normalise_item(index, raw, directory)?;
        let cost = item.cost();
        if !cost.is_finite() {
            return Err(TicketInputError::InvalidPrice { index });
        }
        let share = cost / item.participants.len() as f64;
        for participant in &item.participants {
            let total = outcome.amounts.entry(participant.id).or_insert(0.0);
            *total += share;
            if !total.is_finite() {
                return Err(TicketInputError::InvalidPrice { index });
            }
        }
        outcome.items.push(item);
    }
    Ok(outcome)
}

fn normalise_item(
    index: usize,
    raw: &RawItem,
    directory: &HashMap<String, Participant>,
) -> Result<Item, TicketInputError> {
    let name = raw
        .name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .ok_or(TicketInputError::MissingName { index })?;
    let quantity = parse_quantity(raw.quantity.as_ref());
    let price = raw
        .price
        .as_ref()
        .and_then(parse_price)
        .ok_or(TicketInputError::InvalidPrice { index })?;
    let participants = resolve_participants(index, &raw.participants, directory)?;

    Ok(Item {
        name: name.to_owned(),
        quantity,
        price,
        participants,
    })
}

/// Quantities fall back to one when absent, non-numeric or not positive.
fn parse_quantity(raw: Option<&RawScalar>) -> u32 {
    let parsed = match raw {
        Some(RawScalar::Number(value)) if value.is_finite() => {
            let truncated = value.trunc();
            (truncated >= 1.0 && truncated <= f64::from(u32::MAX)).then(|| truncated as u32)
        }
        Some(RawScalar::Text(text)) => text.trim().parse::<u32>().ok(),
        _ => None,
    };
    parsed.filter(|quantity| *quantity > 0).unwrap_or(1)
}

fn parse_price(raw: &RawScalar) -> Option<f64> {
    let value = match raw {
        RawScalar::Number(value) => *value,
        RawScalar::Text(text) => text.trim().parse::<f64>().ok()?,
    };
    (value.is_finite() && value >= 0.0).then_some(value)
}

fn resolve_participants(
    index: usize,
    usernames: &[String],
    directory: &HashMap<String, Participant>,
) -> Result<Vec<Participant>, TicketInputError> {
    if usernames.is_empty() {
        return Err(TicketInputError::NoParticipants { index });
    }

    let mut resolved: Vec<Participant> = Vec::with_capacity(usernames.len());
    for raw in usernames {
        let username = raw.trim();
        let participant =
            directory
                .get(username)
                .ok_or_else(|| TicketInputError::UnknownUser {
                    index,
                    username: username.to_owned(),
                })?;
        if resolved.iter().any(|p| p.id == participant.id) {
            return Err(TicketInputError::DuplicateParticipant {
                index,
                username: username.to_owned(),
            });
        }
        resolved.push(participant.clone());
    }
    Ok(resolved)
}

#[cfg(test)]
#[path = "split_tests.rs"]
mod tests;
