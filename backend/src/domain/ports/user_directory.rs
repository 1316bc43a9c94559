//! Driving port for the user directory.

use async_trait::async_trait;

use crate::domain::{Error, UserId};

use super::UserPayload;

/// Registration, lookup and self-service deletion of users.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Register a username. Duplicates fail with `conflict`.
    async fn register(&self, username: String) -> Result<UserPayload, Error>;

    /// Resolve the acting user; unknown ids fail with `unauthorized`.
    async fn current_user(&self, actor: &UserId) -> Result<UserPayload, Error>;

    /// Every user ordered by username.
    async fn list_users(&self, actor: &UserId) -> Result<Vec<UserPayload>, Error>;

    /// Delete the actor and everything that references them.
    async fn delete_self(&self, actor: &UserId) -> Result<(), Error>;
}
