//! Port abstraction for user persistence adapters and their errors.
use async_trait::async_trait;

use crate::domain::{User, UserId, Username};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// The username is already registered.
        DuplicateUsername { username: String } => "username {username} is already taken",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user record.
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch every user whose username is in `usernames`. Unknown names are
    /// skipped.
    async fn find_by_usernames(
        &self,
        usernames: &[Username],
    ) -> Result<Vec<User>, UserPersistenceError>;

    /// List all users ordered by username.
    async fn list_all(&self) -> Result<Vec<User>, UserPersistenceError>;

    /// Delete a user along with everything that references them, in one
    /// transaction: tickets they bought, accountings they are an endpoint of,
    /// and their item participations. Returns `false` when no such user
    /// existed.
    async fn delete_cascade(&self, id: &UserId) -> Result<bool, UserPersistenceError>;
}
