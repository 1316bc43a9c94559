//! User directory service.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::info;

use crate::domain::ports::{UserDirectory, UserPayload, UserPersistenceError, UserRepository};
use crate::domain::{Error, User, UserId, Username};

pub(crate) fn map_user_repository_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::DuplicateUsername { username } => {
            Error::conflict(format!("username {username} is already taken"))
                .with_details(json!({ "field": "username" }))
        }
    }
}

/// Resolve the acting principal. Unknown ids are treated as unauthenticated.
pub(crate) async fn resolve_actor<R>(repo: &R, actor: &UserId) -> Result<User, Error>
where
    R: UserRepository + ?Sized,
{
    repo.find_by_id(actor)
        .await
        .map_err(map_user_repository_error)?
        .ok_or_else(|| Error::unauthorized("login required"))
}

/// User directory service implementing [`UserDirectory`].
#[derive(Clone)]
pub struct UserService<U> {
    user_repo: Arc<U>,
    clock: Arc<dyn Clock>,
}

impl<U> UserService<U> {
    /// Create a new directory over the user repository.
    pub fn new(user_repo: Arc<U>, clock: Arc<dyn Clock>) -> Self {
        Self { user_repo, clock }
    }
}

#[async_trait]
impl<U> UserDirectory for UserService<U>
where
    U: UserRepository,
{
    async fn register(&self, username: String) -> Result<UserPayload, Error> {
        let username = Username::new(&username).map_err(|err| {
            Error::invalid_request(err.to_string()).with_details(json!({ "field": "username" }))
        })?;
        let user = User::new(UserId::random(), username, self.clock.utc());

        self.user_repo
            .insert(&user)
            .await
            .map_err(map_user_repository_error)?;

        info!(user_id = %user.id(), username = %user.username(), "user registered");
        Ok(user.into())
    }

    async fn current_user(&self, actor: &UserId) -> Result<UserPayload, Error> {
        resolve_actor(self.user_repo.as_ref(), actor)
            .await
            .map(Into::into)
    }

    async fn list_users(&self, actor: &UserId) -> Result<Vec<UserPayload>, Error> {
        resolve_actor(self.user_repo.as_ref(), actor).await?;
        let users = self
            .user_repo
            .list_all()
            .await
            .map_err(map_user_repository_error)?;
        Ok(users.into_iter().map(Into::into).collect())
    }

    async fn delete_self(&self, actor: &UserId) -> Result<(), Error> {
        let deleted = self
            .user_repo
            .delete_cascade(actor)
            .await
            .map_err(map_user_repository_error)?;
        if !deleted {
            return Err(Error::unauthorized("login required"));
        }
        info!(user_id = %actor, "user deleted");
        Ok(())
    }
}
