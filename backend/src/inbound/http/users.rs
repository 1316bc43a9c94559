//! User directory endpoints.
//!
//! ```text
//! POST   /api/v1/users     {"username":"alice"}
//! GET    /api/v1/users
//! GET    /api/v1/users/me
//! DELETE /api/v1/users/me
//! ```
//!
//! Credentials are owned by the identity provider; registration only records
//! the username the ledger refers to.

use actix_web::{HttpResponse, delete, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::UserPayload;
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Registration request body.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserBody {
    #[schema(example = "alice")]
    pub username: String,
}

/// Register a username.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = RegisterUserBody,
    responses(
        (status = 201, description = "User registered", body = UserPayload),
        (status = 400, description = "Invalid username", body = ErrorSchema),
        (status = 409, description = "Username taken", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "registerUser",
    security([])
)]
#[post("/users")]
pub async fn register_user(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterUserBody>,
) -> ApiResult<HttpResponse> {
    let user = state.users.register(payload.into_inner().username).await?;
    Ok(HttpResponse::Created().json(user))
}

/// Every registered user, ordered by username.
#[utoipa::path(
    get,
    path = "/api/v1/users",
    responses(
        (status = 200, description = "Users", body = [UserPayload]),
        (status = 401, description = "Unauthorized", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "listUsers",
    security(("SessionCookie" = []))
)]
#[get("/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<UserPayload>>> {
    let actor = session.require_user_id()?;
    Ok(web::Json(state.users.list_users(&actor).await?))
}

/// The user behind the session cookie.
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses(
        (status = 200, description = "Current user", body = UserPayload),
        (status = 401, description = "Unauthorized", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "currentUser",
    security(("SessionCookie" = []))
)]
#[get("/users/me")]
pub async fn current_user(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<UserPayload>> {
    let actor = session.require_user_id()?;
    Ok(web::Json(state.users.current_user(&actor).await?))
}

/// Delete the caller together with their tickets and ledger entries.
#[utoipa::path(
    delete,
    path = "/api/v1/users/me",
    responses(
        (status = 204, description = "Deleted"),
        (status = 401, description = "Unauthorized", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "deleteSelf",
    security(("SessionCookie" = []))
)]
#[delete("/users/me")]
pub async fn delete_self(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user_id()?;
    state.users.delete_self(&actor).await?;
    session.clear();
    Ok(HttpResponse::NoContent().finish())
}
