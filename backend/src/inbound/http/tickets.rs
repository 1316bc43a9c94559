//! Ticket endpoints.
//!
//! ```text
//! POST   /api/v1/tickets         {"items":[{"name":"pizza","quantity":1,"price":"10","participants":["alice",{"username":"bob"}]}]}
//! GET    /api/v1/tickets
//! GET    /api/v1/tickets/{id}
//! PATCH  /api/v1/tickets/{id}    {"items":[...]}
//! DELETE /api/v1/tickets/{id}
//! ```
//!
//! Item fields are accepted loosely, as older clients send them: prices and
//! quantities may be numbers or numeric strings, and participants may be
//! plain usernames or `{ "username": ... }` objects.

use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{
    CreateTicketRequest, DeleteTicketRequest, EditTicketRequest, TicketPayload,
};
use crate::domain::{Error, RawItem, RawScalar, TicketInputError};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::parse_ticket_id;

/// A number, a string, or anything else a client happened to send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum ScalarBody {
    Number(f64),
    Text(String),
    #[schema(value_type = Object)]
    Other(serde_json::Value),
}

impl ScalarBody {
    fn into_raw(self) -> Option<RawScalar> {
        match self {
            Self::Number(value) => Some(RawScalar::Number(value)),
            Self::Text(value) => Some(RawScalar::Text(value)),
            Self::Other(_) => None,
        }
    }
}

/// Participant reference: `"alice"` or `{ "username": "alice" }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum ParticipantRefBody {
    Username(String),
    Object { username: String },
}

impl ParticipantRefBody {
    fn into_username(self) -> String {
        match self {
            Self::Username(username) | Self::Object { username } => username,
        }
    }
}

/// One item as sent by clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemBody {
    #[schema(example = "pizza")]
    pub name: Option<String>,
    #[serde(default)]
    pub quantity: Option<ScalarBody>,
    pub price: Option<ScalarBody>,
    #[serde(default)]
    pub participants: Vec<ParticipantRefBody>,
}

impl From<ItemBody> for RawItem {
    fn from(value: ItemBody) -> Self {
        Self {
            name: value.name,
            quantity: value.quantity.and_then(ScalarBody::into_raw),
            price: value.price.and_then(ScalarBody::into_raw),
            participants: value
                .participants
                .into_iter()
                .map(ParticipantRefBody::into_username)
                .collect(),
        }
    }
}

/// Body of ticket creation and edit requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TicketItemsBody {
    #[serde(default)]
    pub items: Vec<ItemBody>,
}

impl TicketItemsBody {
    fn into_raw_items(self) -> Result<Vec<RawItem>, Error> {
        if self.items.is_empty() {
            return Err(TicketInputError::NoItems.into());
        }
        Ok(self.items.into_iter().map(RawItem::from).collect())
    }
}

/// Record a ticket bought by the caller.
#[utoipa::path(
    post,
    path = "/api/v1/tickets",
    request_body = TicketItemsBody,
    responses(
        (status = 201, description = "Ticket created", body = TicketPayload),
        (status = 400, description = "Invalid ticket input", body = ErrorSchema),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["tickets"],
    operation_id = "createTicket",
    security(("SessionCookie" = []))
)]
#[post("/tickets")]
pub async fn create_ticket(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<TicketItemsBody>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user_id()?;
    let items = payload.into_inner().into_raw_items()?;
    let ticket = state
        .tickets
        .create_ticket(CreateTicketRequest { actor, items })
        .await?;
    Ok(HttpResponse::Created().json(ticket))
}

/// Tickets bought by the caller, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/tickets",
    responses(
        (status = 200, description = "Tickets", body = [TicketPayload]),
        (status = 401, description = "Unauthorized", body = ErrorSchema)
    ),
    tags = ["tickets"],
    operation_id = "listMyTickets",
    security(("SessionCookie" = []))
)]
#[get("/tickets")]
pub async fn list_my_tickets(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<TicketPayload>>> {
    let actor = session.require_user_id()?;
    Ok(web::Json(state.tickets_query.list_my_tickets(&actor).await?))
}

/// One ticket, if the caller bought it or appears in its ledger.
#[utoipa::path(
    get,
    path = "/api/v1/tickets/{id}",
    params(("id" = String, Path, description = "Ticket id")),
    responses(
        (status = 200, description = "Ticket", body = TicketPayload),
        (status = 400, description = "Malformed id", body = ErrorSchema),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["tickets"],
    operation_id = "getTicket",
    security(("SessionCookie" = []))
)]
#[get("/tickets/{id}")]
pub async fn get_ticket(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<TicketPayload>> {
    let actor = session.require_user_id()?;
    let ticket_id = parse_ticket_id(&path.into_inner())?;
    Ok(web::Json(
        state.tickets_query.get_ticket(&actor, &ticket_id).await?,
    ))
}

/// Replace a ticket's items and reconcile its ledger.
///
/// Amounts already paid on entries that shrink are moved onto refund tickets.
#[utoipa::path(
    patch,
    path = "/api/v1/tickets/{id}",
    params(("id" = String, Path, description = "Ticket id")),
    request_body = TicketItemsBody,
    responses(
        (status = 200, description = "Updated ticket", body = TicketPayload),
        (status = 400, description = "Invalid ticket input", body = ErrorSchema),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["tickets"],
    operation_id = "editTicket",
    security(("SessionCookie" = []))
)]
#[patch("/tickets/{id}")]
pub async fn edit_ticket(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<TicketItemsBody>,
) -> ApiResult<web::Json<TicketPayload>> {
    let actor = session.require_user_id()?;
    let ticket_id = parse_ticket_id(&path.into_inner())?;
    let items = payload.into_inner().into_raw_items()?;
    let ticket = state
        .tickets
        .edit_ticket(EditTicketRequest {
            actor,
            ticket_id,
            items,
        })
        .await?;
    Ok(web::Json(ticket))
}

/// Delete a ticket bought by the caller.
#[utoipa::path(
    delete,
    path = "/api/v1/tickets/{id}",
    params(("id" = String, Path, description = "Ticket id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["tickets"],
    operation_id = "deleteTicket",
    security(("SessionCookie" = []))
)]
#[delete("/tickets/{id}")]
pub async fn delete_ticket(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user_id()?;
    let ticket_id = parse_ticket_id(&path.into_inner())?;
    state
        .tickets
        .delete_ticket(DeleteTicketRequest { actor, ticket_id })
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
#[path = "tickets_tests.rs"]
mod tests;
