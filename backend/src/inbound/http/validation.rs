//! Shared parsing helpers for path and body values.

use actix_web::{HttpRequest, error::JsonPayloadError, web};
use serde_json::json;
use uuid::Uuid;

use crate::domain::{AccountingId, Error, TicketId, UserId};

fn invalid_uuid(field: &'static str, value: &str) -> Error {
    Error::invalid_request(format!("{field} must be a valid UUID")).with_details(json!({
        "field": field,
        "value": value,
        "code": "invalid_uuid",
    }))
}

fn parse_uuid(field: &'static str, value: &str) -> Result<Uuid, Error> {
    Uuid::parse_str(value).map_err(|_| invalid_uuid(field, value))
}

pub(crate) fn parse_ticket_id(value: &str) -> Result<TicketId, Error> {
    parse_uuid("ticketId", value).map(TicketId::from)
}

pub(crate) fn parse_accounting_id(value: &str) -> Result<AccountingId, Error> {
    parse_uuid("accountingId", value).map(AccountingId::from)
}

pub(crate) fn parse_user_id(value: &str) -> Result<UserId, Error> {
    parse_uuid("userId", value).map(UserId::from)
}

/// JSON extractor configuration reporting malformed bodies as `invalid_request`.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|error: JsonPayloadError, _req: &HttpRequest| {
        Error::invalid_request(format!("malformed request body: {error}"))
            .with_details(json!({ "code": "malformed_body" }))
            .into()
    })
}
