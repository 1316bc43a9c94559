//! OpenAPI document for the REST API.
//!
//! Served by Swagger UI at `/docs` in debug builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::ports::{
    AccountingPayload, ItemPayload, LedgerEntryPayload, ParticipantPayload, TicketPayload,
    UserPayload,
};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use crate::inbound::http::tickets::{ItemBody, ParticipantRefBody, ScalarBody, TicketItemsBody};
use crate::inbound::http::users::RegisterUserBody;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Encrypted session cookie issued by the identity provider.",
            ))),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Tabsplit API",
        description = "Shared-expense tickets, the debts they create and their settlement."
    ),
    servers((url = "/", description = "Relative to the deployment base URL")),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::users::register_user,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::current_user,
        crate::inbound::http::users::delete_self,
        crate::inbound::http::tickets::create_ticket,
        crate::inbound::http::tickets::list_my_tickets,
        crate::inbound::http::tickets::get_ticket,
        crate::inbound::http::tickets::edit_ticket,
        crate::inbound::http::tickets::delete_ticket,
        crate::inbound::http::ledger::debts_of,
        crate::inbound::http::ledger::paid_debts,
        crate::inbound::http::ledger::debts_from,
        crate::inbound::http::ledger::settle_debt,
        crate::inbound::http::ledger::credits_of,
        crate::inbound::http::ledger::credits_to,
        crate::inbound::http::ledger::mark_credit_paid,
        crate::inbound::http::ledger::self_accountings,
        crate::inbound::http::ledger::settle_all_with,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        UserPayload,
        RegisterUserBody,
        TicketPayload,
        ItemPayload,
        ParticipantPayload,
        AccountingPayload,
        LedgerEntryPayload,
        TicketItemsBody,
        ItemBody,
        ScalarBody,
        ParticipantRefBody,
    )),
    tags(
        (name = "users", description = "User directory"),
        (name = "tickets", description = "Tickets and their items"),
        (name = "ledger", description = "Debts, credits and settlement"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
