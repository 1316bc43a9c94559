//! Shared-expense ticket splitting and debt ledger backend.
//!
//! Tickets list items and who took part in each; splitting them yields the
//! debts every participant owes the buyer. Editing a ticket reconciles its
//! ledger, carrying payments forward and turning overpayments into refund
//! tickets.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
