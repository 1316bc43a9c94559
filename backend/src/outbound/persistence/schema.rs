//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. When
//! migrations change the schema, regenerate with `diesel print-schema`.

diesel::table! {
    /// Registered users. Credentials live with the identity provider.
    users (id) {
        id -> Uuid,
        /// Unique login name (3 to 32 characters).
        username -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Purchase events.
    tickets (id) {
        id -> Uuid,
        /// The user who paid the vendor.
        buyer_id -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Ticket lines, cascade-deleted with their ticket.
    items (id) {
        id -> Uuid,
        ticket_id -> Uuid,
        /// Zero-based order of the line within the ticket.
        position -> Int4,
        name -> Text,
        quantity -> Int4,
        /// Per-unit price.
        price -> Float8,
    }
}

diesel::table! {
    /// Users sharing an item.
    item_participants (item_id, user_id) {
        item_id -> Uuid,
        user_id -> Uuid,
    }
}

diesel::table! {
    /// Ledger edges; at most one per (ticket, user_from, user_to).
    accountings (id) {
        id -> Uuid,
        ticket_id -> Uuid,
        user_from -> Uuid,
        user_to -> Uuid,
        total_price -> Float8,
        paid_price -> Float8,
    }
}

diesel::joinable!(tickets -> users (buyer_id));
diesel::joinable!(items -> tickets (ticket_id));
diesel::joinable!(item_participants -> items (item_id));
diesel::joinable!(item_participants -> users (user_id));
diesel::joinable!(accountings -> tickets (ticket_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    tickets,
    items,
    item_participants,
    accountings,
);
