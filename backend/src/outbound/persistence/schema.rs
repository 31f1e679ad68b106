//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Registered accounts. `username` carries a unique index.
    users (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Unique login name.
        username -> Varchar,
        /// bcrypt-encoded password hash.
        password_hash -> Text,
        /// `Employee` or `Manager`.
        role -> Varchar,
        /// Object key of the profile image.
        image_path -> Nullable<Text>,
        /// Public URL of the profile image.
        image_url -> Nullable<Text>,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Reimbursement tickets, indexed by `status` and `author`.
    tickets (ticket_id) {
        /// Primary key: UUID v4 identifier.
        ticket_id -> Uuid,
        /// Strictly positive amount.
        amount -> Float8,
        /// Expense justification.
        description -> Text,
        /// Submitting user.
        author -> Uuid,
        /// `Pending`, `Approved` or `Rejected`.
        status -> Varchar,
        /// Manager who processed the ticket.
        resolver -> Nullable<Uuid>,
        /// Object key of the receipt image.
        image_path -> Nullable<Text>,
        /// Public URL of the receipt image.
        image_url -> Nullable<Text>,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::joinable!(tickets -> users (author));
diesel::allow_tables_to_appear_in_same_query!(tickets, users);
