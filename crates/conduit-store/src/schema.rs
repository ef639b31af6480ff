//! Diesel schema for the Postgres-backed `ConnectionStore` (feature `pg`).
//! Replaceable with `diesel print-schema`.

diesel::table! {
    connections (id) {
        id -> Text,
        external_id -> Text,
        integration_id -> Text,
        connector_id -> Text,
        config -> Jsonb,
        sync_interval_minutes -> Integer,
        active_syncs -> Jsonb,
        metadata -> Jsonb,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}
