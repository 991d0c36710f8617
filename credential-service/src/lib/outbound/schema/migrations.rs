use crate::migration::models::Migration;

/// Append-only migration list baked into the binary.
pub const MIGRATIONS: &[Migration] = &[
    Migration::new(
        1,
        "create accounts, password credentials and refresh tokens",
        include_str!("../../../../migrations/0001_create_accounts.sql"),
    ),
    Migration::new(
        2,
        "index refresh tokens by account",
        include_str!("../../../../migrations/0002_index_refresh_tokens.sql"),
    ),
];
