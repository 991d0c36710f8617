pub mod migrations;
pub mod store;

pub use migrations::MIGRATIONS;
pub use store::SqliteSchemaStore;
