pub mod clock;
pub mod database;
pub mod repositories;
pub mod schema;
