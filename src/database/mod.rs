pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod query_builder;
pub mod repository;
pub mod schema;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::InMemoryRepository;
pub use postgres::PgRepository;
pub use repository::StorageRepository;
