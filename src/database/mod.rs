pub mod error;
pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod storage;

pub use error::DatabaseError;
pub use manager::DatabaseManager;
pub use memory::MemoryStorage;
pub use postgres::PgStorage;
pub use storage::{NotificationFilter, Storage, StorageResult};
