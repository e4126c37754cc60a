// Service exports
pub mod memory;
pub mod postgres;
pub mod store;

pub use memory::{MemoryStore, Seed};
pub use postgres::PostgresStore;
pub use store::{CorpusReader, RoleResolver, StorageError};
