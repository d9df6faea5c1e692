pub mod config;
pub mod db;
pub mod error;
pub mod facts;
pub mod models;
pub mod store;

pub use config::MemoriaConfig;
pub use error::{MemoriaError, MemoriaResult};
pub use models::{Fact, FactPayload, Page, PageSize};
pub use store::{FactStore, InMemoryFactStore, PgFactStore, StoreHandle};
