//! Fact persistence backends.
//!
//! Persistence operations never touch a database handle directly; they are
//! given a [`FactStore`] and work through its four capabilities. The server
//! wires in [`PgFactStore`]; tests and `--in-memory` runs use
//! [`InMemoryFactStore`].

pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::MemoriaResult;
use crate::models::Fact;

pub use memory::InMemoryFactStore;
pub use postgres::PgFactStore;

/// Storage capability set for facts.
#[async_trait]
pub trait FactStore: Send + Sync {
    /// Look up a fact by uuid. `Ok(None)` when absent.
    async fn find_by_uuid(&self, uuid: &str) -> MemoriaResult<Option<Fact>>;

    /// Insert or replace the fact keyed by its uuid. `created_at` of an
    /// existing record is preserved.
    async fn save(&self, fact: &Fact) -> MemoriaResult<()>;

    /// Remove a fact. Returns whether a record was deleted.
    async fn remove(&self, uuid: &str) -> MemoriaResult<bool>;

    /// Return `limit` facts starting at `offset` in insertion order, plus
    /// the total number of stored facts.
    async fn paginate(&self, offset: u64, limit: u64) -> MemoriaResult<(Vec<Fact>, u64)>;
}

/// Shared, cheaply clonable store handle injected into handlers.
pub type StoreHandle = Arc<dyn FactStore>;
