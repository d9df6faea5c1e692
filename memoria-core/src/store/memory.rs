use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::MemoriaResult;
use crate::models::Fact;
use crate::store::FactStore;

/// In-process store keeping facts in insertion order.
///
/// Lookups are linear; this backend is meant for tests and local runs,
/// not for large collections.
#[derive(Debug, Default)]
pub struct InMemoryFactStore {
    facts: RwLock<Vec<Fact>>,
}

impl InMemoryFactStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FactStore for InMemoryFactStore {
    async fn find_by_uuid(&self, uuid: &str) -> MemoriaResult<Option<Fact>> {
        let facts = self.facts.read().await;
        Ok(facts.iter().find(|f| f.uuid == uuid).cloned())
    }

    async fn save(&self, fact: &Fact) -> MemoriaResult<()> {
        let mut facts = self.facts.write().await;
        match facts.iter_mut().find(|f| f.uuid == fact.uuid) {
            Some(existing) => {
                let created_at = existing.created_at;
                *existing = fact.clone();
                existing.created_at = created_at;
            }
            None => facts.push(fact.clone()),
        }
        Ok(())
    }

    async fn remove(&self, uuid: &str) -> MemoriaResult<bool> {
        let mut facts = self.facts.write().await;
        let before = facts.len();
        facts.retain(|f| f.uuid != uuid);
        Ok(facts.len() < before)
    }

    async fn paginate(&self, offset: u64, limit: u64) -> MemoriaResult<(Vec<Fact>, u64)> {
        let facts = self.facts.read().await;
        let total = facts.len() as u64;
        let offset = usize::try_from(offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        let items = facts.iter().skip(offset).take(limit).cloned().collect();
        Ok((items, total))
    }
}
