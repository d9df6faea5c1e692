//! Fact lifecycle operations: create, get, update, delete and paginated list.
//!
//! Every operation receives the store explicitly. Lookups that find nothing
//! fail with [`MemoriaError::NotFound`]; translating that into a response is
//! left to the caller.

use crate::error::{MemoriaError, MemoriaResult};
use crate::models::page::page_offset;
use crate::models::{Fact, FactPayload, Page, PageSize};
use crate::store::FactStore;

/// Build a fact from `data`, persist it and return it with its
/// server-assigned uuid and timestamps.
pub async fn create_fact(store: &dyn FactStore, data: FactPayload) -> MemoriaResult<Fact> {
    let fact = Fact::from_payload(data);
    store.save(&fact).await?;
    tracing::info!(uuid = %fact.uuid, owner = %fact.owner, "Created fact");
    Ok(fact)
}

pub async fn get_fact(store: &dyn FactStore, uuid: &str) -> MemoriaResult<Fact> {
    store
        .find_by_uuid(uuid)
        .await?
        .ok_or_else(|| MemoriaError::NotFound(uuid.to_string()))
}

/// Full replace of the mutable fields of an existing fact.
pub async fn update_fact(store: &dyn FactStore, uuid: &str, data: FactPayload) -> MemoriaResult<()> {
    let mut fact = get_fact(store, uuid).await?;
    fact.apply(data);
    store.save(&fact).await?;
    tracing::info!(uuid = %fact.uuid, "Updated fact");
    Ok(())
}

pub async fn delete_fact(store: &dyn FactStore, uuid: &str) -> MemoriaResult<()> {
    let fact = get_fact(store, uuid).await?;
    // A concurrent delete between lookup and removal still counts as gone.
    if !store.remove(&fact.uuid).await? {
        return Err(MemoriaError::NotFound(uuid.to_string()));
    }
    tracing::info!(uuid = %uuid, "Deleted fact");
    Ok(())
}

/// One page of facts in insertion order. Pages past the end are empty,
/// not an error.
pub async fn list_facts(
    store: &dyn FactStore,
    page: u32,
    per_page: PageSize,
) -> MemoriaResult<Page<Fact>> {
    let page = page.max(1);
    let (items, total) = store
        .paginate(page_offset(page, per_page), u64::from(per_page.get()))
        .await?;
    Ok(Page::new(page, per_page, total, items))
}
