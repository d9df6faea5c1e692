use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::MemoriaResult;
use crate::models::Fact;
use crate::store::FactStore;

const FACT_COLUMNS: &str = "uuid, created_at, modified_at, owner, question, answer, labels";

/// PostgreSQL-backed store. Each fact is one row of the `facts` table.
#[derive(Clone)]
pub struct PgFactStore {
    pool: PgPool,
}

impl PgFactStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl FactStore for PgFactStore {
    async fn find_by_uuid(&self, uuid: &str) -> MemoriaResult<Option<Fact>> {
        let fact = sqlx::query_as::<_, Fact>(&format!(
            "SELECT {} FROM facts WHERE uuid = $1",
            FACT_COLUMNS
        ))
        .bind(uuid)
        .fetch_optional(&self.pool)
        .await?;
        Ok(fact)
    }

    async fn save(&self, fact: &Fact) -> MemoriaResult<()> {
        sqlx::query(
            r#"
            INSERT INTO facts (uuid, created_at, modified_at, owner, question, answer, labels)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (uuid) DO UPDATE SET
                modified_at = EXCLUDED.modified_at,
                owner       = EXCLUDED.owner,
                question    = EXCLUDED.question,
                answer      = EXCLUDED.answer,
                labels      = EXCLUDED.labels
            "#,
        )
        .bind(&fact.uuid)
        .bind(fact.created_at)
        .bind(fact.modified_at)
        .bind(&fact.owner)
        .bind(&fact.question)
        .bind(&fact.answer)
        .bind(&fact.labels)
        .execute(&self.pool)
        .await?;

        tracing::debug!(uuid = %fact.uuid, "Saved fact");
        Ok(())
    }

    async fn remove(&self, uuid: &str) -> MemoriaResult<bool> {
        let result = sqlx::query("DELETE FROM facts WHERE uuid = $1")
            .bind(uuid)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn paginate(&self, offset: u64, limit: u64) -> MemoriaResult<(Vec<Fact>, u64)> {
        let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM facts")
            .fetch_one(&self.pool)
            .await?;

        let total = u64::try_from(total).unwrap_or(0);
        if offset >= total {
            return Ok((Vec::new(), total));
        }

        let items = sqlx::query_as::<_, Fact>(&format!(
            "SELECT {} FROM facts ORDER BY seq LIMIT $1 OFFSET $2",
            FACT_COLUMNS
        ))
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .bind(i64::try_from(offset).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;

        Ok((items, total))
    }
}
