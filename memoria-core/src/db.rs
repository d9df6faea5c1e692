use crate::config::DatabaseConfig;
use sqlx::{postgres::PgPoolOptions, PgPool};

const CREATE_FACTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS facts (
    seq         BIGSERIAL,
    uuid        TEXT PRIMARY KEY,
    created_at  TIMESTAMPTZ NOT NULL,
    modified_at TIMESTAMPTZ NOT NULL,
    owner       TEXT NOT NULL,
    question    TEXT NOT NULL,
    answer      TEXT NOT NULL,
    labels      TEXT[] NOT NULL DEFAULT '{}'
)
"#;

const CREATE_FACTS_SEQ_INDEX: &str =
    "CREATE UNIQUE INDEX IF NOT EXISTS facts_seq_idx ON facts (seq)";

pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.url)
        .await
}

pub async fn health_check(pool: &PgPool) -> Result<String, sqlx::Error> {
    let row: (String,) = sqlx::query_as("SELECT version()").fetch_one(pool).await?;
    Ok(row.0)
}

/// Create the `facts` collection if it does not exist yet. Idempotent.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query(CREATE_FACTS_TABLE).execute(pool).await?;
    sqlx::query(CREATE_FACTS_SEQ_INDEX).execute(pool).await?;
    Ok(())
}
