use thiserror::Error;

#[derive(Error, Debug)]
pub enum MemoriaError {
    /// No fact with the given uuid exists in the store.
    #[error("Fact not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Other error: {0}")]
    Other(String),
}

impl MemoriaError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, MemoriaError::NotFound(_))
    }
}

pub type MemoriaResult<T> = Result<T, MemoriaError>;
