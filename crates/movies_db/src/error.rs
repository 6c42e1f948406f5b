use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(String),

    #[error(transparent)]
    Domain(#[from] movies_core::DomainError),
}

pub type Result<T> = std::result::Result<T, DbError>;
