use thiserror::Error;
use crate::domain::error::DomainError; // ドメインエラーをラップするため
use crate::infrastructure::error::InfrastructureError; // InfrastructureError をラップするため

#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("Merge failed: {0}")]
    MergeFailed(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Domain error occurred: {0}")]
    DomainError(#[from] DomainError),

    #[error("Infrastructure error occurred: {0}")]
    InfrastructureError(#[from] InfrastructureError),
}
