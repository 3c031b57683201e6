pub mod app_config;
pub mod draft_repo;
pub mod message_repo;
pub mod order_repo;

pub use draft_repo::MemoryDraftRepository;
pub use message_repo::MemoryMessageRepository;
pub use order_repo::MemoryOrderRepository;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Record already exists: {0}")]
    Duplicate(String),

    #[error("Invalid key: {0:?}")]
    InvalidKey(String),

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}
