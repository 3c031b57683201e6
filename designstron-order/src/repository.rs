use async_trait::async_trait;
use designstron_catalog::QuoteRequest;
use uuid::Uuid;

use crate::messages::Message;
use crate::models::{Order, OrderStatus};

pub type RepoResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Repository trait for order data access
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn create_order(&self, order: &Order) -> RepoResult<Uuid>;

    async fn get_order(&self, id: Uuid) -> RepoResult<Option<Order>>;

    /// Replace a stored order if its stored version is still
    /// `expected_version`. Returns `false`, storing nothing, when another
    /// writer got there first.
    async fn update_order(&self, order: &Order, expected_version: u64) -> RepoResult<bool>;

    async fn list_orders(&self, customer_id: &str) -> RepoResult<Vec<Order>>;

    async fn list_by_status(&self, status: OrderStatus) -> RepoResult<Vec<Order>>;
}

/// Autosaved calculator state, keyed by a client-chosen draft key
#[async_trait]
pub trait DraftRepository: Send + Sync {
    async fn save_draft(&self, key: &str, request: &QuoteRequest) -> RepoResult<()>;

    async fn load_draft(&self, key: &str) -> RepoResult<Option<QuoteRequest>>;

    async fn delete_draft(&self, key: &str) -> RepoResult<bool>;
}

/// Customer/admin messages attached to an order
#[async_trait]
pub trait MessageRepository: Send + Sync {
    async fn add_message(&self, message: &Message) -> RepoResult<()>;

    /// Messages of one order, oldest first
    async fn list_messages(&self, order_id: Uuid) -> RepoResult<Vec<Message>>;

    async fn update_messages(&self, messages: &[Message]) -> RepoResult<()>;
}
