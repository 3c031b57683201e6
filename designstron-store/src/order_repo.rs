use async_trait::async_trait;
use designstron_order::{Order, OrderRepository, OrderStatus, RepoResult};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::StoreError;

/// Orders kept in process memory
#[derive(Default)]
pub struct MemoryOrderRepository {
    orders: RwLock<HashMap<Uuid, Order>>,
}

impl MemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first(mut orders: Vec<Order>) -> Vec<Order> {
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    orders
}

#[async_trait]
impl OrderRepository for MemoryOrderRepository {
    async fn create_order(&self, order: &Order) -> RepoResult<Uuid> {
        let mut orders = self.orders.write().await;
        if orders.contains_key(&order.id) {
            return Err(StoreError::Duplicate(order.id.to_string()).into());
        }
        orders.insert(order.id, order.clone());
        tracing::debug!("Stored order {}", order.id);
        Ok(order.id)
    }

    async fn get_order(&self, id: Uuid) -> RepoResult<Option<Order>> {
        Ok(self.orders.read().await.get(&id).cloned())
    }

    async fn update_order(&self, order: &Order, expected_version: u64) -> RepoResult<bool> {
        let mut orders = self.orders.write().await;
        let slot = orders
            .get_mut(&order.id)
            .ok_or_else(|| StoreError::NotFound(order.id.to_string()))?;
        if slot.version != expected_version {
            tracing::warn!(
                "Stale update of order {}: stored version {}, expected {}",
                order.id,
                slot.version,
                expected_version
            );
            return Ok(false);
        }
        *slot = order.clone();
        Ok(true)
    }

    async fn list_orders(&self, customer_id: &str) -> RepoResult<Vec<Order>> {
        let orders = self.orders.read().await;
        Ok(newest_first(
            orders
                .values()
                .filter(|o| o.customer_id == customer_id)
                .cloned()
                .collect(),
        ))
    }

    async fn list_by_status(&self, status: OrderStatus) -> RepoResult<Vec<Order>> {
        let orders = self.orders.read().await;
        Ok(newest_first(
            orders.values().filter(|o| o.status == status).cloned().collect(),
        ))
    }
}
