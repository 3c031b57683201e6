pub mod manager;
pub mod messages;
pub mod models;
pub mod orchestrator;
pub mod repository;
pub mod wizard;

pub use manager::{OrderError, OrderManager};
pub use messages::{Message, MessageAuthor, MessageBoard};
pub use models::{BuyerData, Order, OrderItem, OrderKind, OrderStatus};
pub use orchestrator::{CheckoutUrls, MockCheckoutGateway, PaymentOrchestrator};
pub use repository::{DraftRepository, MessageRepository, OrderRepository, RepoResult};
pub use wizard::{OrderSubmission, OrderWizard, WizardError, WizardStep};

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::HashMap;

    use async_trait::async_trait;
    use designstron_catalog::catalog::fixtures;
    use designstron_catalog::PricingEngine;
    use tokio::sync::Mutex;
    use uuid::Uuid;

    use crate::messages::Message;
    use crate::models::{Order, OrderStatus};
    use crate::repository::{MessageRepository, OrderRepository, RepoResult};

    pub fn engine() -> PricingEngine {
        PricingEngine::new(fixtures::catalog()).unwrap()
    }

    /// Order-crate doubles of the repositories. `designstron-store` depends
    /// on this crate, so its implementations cannot be used here.
    #[derive(Default)]
    pub struct InMemoryOrders {
        orders: Mutex<HashMap<Uuid, Order>>,
    }

    #[async_trait]
    impl OrderRepository for InMemoryOrders {
        async fn create_order(&self, order: &Order) -> RepoResult<Uuid> {
            self.orders.lock().await.insert(order.id, order.clone());
            Ok(order.id)
        }

        async fn get_order(&self, id: Uuid) -> RepoResult<Option<Order>> {
            Ok(self.orders.lock().await.get(&id).cloned())
        }

        async fn update_order(&self, order: &Order, expected_version: u64) -> RepoResult<bool> {
            let mut orders = self.orders.lock().await;
            match orders.get(&order.id) {
                Some(stored) if stored.version == expected_version => {
                    orders.insert(order.id, order.clone());
                    Ok(true)
                }
                Some(_) => Ok(false),
                None => Err(format!("unknown order {}", order.id).into()),
            }
        }

        async fn list_orders(&self, customer_id: &str) -> RepoResult<Vec<Order>> {
            Ok(self
                .orders
                .lock()
                .await
                .values()
                .filter(|o| o.customer_id == customer_id)
                .cloned()
                .collect())
        }

        async fn list_by_status(&self, status: OrderStatus) -> RepoResult<Vec<Order>> {
            Ok(self
                .orders
                .lock()
                .await
                .values()
                .filter(|o| o.status == status)
                .cloned()
                .collect())
        }
    }

    #[derive(Default)]
    pub struct InMemoryMessages {
        messages: Mutex<Vec<Message>>,
    }

    #[async_trait]
    impl MessageRepository for InMemoryMessages {
        async fn add_message(&self, message: &Message) -> RepoResult<()> {
            self.messages.lock().await.push(message.clone());
            Ok(())
        }

        async fn list_messages(&self, order_id: Uuid) -> RepoResult<Vec<Message>> {
            Ok(self
                .messages
                .lock()
                .await
                .iter()
                .filter(|m| m.order_id == order_id)
                .cloned()
                .collect())
        }

        async fn update_messages(&self, updated: &[Message]) -> RepoResult<()> {
            let mut messages = self.messages.lock().await;
            for message in updated {
                if let Some(existing) = messages.iter_mut().find(|m| m.id == message.id) {
                    *existing = message.clone();
                }
            }
            Ok(())
        }
    }
}
