use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::manager::OrderError;
use crate::repository::{MessageRepository, OrderRepository};

pub const MAX_MESSAGE_LEN: usize = 2000;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageAuthor {
    Customer,
    Admin,
}

/// A message exchanged between the customer and the agency about one order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub order_id: Uuid,
    pub author: MessageAuthor,
    pub body: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn new(order_id: Uuid, author: MessageAuthor, body: &str) -> Result<Self, OrderError> {
        let body = body.trim();
        if body.is_empty() {
            return Err(OrderError::InvalidMessage("message is empty".to_string()));
        }
        if body.chars().count() > MAX_MESSAGE_LEN {
            return Err(OrderError::InvalidMessage(format!(
                "message is longer than {} characters",
                MAX_MESSAGE_LEN
            )));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            order_id,
            author,
            body: body.to_string(),
            read: false,
            created_at: Utc::now(),
        })
    }
}

/// Per-order message threads
pub struct MessageBoard {
    messages: Arc<dyn MessageRepository>,
    orders: Arc<dyn OrderRepository>,
}

impl MessageBoard {
    pub fn new(messages: Arc<dyn MessageRepository>, orders: Arc<dyn OrderRepository>) -> Self {
        Self { messages, orders }
    }

    pub async fn post(&self, order_id: Uuid, author: MessageAuthor, body: &str) -> Result<Message, OrderError> {
        self.ensure_order(order_id).await?;
        let message = Message::new(order_id, author, body)?;
        self.messages
            .add_message(&message)
            .await
            .map_err(|e| OrderError::Repository(e.to_string()))?;

        tracing::info!("{:?} posted message {} on order {}", author, message.id, order_id);
        Ok(message)
    }

    /// Thread of one order, oldest first
    pub async fn thread(&self, order_id: Uuid) -> Result<Vec<Message>, OrderError> {
        self.ensure_order(order_id).await?;
        self.messages
            .list_messages(order_id)
            .await
            .map_err(|e| OrderError::Repository(e.to_string()))
    }

    /// Mark everything the other party wrote as read; returns how many changed
    pub async fn mark_read(&self, order_id: Uuid, reader: MessageAuthor) -> Result<usize, OrderError> {
        let mut changed: Vec<Message> = self
            .thread(order_id)
            .await?
            .into_iter()
            .filter(|m| m.author != reader && !m.read)
            .collect();
        for message in &mut changed {
            message.read = true;
        }

        self.messages
            .update_messages(&changed)
            .await
            .map_err(|e| OrderError::Repository(e.to_string()))?;
        Ok(changed.len())
    }

    pub async fn unread_count(&self, order_id: Uuid, reader: MessageAuthor) -> Result<usize, OrderError> {
        Ok(self
            .thread(order_id)
            .await?
            .iter()
            .filter(|m| m.author != reader && !m.read)
            .count())
    }

    async fn ensure_order(&self, order_id: Uuid) -> Result<(), OrderError> {
        self.orders
            .get_order(order_id)
            .await
            .map_err(|e| OrderError::Repository(e.to_string()))?
            .map(|_| ())
            .ok_or(OrderError::NotFound(order_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BuyerData, Order, OrderKind};
    use crate::test_support::{engine, InMemoryMessages, InMemoryOrders};
    use designstron_catalog::QuoteRequest;

    async fn board_with_order() -> (MessageBoard, Uuid) {
        let orders = Arc::new(InMemoryOrders::default());
        let quote = engine().quote(&QuoteRequest::new("basic", 5)).unwrap();
        let order = Order::from_quote(
            OrderKind::Website,
            BuyerData::new("Jan", "jan@example.com"),
            None,
            &quote,
        );
        orders.create_order(&order).await.unwrap();

        let board = MessageBoard::new(Arc::new(InMemoryMessages::default()), orders);
        (board, order.id)
    }

    #[tokio::test]
    async fn test_thread_and_unread() {
        let (board, order_id) = board_with_order().await;

        board.post(order_id, MessageAuthor::Customer, "Can we add a gallery?").await.unwrap();
        board.post(order_id, MessageAuthor::Admin, "Sure, priced as a blog add-on.").await.unwrap();
        board.post(order_id, MessageAuthor::Customer, "  Great, thanks!  ").await.unwrap();

        let thread = board.thread(order_id).await.unwrap();
        assert_eq!(thread.len(), 3);
        assert_eq!(thread[2].body, "Great, thanks!");

        assert_eq!(board.unread_count(order_id, MessageAuthor::Admin).await.unwrap(), 2);
        assert_eq!(board.mark_read(order_id, MessageAuthor::Admin).await.unwrap(), 2);
        assert_eq!(board.unread_count(order_id, MessageAuthor::Admin).await.unwrap(), 0);
        assert_eq!(board.unread_count(order_id, MessageAuthor::Customer).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_rejects_empty_and_unknown_order() {
        let (board, order_id) = board_with_order().await;

        assert!(matches!(
            board.post(order_id, MessageAuthor::Customer, "   ").await,
            Err(OrderError::InvalidMessage(_))
        ));
        assert!(matches!(
            board.post(Uuid::new_v4(), MessageAuthor::Customer, "hello").await,
            Err(OrderError::NotFound(_))
        ));

        let too_long = "x".repeat(MAX_MESSAGE_LEN + 1);
        assert!(board.post(order_id, MessageAuthor::Admin, &too_long).await.is_err());
    }
}
