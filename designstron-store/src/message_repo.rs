use async_trait::async_trait;
use designstron_order::{Message, MessageRepository, RepoResult};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Order message threads kept in process memory
#[derive(Default)]
pub struct MemoryMessageRepository {
    threads: RwLock<HashMap<Uuid, Vec<Message>>>,
}

impl MemoryMessageRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessageRepository for MemoryMessageRepository {
    async fn add_message(&self, message: &Message) -> RepoResult<()> {
        self.threads
            .write()
            .await
            .entry(message.order_id)
            .or_default()
            .push(message.clone());
        Ok(())
    }

    async fn list_messages(&self, order_id: Uuid) -> RepoResult<Vec<Message>> {
        Ok(self
            .threads
            .read()
            .await
            .get(&order_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn update_messages(&self, updated: &[Message]) -> RepoResult<()> {
        let mut threads = self.threads.write().await;
        for message in updated {
            if let Some(existing) = threads
                .get_mut(&message.order_id)
                .and_then(|thread| thread.iter_mut().find(|m| m.id == message.id))
            {
                *existing = message.clone();
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use designstron_order::MessageAuthor;

    #[tokio::test]
    async fn test_threads_are_per_order() {
        let repo = MemoryMessageRepository::new();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();

        let mut hello = Message::new(first, MessageAuthor::Customer, "hello").unwrap();
        repo.add_message(&hello).await.unwrap();
        repo.add_message(&Message::new(first, MessageAuthor::Admin, "hi").unwrap()).await.unwrap();
        repo.add_message(&Message::new(second, MessageAuthor::Admin, "other").unwrap()).await.unwrap();

        assert_eq!(repo.list_messages(first).await.unwrap().len(), 2);
        assert_eq!(repo.list_messages(second).await.unwrap().len(), 1);
        assert!(repo.list_messages(Uuid::new_v4()).await.unwrap().is_empty());

        hello.read = true;
        repo.update_messages(&[hello]).await.unwrap();
        assert!(repo.list_messages(first).await.unwrap()[0].read);
    }
}
