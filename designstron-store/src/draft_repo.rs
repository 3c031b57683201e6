use async_trait::async_trait;
use designstron_catalog::QuoteRequest;
use designstron_order::{DraftRepository, RepoResult};
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::StoreError;

pub const MAX_DRAFT_KEY_LEN: usize = 128;

/// Autosaved calculator drafts, stored serialized like browser local storage
#[derive(Default)]
pub struct MemoryDraftRepository {
    drafts: RwLock<HashMap<String, String>>,
}

impl MemoryDraftRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn check_key(key: &str) -> Result<(), StoreError> {
    if key.is_empty() || key.len() > MAX_DRAFT_KEY_LEN {
        return Err(StoreError::InvalidKey(key.to_string()));
    }
    Ok(())
}

#[async_trait]
impl DraftRepository for MemoryDraftRepository {
    async fn save_draft(&self, key: &str, request: &QuoteRequest) -> RepoResult<()> {
        check_key(key)?;
        let payload = serde_json::to_string(request).map_err(StoreError::Serialization)?;
        self.drafts.write().await.insert(key.to_string(), payload);
        Ok(())
    }

    async fn load_draft(&self, key: &str) -> RepoResult<Option<QuoteRequest>> {
        check_key(key)?;
        let drafts = self.drafts.read().await;
        match drafts.get(key) {
            Some(payload) => {
                let request = serde_json::from_str(payload).map_err(StoreError::Serialization)?;
                Ok(Some(request))
            }
            None => Ok(None),
        }
    }

    async fn delete_draft(&self, key: &str) -> RepoResult<bool> {
        check_key(key)?;
        Ok(self.drafts.write().await.remove(key).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use designstron_catalog::HostingSelection;

    #[tokio::test]
    async fn test_draft_roundtrip() {
        let repo = MemoryDraftRepository::new();
        let request = QuoteRequest::new("basic", 7)
            .with_add_on("seo")
            .with_hosting(HostingSelection {
                tier_id: "premium".to_string(),
                period_months: 12,
                ssl: true,
            });

        assert!(repo.load_draft("browser-1").await.unwrap().is_none());
        repo.save_draft("browser-1", &request).await.unwrap();
        assert_eq!(repo.load_draft("browser-1").await.unwrap(), Some(request));

        assert!(repo.delete_draft("browser-1").await.unwrap());
        assert!(!repo.delete_draft("browser-1").await.unwrap());
    }

    #[tokio::test]
    async fn test_rejects_bad_keys() {
        let repo = MemoryDraftRepository::new();
        let request = QuoteRequest::new("basic", 5);
        assert!(repo.save_draft("", &request).await.is_err());
        assert!(repo.save_draft(&"k".repeat(MAX_DRAFT_KEY_LEN + 1), &request).await.is_err());
    }
}
