use std::sync::Arc;

use designstron_catalog::{CatalogError, PriceCatalog, PricingEngine};
use designstron_core::payment::CheckoutGateway;
use designstron_order::{
    CheckoutUrls, DraftRepository, MessageBoard, OrderManager, OrderRepository, PaymentOrchestrator,
};
use designstron_store::{MemoryDraftRepository, MemoryMessageRepository, MemoryOrderRepository};

use crate::middleware::resiliency::Resiliency;

#[derive(Clone)]
pub struct AppState {
    pub pricing: PricingEngine,
    pub orders: Arc<OrderManager>,
    pub payments: Arc<PaymentOrchestrator>,
    pub messages: Arc<MessageBoard>,
    pub drafts: Arc<dyn DraftRepository>,
    pub resiliency: Arc<Resiliency>,
}

impl AppState {
    /// Wire every service on top of the in-memory repositories.
    pub fn in_memory(
        catalog: PriceCatalog,
        gateway: Arc<dyn CheckoutGateway>,
        urls: CheckoutUrls,
    ) -> Result<Self, CatalogError> {
        let precision = catalog.currency.precision;
        let pricing = PricingEngine::new(catalog)?;

        let order_repo: Arc<dyn OrderRepository> = Arc::new(MemoryOrderRepository::new());

        Ok(Self {
            orders: Arc::new(OrderManager::new(pricing.clone(), order_repo.clone())),
            payments: Arc::new(PaymentOrchestrator::new(gateway, urls, precision)),
            messages: Arc::new(MessageBoard::new(
                Arc::new(MemoryMessageRepository::new()),
                order_repo,
            )),
            drafts: Arc::new(MemoryDraftRepository::new()),
            resiliency: Arc::new(Resiliency::default()),
            pricing,
        })
    }
}
