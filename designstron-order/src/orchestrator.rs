use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use designstron_core::payment::{
    CheckoutGateway, CheckoutLine, CheckoutRequest, CheckoutSession, CheckoutStatus,
};
use designstron_core::{CoreError, CoreResult};
use designstron_shared::to_minor_units;
use tokio::sync::RwLock;

use crate::manager::OrderError;
use crate::models::{Order, OrderStatus};

/// Return addresses for the hosted checkout. `{order_id}` is substituted.
#[derive(Debug, Clone)]
pub struct CheckoutUrls {
    pub success_url: String,
    pub cancel_url: String,
}

impl CheckoutUrls {
    fn render(template: &str, order: &Order) -> String {
        template.replace("{order_id}", &order.id.to_string())
    }
}

pub struct PaymentOrchestrator {
    gateway: Arc<dyn CheckoutGateway>,
    urls: CheckoutUrls,
    precision: u32,
}

impl PaymentOrchestrator {
    /// `precision` is the catalog currency precision used to convert order
    /// amounts into the gateway's minor units.
    pub fn new(gateway: Arc<dyn CheckoutGateway>, urls: CheckoutUrls, precision: u32) -> Self {
        Self {
            gateway,
            urls,
            precision,
        }
    }

    /// Open a hosted checkout for an unpaid order.
    ///
    /// While the order's current checkout is still open it is handed out
    /// again, so an order never has two payable sessions at once.
    pub async fn start_checkout(&self, order: &Order) -> Result<CheckoutSession, OrderError> {
        if !matches!(order.status, OrderStatus::Pending | OrderStatus::AwaitingPayment) {
            return Err(OrderError::InvalidTransition {
                from: order.status,
                to: OrderStatus::AwaitingPayment,
            });
        }

        if let Some(session_id) = &order.payment_session_id {
            let existing = self.process_status_update(session_id).await?;
            if existing.status == CheckoutStatus::Open {
                tracing::info!("Reusing open checkout {} for order {}", existing.id, order.id);
                return Ok(existing);
            }
        }

        let lines = order
            .items
            .iter()
            .map(|item| -> Result<CheckoutLine, OrderError> {
                Ok(CheckoutLine {
                    name: item.name.clone(),
                    unit_amount: to_minor_units(item.unit_price, self.precision)?,
                    quantity: item.quantity,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let request = CheckoutRequest {
            order_id: order.id,
            customer_email: order.buyer.email.expose().clone(),
            lines,
            amount: to_minor_units(order.total, self.precision)?,
            currency: order.currency.clone(),
            success_url: CheckoutUrls::render(&self.urls.success_url, order),
            cancel_url: CheckoutUrls::render(&self.urls.cancel_url, order),
        };

        tracing::info!(
            "Opening checkout for order {}: {} {}",
            order.id,
            request.amount_major(self.precision),
            request.currency
        );

        self.gateway.create_checkout(request).await.map_err(|e| {
            tracing::error!("Checkout creation failed for order {}: {}", order.id, e);
            OrderError::Payment(e.to_string())
        })
    }

    /// Fetch the authoritative checkout state (e.g. on webhook delivery)
    pub async fn process_status_update(&self, session_id: &str) -> Result<CheckoutSession, OrderError> {
        self.gateway
            .get_checkout(session_id)
            .await
            .map_err(|e| OrderError::Payment(e.to_string()))
    }
}

/// In-process gateway standing in for the hosted payment provider.
///
/// Sessions start `Open`; [`MockCheckoutGateway::complete`] simulates the
/// customer finishing (or abandoning) the hosted page.
pub struct MockCheckoutGateway {
    base_url: String,
    sessions: RwLock<HashMap<String, CheckoutSession>>,
}

impl MockCheckoutGateway {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub async fn complete(&self, session_id: &str, status: CheckoutStatus) -> CoreResult<()> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(session_id)
            .ok_or_else(|| CoreError::PaymentError(format!("unknown checkout {}", session_id)))?;
        session.status = status;
        Ok(())
    }
}

#[async_trait::async_trait]
impl CheckoutGateway for MockCheckoutGateway {
    async fn create_checkout(&self, request: CheckoutRequest) -> CoreResult<CheckoutSession> {
        if request.amount <= 0 {
            return Err(CoreError::ValidationError(
                "checkout amount must be positive".to_string(),
            ));
        }

        let id = format!("cs_mock_{}", uuid::Uuid::new_v4().simple());
        let session = CheckoutSession {
            redirect_url: format!("{}/pay/{}", self.base_url.trim_end_matches('/'), id),
            id: id.clone(),
            order_id: request.order_id,
            amount: request.amount,
            currency: request.currency,
            status: CheckoutStatus::Open,
            created_at: Utc::now(),
        };

        self.sessions.write().await.insert(id, session.clone());
        Ok(session)
    }

    async fn get_checkout(&self, session_id: &str) -> CoreResult<CheckoutSession> {
        self.sessions
            .read()
            .await
            .get(session_id)
            .cloned()
            .ok_or_else(|| CoreError::PaymentError(format!("unknown checkout {}", session_id)))
    }
}
