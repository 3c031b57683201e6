use std::sync::Arc;

use designstron_catalog::{HostingSelection, PricingEngine, QuoteError, QuoteRequest};
use designstron_core::payment::{CheckoutSession, CheckoutStatus};
use designstron_shared::MoneyError;
use uuid::Uuid;

use crate::models::{BuyerData, Order, OrderKind, OrderStatus};
use crate::repository::OrderRepository;

/// Places orders and drives their status changes.
///
/// Orders are always priced server-side: the quote a client saw is
/// recomputed from the submitted `QuoteRequest` before anything is stored.
pub struct OrderManager {
    pricing: PricingEngine,
    orders: Arc<dyn OrderRepository>,
}

impl OrderManager {
    pub fn new(pricing: PricingEngine, orders: Arc<dyn OrderRepository>) -> Self {
        Self { pricing, orders }
    }

    pub fn pricing(&self) -> &PricingEngine {
        &self.pricing
    }

    /// Create a website order from the summary step
    pub async fn place_order(&self, request: QuoteRequest, buyer: BuyerData) -> Result<Order, OrderError> {
        buyer.validate()?;
        let quote = self.pricing.quote(&request)?;

        let order = Order::from_quote(OrderKind::Website, buyer, Some(request), &quote);
        self.orders.create_order(&order).await.map_err(repo_error)?;

        tracing::info!(
            "Order {} placed: {} {} ({} items)",
            order.id,
            order.total,
            order.currency,
            order.items.len()
        );
        Ok(order)
    }

    /// Buy hosting for an already paid website order
    pub async fn place_hosting_extension(
        &self,
        parent_order_id: Uuid,
        hosting: HostingSelection,
    ) -> Result<Order, OrderError> {
        let parent = self.get_order(parent_order_id).await?;
        if parent.kind != OrderKind::Website || !parent.status.is_paid() {
            return Err(OrderError::ParentNotEligible(parent_order_id));
        }

        let quote = self.pricing.hosting_quote(&hosting)?;
        let order = Order::from_quote(OrderKind::HostingExtension, parent.buyer.clone(), None, &quote)
            .with_parent(parent_order_id);
        self.orders.create_order(&order).await.map_err(repo_error)?;

        tracing::info!(
            "Hosting extension {} placed for order {}: {} {}",
            order.id,
            parent_order_id,
            order.total,
            order.currency
        );
        Ok(order)
    }

    pub async fn get_order(&self, order_id: Uuid) -> Result<Order, OrderError> {
        self.orders
            .get_order(order_id)
            .await
            .map_err(repo_error)?
            .ok_or(OrderError::NotFound(order_id))
    }

    pub async fn list_orders(&self, customer_id: &str) -> Result<Vec<Order>, OrderError> {
        let customer_id = customer_id.trim().to_lowercase();
        self.orders.list_orders(&customer_id).await.map_err(repo_error)
    }

    pub async fn list_by_status(&self, status: OrderStatus) -> Result<Vec<Order>, OrderError> {
        self.orders.list_by_status(status).await.map_err(repo_error)
    }

    /// Manual status change from the admin panel.
    ///
    /// An order with an open checkout cannot be cancelled by hand: the
    /// customer may still pay on it, and only the payment webhook settles it.
    pub async fn transition(&self, order_id: Uuid, next: OrderStatus) -> Result<Order, OrderError> {
        let mut order = self.get_order(order_id).await?;
        let previous = order.status;
        if previous == OrderStatus::AwaitingPayment && next == OrderStatus::Cancelled {
            return Err(OrderError::PaymentInProgress(order_id));
        }
        order.transition(next)?;
        self.save(&mut order).await?;

        tracing::info!("Order {} moved {:?} -> {:?}", order_id, previous, next);
        Ok(order)
    }

    /// Record the checkout the customer is being redirected to
    pub async fn attach_checkout(&self, order_id: Uuid, session: &CheckoutSession) -> Result<Order, OrderError> {
        let mut order = self.get_order(order_id).await?;
        order.transition(OrderStatus::AwaitingPayment)?;
        order.payment_session_id = Some(session.id.clone());
        self.save(&mut order).await?;
        Ok(order)
    }

    /// Reflect the gateway's view of a checkout onto its order.
    ///
    /// The order is resolved through the session's own `order_id`, so a
    /// payment on any session the gateway opened for the order is seen. A
    /// successful payment that cannot be applied is an error, never dropped.
    pub async fn apply_payment_status(&self, session: &CheckoutSession) -> Result<Order, OrderError> {
        let mut order = self.get_order(session.order_id).await?;
        let current = order.payment_session_id.as_deref() == Some(session.id.as_str());

        let next = match (order.status, session.status) {
            (OrderStatus::AwaitingPayment, CheckoutStatus::Succeeded) => OrderStatus::Paid,
            // Redelivered webhook
            (status, CheckoutStatus::Succeeded) if status.is_paid() && current => return Ok(order),
            (status, CheckoutStatus::Succeeded) => {
                tracing::error!(
                    "Payment {} succeeded for order {} in status {:?}; refund required",
                    session.id,
                    order.id,
                    status
                );
                return Err(OrderError::UnexpectedPayment {
                    order_id: order.id,
                    status,
                });
            }
            (OrderStatus::AwaitingPayment, _) if !current => {
                tracing::warn!(
                    "Ignoring {:?} of superseded checkout {} for order {}",
                    session.status,
                    session.id,
                    order.id
                );
                return Ok(order);
            }
            (OrderStatus::AwaitingPayment, CheckoutStatus::Open) => return Ok(order),
            (OrderStatus::AwaitingPayment, CheckoutStatus::Canceled) => OrderStatus::Cancelled,
            // The customer may retry with a fresh checkout
            (OrderStatus::AwaitingPayment, CheckoutStatus::Failed | CheckoutStatus::Expired) => {
                OrderStatus::Pending
            }
            (status, _) => {
                tracing::warn!(
                    "Ignoring payment status {:?} for order {} in status {:?}",
                    session.status,
                    order.id,
                    status
                );
                return Ok(order);
            }
        };

        order.transition(next)?;
        match next {
            OrderStatus::Pending => order.payment_session_id = None,
            OrderStatus::Paid => order.payment_session_id = Some(session.id.clone()),
            _ => {}
        }
        self.save(&mut order).await?;

        tracing::info!("Order {} is now {:?} after payment {:?}", order.id, next, session.status);
        Ok(order)
    }

    /// Write back a modified order unless someone else changed it since it
    /// was read.
    async fn save(&self, order: &mut Order) -> Result<(), OrderError> {
        let expected = order.version;
        order.version += 1;
        let stored = self
            .orders
            .update_order(order, expected)
            .await
            .map_err(repo_error)?;
        if !stored {
            return Err(OrderError::ConcurrentUpdate(order.id));
        }
        Ok(())
    }
}

fn repo_error(err: Box<dyn std::error::Error + Send + Sync>) -> OrderError {
    OrderError::Repository(err.to_string())
}

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Order not found: {0}")]
    NotFound(Uuid),

    #[error("Invalid state transition from {from:?} to {to:?}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("Order {0} is not a paid website order")]
    ParentNotEligible(Uuid),

    #[error("Order {0} has an open checkout")]
    PaymentInProgress(Uuid),

    #[error("Payment received for order {order_id} in status {status:?}")]
    UnexpectedPayment { order_id: Uuid, status: OrderStatus },

    #[error("Order {0} was modified concurrently")]
    ConcurrentUpdate(Uuid),

    #[error(transparent)]
    Quote(#[from] QuoteError),

    #[error("Invalid buyer data: {0}")]
    InvalidBuyer(String),

    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    #[error("Payment failed: {0}")]
    Payment(String),

    #[error(transparent)]
    Money(#[from] MoneyError),

    #[error("Repository error: {0}")]
    Repository(String),
}
