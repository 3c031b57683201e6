use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::CoreResult;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckoutStatus {
    /// Customer has been sent to the hosted page but has not paid yet
    Open,
    Succeeded,
    Canceled,
    Failed,
    Expired,
}

/// Line shown on the hosted checkout page, in minor units.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CheckoutLine {
    pub name: String,
    pub unit_amount: i64,
    pub quantity: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub order_id: Uuid,
    pub customer_email: String,
    pub lines: Vec<CheckoutLine>,
    /// Amount to charge in minor units
    pub amount: i64,
    pub currency: String,
    pub success_url: String,
    pub cancel_url: String,
}

impl CheckoutRequest {
    /// Major-unit view of `amount`, for logs and receipts.
    pub fn amount_major(&self, precision: u32) -> Decimal {
        designstron_shared::money::from_minor_units(self.amount, precision)
    }
}

/// Hosted checkout created by the payment provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    pub order_id: Uuid,
    pub amount: i64,
    pub currency: String,
    pub status: CheckoutStatus,
    /// Where the customer is redirected to pay
    pub redirect_url: String,
    pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait CheckoutGateway: Send + Sync {
    /// Open a hosted checkout for an order
    async fn create_checkout(&self, request: CheckoutRequest) -> CoreResult<CheckoutSession>;

    /// Retrieve the current state of a checkout (e.g. after a webhook)
    async fn get_checkout(&self, session_id: &str) -> CoreResult<CheckoutSession>;
}
