use chrono::{DateTime, Utc};
use designstron_catalog::{Quote, QuoteRequest};
use designstron_shared::Masked;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::manager::OrderError;

/// Order status in the lifecycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Submitted from the summary step, not paid yet
    Pending,
    /// Customer was redirected to the hosted checkout
    AwaitingPayment,
    Paid,
    /// Agency is building the site
    InProgress,
    Completed,
    Cancelled,
}

impl OrderStatus {
    /// Allowed edges of the order state machine.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, AwaitingPayment)
                | (Pending, Cancelled)
                | (AwaitingPayment, AwaitingPayment)
                | (AwaitingPayment, Pending)
                | (AwaitingPayment, Paid)
                | (AwaitingPayment, Cancelled)
                | (Paid, InProgress)
                | (InProgress, Completed)
        )
    }

    pub fn is_paid(self) -> bool {
        matches!(self, OrderStatus::Paid | OrderStatus::InProgress | OrderStatus::Completed)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderKind {
    Website,
    /// Hosting bought later from the customer panel for a paid website order
    HostingExtension,
}

/// Contact and invoicing details collected at the buyer-data step
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BuyerData {
    pub full_name: String,
    pub email: Masked<String>,
    #[serde(default)]
    pub phone: Option<Masked<String>>,
    #[serde(default)]
    pub company: Option<String>,
    /// Polish tax id (NIP), required for company invoices
    #[serde(default)]
    pub tax_id: Option<String>,
}

impl BuyerData {
    pub fn new(full_name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            email: Masked::new(email.into()),
            phone: None,
            company: None,
            tax_id: None,
        }
    }

    pub fn validate(&self) -> Result<(), OrderError> {
        if self.full_name.trim().is_empty() {
            return Err(OrderError::InvalidBuyer("full name is required".to_string()));
        }

        let email = self.email.expose().trim();
        let valid_email = match email.split_once('@') {
            Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
            None => false,
        };
        if !valid_email {
            return Err(OrderError::InvalidBuyer("email address is invalid".to_string()));
        }

        if let Some(phone) = &self.phone {
            let digits = phone.expose().chars().filter(|c| c.is_ascii_digit()).count();
            if digits < 9 {
                return Err(OrderError::InvalidBuyer("phone number is too short".to_string()));
            }
        }

        if let Some(tax_id) = &self.tax_id {
            let digits: String = tax_id.chars().filter(|c| c.is_ascii_digit()).collect();
            if digits.len() != 10 {
                return Err(OrderError::InvalidBuyer("tax id must have 10 digits".to_string()));
            }
        }

        Ok(())
    }

    /// Orders are grouped per customer by normalized email.
    pub fn customer_id(&self) -> String {
        self.email.expose().trim().to_lowercase()
    }
}

/// A customer's order, created from the quote shown at the summary step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub kind: OrderKind,
    pub parent_order_id: Option<Uuid>,
    pub customer_id: String,
    pub buyer: BuyerData,
    /// The calculator input the order was priced from (website orders only)
    pub request: Option<QuoteRequest>,
    pub items: Vec<OrderItem>,
    pub total: Decimal,
    pub currency: String,
    pub status: OrderStatus,
    pub payment_session_id: Option<String>,
    /// Bumped on every stored change; guards concurrent updates
    #[serde(default)]
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Build an order whose items mirror the quote lines one to one.
    pub fn from_quote(
        kind: OrderKind,
        buyer: BuyerData,
        request: Option<QuoteRequest>,
        quote: &Quote,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            kind,
            parent_order_id: None,
            customer_id: buyer.customer_id(),
            buyer,
            request,
            items: quote
                .lines()
                .iter()
                .map(|line| OrderItem {
                    name: line.label.clone(),
                    description: line.description.clone(),
                    unit_price: line.unit_price,
                    quantity: line.quantity,
                    total_price: line.total_price(),
                })
                .collect(),
            total: quote.grand_total(),
            currency: quote.currency().to_string(),
            status: OrderStatus::Pending,
            payment_session_id: None,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_parent(mut self, parent_order_id: Uuid) -> Self {
        self.parent_order_id = Some(parent_order_id);
        self
    }

    /// Move to `next`, rejecting edges the state machine does not allow.
    pub fn transition(&mut self, next: OrderStatus) -> Result<(), OrderError> {
        if !self.status.can_transition_to(next) {
            return Err(OrderError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }
}

/// One priced entry of an order, persisted as-is from the quote
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderItem {
    pub name: String,
    pub description: Option<String>,
    pub unit_price: Decimal,
    pub quantity: u32,
    pub total_price: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_machine() {
        use OrderStatus::*;
        assert!(Pending.can_transition_to(AwaitingPayment));
        assert!(AwaitingPayment.can_transition_to(Paid));
        assert!(Paid.can_transition_to(InProgress));
        assert!(InProgress.can_transition_to(Completed));

        assert!(!Pending.can_transition_to(Paid));
        assert!(!Paid.can_transition_to(Cancelled));
        assert!(!Completed.can_transition_to(InProgress));
        assert!(!Cancelled.can_transition_to(Pending));
    }

    #[test]
    fn test_buyer_validation() {
        assert!(BuyerData::new("Jan Kowalski", "jan@example.com").validate().is_ok());
        assert!(BuyerData::new(" ", "jan@example.com").validate().is_err());
        assert!(BuyerData::new("Jan", "jan.example.com").validate().is_err());
        assert!(BuyerData::new("Jan", "@example.com").validate().is_err());
        assert!(BuyerData::new("Jan", "jan@localhost").validate().is_err());

        let mut company = BuyerData::new("Jan", "jan@example.com");
        company.tax_id = Some("123-456-78-90".to_string());
        assert!(company.validate().is_ok());
        company.tax_id = Some("12345".to_string());
        assert!(company.validate().is_err());

        let mut with_phone = BuyerData::new("Jan", "jan@example.com");
        with_phone.phone = Some(Masked::new("+48 600 100 200".to_string()));
        assert!(with_phone.validate().is_ok());
        with_phone.phone = Some(Masked::new("600".to_string()));
        assert!(with_phone.validate().is_err());
    }

    #[test]
    fn test_customer_id_is_normalized() {
        let buyer = BuyerData::new("Jan", " Jan@Example.com ");
        assert_eq!(buyer.customer_id(), "jan@example.com");
    }

    #[test]
    fn test_buyer_debug_masks_contact() {
        let buyer = BuyerData::new("Jan", "jan@example.com");
        let debug = format!("{:?}", buyer);
        assert!(!debug.contains("jan@example.com"));
    }
}
