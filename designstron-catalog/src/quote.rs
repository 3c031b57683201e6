use rust_decimal::Decimal;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

/// Hosting chosen alongside the website. Absent means "decide later".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostingSelection {
    pub tier_id: String,
    pub period_months: u32,
    #[serde(default)]
    pub ssl: bool,
}

/// Calculator input, rebuilt by the caller on every change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteRequest {
    pub package_id: String,
    pub page_count: i64,
    #[serde(default)]
    pub selected_add_ons: Vec<String>,
    #[serde(default)]
    pub hosting: Option<HostingSelection>,
}

impl QuoteRequest {
    pub fn new(package_id: impl Into<String>, page_count: i64) -> Self {
        Self {
            package_id: package_id.into(),
            page_count,
            selected_add_ons: Vec::new(),
            hosting: None,
        }
    }

    pub fn with_add_on(mut self, add_on_id: impl Into<String>) -> Self {
        self.selected_add_ons.push(add_on_id.into());
        self
    }

    pub fn with_hosting(mut self, hosting: HostingSelection) -> Self {
        self.hosting = Some(hosting);
        self
    }
}

/// One priced entry of a quote.
///
/// The line total is derived from `unit_price * quantity` every time it is
/// read; it is never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteLineItem {
    pub label: String,
    pub description: Option<String>,
    pub unit_price: Decimal,
    pub quantity: u32,
}

impl QuoteLineItem {
    pub fn new(label: impl Into<String>, unit_price: Decimal, quantity: u32) -> Self {
        Self {
            label: label.into(),
            description: None,
            unit_price,
            quantity,
        }
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    pub fn total_price(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

impl Serialize for QuoteLineItem {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("QuoteLineItem", 5)?;
        state.serialize_field("label", &self.label)?;
        state.serialize_field("description", &self.description)?;
        state.serialize_field("unit_price", &self.unit_price)?;
        state.serialize_field("quantity", &self.quantity)?;
        state.serialize_field("total_price", &self.total_price())?;
        state.end()
    }
}

/// Itemized result of one calculator call. Immutable: any input change
/// produces a new quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Quote {
    lines: Vec<QuoteLineItem>,
    grand_total: Decimal,
    currency: String,
}

impl Quote {
    pub(crate) fn new(lines: Vec<QuoteLineItem>, grand_total: Decimal, currency: String) -> Self {
        Self {
            lines,
            grand_total,
            currency,
        }
    }

    pub fn lines(&self) -> &[QuoteLineItem] {
        &self.lines
    }

    pub fn grand_total(&self) -> Decimal {
        self.grand_total
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }
}
