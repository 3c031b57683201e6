use designstron_catalog::{HostingSelection, PricingEngine, Quote, QuoteError, QuoteRequest};
use serde::{Deserialize, Serialize};

use crate::manager::OrderError;
use crate::models::BuyerData;

/// Steps of the ordering flow in the customer panel
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WizardStep {
    Form,
    BuyerData,
    Hosting,
    Summary,
    Payment,
}

impl WizardStep {
    fn next(self) -> Option<WizardStep> {
        match self {
            WizardStep::Form => Some(WizardStep::BuyerData),
            WizardStep::BuyerData => Some(WizardStep::Hosting),
            WizardStep::Hosting => Some(WizardStep::Summary),
            WizardStep::Summary => Some(WizardStep::Payment),
            WizardStep::Payment => None,
        }
    }

    fn previous(self) -> Option<WizardStep> {
        match self {
            WizardStep::Form => None,
            WizardStep::BuyerData => Some(WizardStep::Form),
            WizardStep::Hosting => Some(WizardStep::BuyerData),
            WizardStep::Summary => Some(WizardStep::Hosting),
            WizardStep::Payment => Some(WizardStep::Summary),
        }
    }
}

/// What the summary step hands to order submission
#[derive(Debug, Clone)]
pub struct OrderSubmission {
    pub request: QuoteRequest,
    pub buyer: BuyerData,
    pub quote: Quote,
}

/// Step machine of the ordering flow.
///
/// Steps only assemble the `QuoteRequest` and buyer data; every edit asks
/// the pricing engine for a fresh quote. A rejected edit keeps the last
/// valid quote around so the UI can keep showing it.
pub struct OrderWizard {
    pricing: PricingEngine,
    step: WizardStep,
    request: QuoteRequest,
    buyer: Option<BuyerData>,
    quote: Option<Quote>,
}

impl OrderWizard {
    /// Start at the form step, e.g. from an autosaved draft
    pub fn new(pricing: PricingEngine, request: QuoteRequest) -> Self {
        let quote = pricing.quote(&request).ok();
        Self {
            pricing,
            step: WizardStep::Form,
            request,
            buyer: None,
            quote,
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    /// Current input, the value autosaved as a draft
    pub fn request(&self) -> &QuoteRequest {
        &self.request
    }

    pub fn buyer(&self) -> Option<&BuyerData> {
        self.buyer.as_ref()
    }

    /// Last successfully computed quote
    pub fn quote(&self) -> Option<&Quote> {
        self.quote.as_ref()
    }

    /// Switching package keeps the page count; extra pages are recomputed
    /// against the new package.
    pub fn set_package(&mut self, package_id: impl Into<String>) -> Result<&Quote, WizardError> {
        self.edit(|request| request.package_id = package_id.into())
    }

    pub fn set_page_count(&mut self, page_count: i64) -> Result<&Quote, WizardError> {
        self.edit(|request| request.page_count = page_count)
    }

    /// Select an add-on, or drop it when already selected
    pub fn toggle_add_on(&mut self, add_on_id: &str) -> Result<&Quote, WizardError> {
        self.edit(|request| {
            if request.selected_add_ons.iter().any(|id| id == add_on_id) {
                request.selected_add_ons.retain(|id| id != add_on_id);
            } else {
                request.selected_add_ons.push(add_on_id.to_string());
            }
        })
    }

    /// `None` means the customer decides on hosting later
    pub fn set_hosting(&mut self, hosting: Option<HostingSelection>) -> Result<&Quote, WizardError> {
        self.edit(|request| request.hosting = hosting)
    }

    pub fn set_buyer(&mut self, buyer: BuyerData) -> Result<(), WizardError> {
        self.ensure_editable()?;
        buyer.validate().map_err(WizardError::from_buyer)?;
        self.buyer = Some(buyer);
        Ok(())
    }

    /// Move forward, checking what the current step is responsible for
    pub fn advance(&mut self) -> Result<WizardStep, WizardError> {
        match self.step {
            WizardStep::Form | WizardStep::Hosting => {
                self.refresh()?;
            }
            WizardStep::BuyerData => {
                let buyer = self.buyer.as_ref().ok_or(WizardError::NotReady("buyer data"))?;
                buyer.validate().map_err(WizardError::from_buyer)?;
            }
            WizardStep::Summary => return Err(WizardError::NotReady("submit the summary to pay")),
            WizardStep::Payment => return Err(WizardError::AtLastStep),
        }

        // Form, BuyerData and Hosting always have a successor
        if let Some(next) = self.step.next() {
            self.step = next;
        }
        Ok(self.step)
    }

    pub fn back(&mut self) -> Result<WizardStep, WizardError> {
        if self.step == WizardStep::Payment {
            return Err(WizardError::Locked);
        }
        self.step = self.step.previous().ok_or(WizardError::AtFirstStep)?;
        Ok(self.step)
    }

    /// Finish the summary step: re-price and hand everything to order
    /// submission. The wizard is locked afterwards.
    pub fn submit(&mut self) -> Result<OrderSubmission, WizardError> {
        if self.step != WizardStep::Summary {
            return Err(WizardError::WrongStep {
                expected: WizardStep::Summary,
                actual: self.step,
            });
        }

        let buyer = self.buyer.clone().ok_or(WizardError::NotReady("buyer data"))?;
        let quote = self.refresh()?.clone();
        self.step = WizardStep::Payment;

        Ok(OrderSubmission {
            request: self.request.clone(),
            buyer,
            quote,
        })
    }

    fn edit(&mut self, apply: impl FnOnce(&mut QuoteRequest)) -> Result<&Quote, WizardError> {
        self.ensure_editable()?;
        apply(&mut self.request);
        self.refresh()
    }

    fn refresh(&mut self) -> Result<&Quote, WizardError> {
        let quote = self.pricing.quote(&self.request)?;
        Ok(self.quote.insert(quote))
    }

    fn ensure_editable(&self) -> Result<(), WizardError> {
        if self.step == WizardStep::Payment {
            return Err(WizardError::Locked);
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    #[error(transparent)]
    Quote(#[from] QuoteError),

    #[error("Invalid buyer data: {0}")]
    InvalidBuyer(String),

    #[error("Missing {0}")]
    NotReady(&'static str),

    #[error("Already at the first step")]
    AtFirstStep,

    #[error("Already at the last step")]
    AtLastStep,

    #[error("Order was submitted; the wizard is locked")]
    Locked,

    #[error("Expected step {expected:?}, wizard is at {actual:?}")]
    WrongStep { expected: WizardStep, actual: WizardStep },
}

impl WizardError {
    fn from_buyer(err: OrderError) -> Self {
        match err {
            OrderError::InvalidBuyer(msg) => WizardError::InvalidBuyer(msg),
            other => WizardError::InvalidBuyer(other.to_string()),
        }
    }
}
