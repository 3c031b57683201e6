pub mod catalog;
pub mod pricing;
pub mod quote;

pub use catalog::{AddOn, CatalogError, CurrencySettings, DiscountBand, HostingTier, Package, PriceCatalog};
pub use pricing::{compute_hosting_quote, compute_quote, PricingEngine, QuoteError};
pub use quote::{HostingSelection, Quote, QuoteLineItem, QuoteRequest};
