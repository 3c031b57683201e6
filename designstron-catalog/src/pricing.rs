use std::sync::Arc;

use indexmap::IndexSet;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::catalog::{CatalogError, PriceCatalog};
use crate::quote::{HostingSelection, Quote, QuoteLineItem, QuoteRequest};

pub const MIN_HOSTING_MONTHS: u32 = 1;
pub const MAX_HOSTING_MONTHS: u32 = 24;

pub const EXTRA_PAGES_LABEL: &str = "Extra pages";
pub const SSL_LABEL: &str = "SSL certificate";

/// Validation failures of a quote request. None of them is transient: the
/// caller fixes the input and asks again.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuoteError {
    #[error("Unknown package: {0}")]
    InvalidPackage(String),

    #[error("Unknown add-on: {0}")]
    InvalidAddOn(String),

    #[error("Unknown hosting tier: {0}")]
    InvalidHostingTier(String),

    #[error("Hosting period must be between 1 and 24 months, got {0}")]
    InvalidPeriod(u32),

    #[error("Page count must be a positive integer, got {0}")]
    InvalidPageCount(String),
}

impl QuoteError {
    /// Stable machine-readable code for API clients.
    pub fn kind(&self) -> &'static str {
        match self {
            QuoteError::InvalidPackage(_) => "INVALID_PACKAGE",
            QuoteError::InvalidAddOn(_) => "INVALID_ADD_ON",
            QuoteError::InvalidHostingTier(_) => "INVALID_HOSTING_TIER",
            QuoteError::InvalidPeriod(_) => "INVALID_PERIOD",
            QuoteError::InvalidPageCount(_) => "INVALID_PAGE_COUNT",
        }
    }
}

/// Price a website order.
///
/// Lines come out as: package, extra pages (only above the package's
/// included pages), add-ons in selection order with duplicates dropped,
/// hosting, SSL. The grand total is the rounded sum of the line totals.
pub fn compute_quote(catalog: &PriceCatalog, request: &QuoteRequest) -> Result<Quote, QuoteError> {
    if request.page_count < 1 {
        return Err(QuoteError::InvalidPageCount(request.page_count.to_string()));
    }

    let package = catalog
        .packages
        .get(&request.package_id)
        .ok_or_else(|| QuoteError::InvalidPackage(request.package_id.clone()))?;

    let mut lines = Vec::with_capacity(2 + request.selected_add_ons.len() + 2);

    let package_description = package
        .description
        .clone()
        .unwrap_or_else(|| format!("Up to {} pages included", package.included_pages));
    lines.push(
        QuoteLineItem::new(package.name.clone(), package.base_price, 1)
            .with_description(Some(package_description)),
    );

    // A smaller page count than the package includes is never refunded.
    let extra_pages = request.page_count - i64::from(package.included_pages);
    if extra_pages > 0 {
        let quantity = u32::try_from(extra_pages)
            .map_err(|_| QuoteError::InvalidPageCount(request.page_count.to_string()))?;
        lines.push(QuoteLineItem::new(EXTRA_PAGES_LABEL, catalog.extra_page_price, quantity));
    }

    let add_on_ids: IndexSet<&str> = request
        .selected_add_ons
        .iter()
        .map(String::as_str)
        .collect();
    for id in add_on_ids {
        let add_on = catalog
            .add_ons
            .get(id)
            .ok_or_else(|| QuoteError::InvalidAddOn(id.to_string()))?;
        lines.push(
            QuoteLineItem::new(add_on.name.clone(), add_on.price, 1)
                .with_description(add_on.description.clone()),
        );
    }

    if let Some(hosting) = &request.hosting {
        push_hosting_lines(catalog, hosting, &mut lines)?;
    }

    Ok(finish(catalog, lines))
}

/// Price hosting on its own, e.g. extending hosting on an existing order.
pub fn compute_hosting_quote(
    catalog: &PriceCatalog,
    hosting: &HostingSelection,
) -> Result<Quote, QuoteError> {
    let mut lines = Vec::with_capacity(2);
    push_hosting_lines(catalog, hosting, &mut lines)?;
    Ok(finish(catalog, lines))
}

fn push_hosting_lines(
    catalog: &PriceCatalog,
    hosting: &HostingSelection,
    lines: &mut Vec<QuoteLineItem>,
) -> Result<(), QuoteError> {
    let tier = catalog
        .hosting_tiers
        .get(&hosting.tier_id)
        .ok_or_else(|| QuoteError::InvalidHostingTier(hosting.tier_id.clone()))?;

    let months = hosting.period_months;
    if !(MIN_HOSTING_MONTHS..=MAX_HOSTING_MONTHS).contains(&months) {
        return Err(QuoteError::InvalidPeriod(months));
    }

    let discount = catalog.hosting_discount(months);
    let gross = tier.monthly_price * Decimal::from(months);
    let price = round_money(gross * (Decimal::ONE - discount), catalog.currency.precision);

    let label = format!(
        "Hosting {} ({} mo, -{}%)",
        tier.name,
        months,
        (discount * Decimal::ONE_HUNDRED).normalize()
    );
    lines.push(QuoteLineItem::new(label, price, 1));

    if hosting.ssl {
        lines.push(QuoteLineItem::new(SSL_LABEL, catalog.ssl_one_time_price, 1));
    }

    Ok(())
}

fn finish(catalog: &PriceCatalog, lines: Vec<QuoteLineItem>) -> Quote {
    // Sum first, round once.
    let sum: Decimal = lines.iter().map(QuoteLineItem::total_price).sum();
    let grand_total = round_money(sum, catalog.currency.precision);
    Quote::new(lines, grand_total, catalog.currency.code.clone())
}

/// Round half-up (away from zero) to the currency precision.
pub fn round_money(amount: Decimal, precision: u32) -> Decimal {
    amount.round_dp_with_strategy(precision, RoundingStrategy::MidpointAwayFromZero)
}

/// Shared, read-only handle on a validated catalog.
#[derive(Debug, Clone)]
pub struct PricingEngine {
    catalog: Arc<PriceCatalog>,
}

impl PricingEngine {
    pub fn new(catalog: PriceCatalog) -> Result<Self, CatalogError> {
        catalog.validate()?;
        Ok(Self {
            catalog: Arc::new(catalog),
        })
    }

    pub fn catalog(&self) -> &PriceCatalog {
        &self.catalog
    }

    pub fn quote(&self, request: &QuoteRequest) -> Result<Quote, QuoteError> {
        compute_quote(&self.catalog, request)
    }

    pub fn hosting_quote(&self, hosting: &HostingSelection) -> Result<Quote, QuoteError> {
        compute_hosting_quote(&self.catalog, hosting)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fixtures;
    use rust_decimal_macros::dec;

    fn hosting(tier_id: &str, period_months: u32, ssl: bool) -> HostingSelection {
        HostingSelection {
            tier_id: tier_id.to_string(),
            period_months,
            ssl,
        }
    }

    fn assert_total_matches_lines(quote: &Quote) {
        let sum: Decimal = quote.lines().iter().map(|l| l.total_price()).sum();
        assert_eq!(quote.grand_total(), sum);
    }

    #[test]
    fn test_basic_with_extra_pages_and_seo() {
        let catalog = fixtures::catalog();
        let request = QuoteRequest::new("basic", 7).with_add_on("seo");

        let quote = compute_quote(&catalog, &request).unwrap();
        let lines = quote.lines();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].label, "Basic");
        assert_eq!((lines[0].unit_price, lines[0].quantity), (dec!(1500), 1));
        assert_eq!(lines[0].total_price(), dec!(1500));
        assert_eq!(lines[1].label, EXTRA_PAGES_LABEL);
        assert_eq!((lines[1].unit_price, lines[1].quantity), (dec!(200), 2));
        assert_eq!(lines[1].total_price(), dec!(400));
        assert_eq!(lines[2].label, "SEO");
        assert_eq!(lines[2].total_price(), dec!(800));

        assert_eq!(quote.grand_total(), dec!(2700));
        assert_eq!(quote.currency(), "PLN");
        assert_total_matches_lines(&quote);
    }

    #[test]
    fn test_premium_hosting_with_ssl() {
        let catalog = fixtures::catalog();
        let request = QuoteRequest::new("basic", 5).with_hosting(hosting("premium", 12, true));

        let quote = compute_quote(&catalog, &request).unwrap();
        let lines = quote.lines();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1].label, "Hosting Premium (12 mo, -15%)");
        assert_eq!(lines[1].total_price(), dec!(4080));
        assert_eq!(lines[2].label, SSL_LABEL);
        assert_eq!(lines[2].total_price(), dec!(100));
        assert_eq!(quote.grand_total(), dec!(1500) + dec!(4180));
    }

    #[test]
    fn test_package_line_only() {
        let catalog = fixtures::catalog();
        let quote = compute_quote(&catalog, &QuoteRequest::new("basic", 3)).unwrap();

        assert_eq!(quote.lines().len(), 1);
        assert_eq!(
            quote.lines()[0].description.as_deref(),
            Some("Up to 5 pages included")
        );
        assert_eq!(quote.grand_total(), dec!(1500));
    }

    #[test]
    fn test_no_extra_pages_up_to_included() {
        let catalog = fixtures::catalog();
        for page_count in 1..=5 {
            let quote = compute_quote(&catalog, &QuoteRequest::new("basic", page_count)).unwrap();
            assert!(quote.lines().iter().all(|l| l.label != EXTRA_PAGES_LABEL));
        }
    }

    #[test]
    fn test_extra_pages_quantity() {
        let catalog = fixtures::catalog();
        for k in 1..=20 {
            let quote = compute_quote(&catalog, &QuoteRequest::new("basic", 5 + k)).unwrap();
            let extra = quote
                .lines()
                .iter()
                .find(|l| l.label == EXTRA_PAGES_LABEL)
                .unwrap();
            assert_eq!(i64::from(extra.quantity), k);
            assert_eq!(extra.unit_price, catalog.extra_page_price);
        }
    }

    #[test]
    fn test_page_count_is_monotonic() {
        let catalog = fixtures::catalog();
        let mut previous = Decimal::ZERO;
        for page_count in 1..=40 {
            let request = QuoteRequest::new("professional", page_count)
                .with_add_on("blog")
                .with_hosting(hosting("basic", 7, false));
            let total = compute_quote(&catalog, &request).unwrap().grand_total();
            assert!(total >= previous);
            previous = total;
        }
    }

    #[test]
    fn test_idempotent() {
        let catalog = fixtures::catalog();
        let request = QuoteRequest::new("professional", 14)
            .with_add_on("seo")
            .with_add_on("blog")
            .with_hosting(hosting("basic", 5, true));

        let first = compute_quote(&catalog, &request).unwrap();
        let second = compute_quote(&catalog, &request).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_discount_boundaries_in_labels() {
        let catalog = fixtures::catalog();
        let cases = [(2, "-0%"), (3, "-5%"), (11, "-10%"), (12, "-15%")];

        for (months, suffix) in cases {
            let quote = compute_hosting_quote(&catalog, &hosting("premium", months, false)).unwrap();
            let line = &quote.lines()[0];
            assert!(line.label.ends_with(&format!("{})", suffix)), "{}", line.label);
        }

        let eleven = compute_hosting_quote(&catalog, &hosting("premium", 11, false)).unwrap();
        assert_eq!(eleven.grand_total(), dec!(3960));
        let two = compute_hosting_quote(&catalog, &hosting("premium", 2, false)).unwrap();
        assert_eq!(two.grand_total(), dec!(800));
    }

    #[test]
    fn test_hosting_rounds_half_up() {
        let catalog = fixtures::catalog();
        // 19.99 * 3 * 0.95 = 56.9715
        let quote = compute_hosting_quote(&catalog, &hosting("basic", 3, false)).unwrap();
        assert_eq!(quote.grand_total(), dec!(56.97));

        // 19.99 * 7 * 0.90 = 125.937
        let quote = compute_hosting_quote(&catalog, &hosting("basic", 7, false)).unwrap();
        assert_eq!(quote.grand_total(), dec!(125.94));
        assert_total_matches_lines(&quote);
    }

    #[test]
    fn test_duplicate_add_ons_collapse() {
        let catalog = fixtures::catalog();
        let once = QuoteRequest::new("basic", 7).with_add_on("seo");
        let twice = once.clone().with_add_on("seo");

        assert_eq!(
            compute_quote(&catalog, &once).unwrap(),
            compute_quote(&catalog, &twice).unwrap()
        );
    }

    #[test]
    fn test_add_ons_keep_selection_order() {
        let catalog = fixtures::catalog();
        let request = QuoteRequest::new("basic", 1)
            .with_add_on("blog")
            .with_add_on("seo")
            .with_add_on("blog");

        let labels: Vec<_> = compute_quote(&catalog, &request)
            .unwrap()
            .lines()
            .iter()
            .map(|l| l.label.clone())
            .collect();
        assert_eq!(labels, vec!["Basic", "Blog", "SEO"]);
    }

    #[test]
    fn test_package_change_recomputes_extra_pages() {
        let catalog = fixtures::catalog();
        let on_professional = QuoteRequest::new("professional", 8);
        let quote = compute_quote(&catalog, &on_professional).unwrap();
        assert_eq!(quote.lines().len(), 1);

        let downgraded = QuoteRequest {
            package_id: "basic".to_string(),
            ..on_professional
        };
        let quote = compute_quote(&catalog, &downgraded).unwrap();
        assert_eq!(quote.lines()[1].quantity, 3);
    }

    #[test]
    fn test_unknown_identifiers_fail() {
        let catalog = fixtures::catalog();

        let err = compute_quote(&catalog, &QuoteRequest::new("enterprise", 5)).unwrap_err();
        assert_eq!(err, QuoteError::InvalidPackage("enterprise".to_string()));

        let err = compute_quote(&catalog, &QuoteRequest::new("basic", 5).with_add_on("crm"))
            .unwrap_err();
        assert_eq!(err, QuoteError::InvalidAddOn("crm".to_string()));
        assert_eq!(err.kind(), "INVALID_ADD_ON");

        let request = QuoteRequest::new("basic", 5).with_hosting(hosting("gold", 12, false));
        let err = compute_quote(&catalog, &request).unwrap_err();
        assert_eq!(err, QuoteError::InvalidHostingTier("gold".to_string()));
    }

    #[test]
    fn test_invalid_period() {
        let catalog = fixtures::catalog();
        for months in [0, 25, 36] {
            let err = compute_hosting_quote(&catalog, &hosting("basic", months, false)).unwrap_err();
            assert_eq!(err, QuoteError::InvalidPeriod(months));
        }
        assert!(compute_hosting_quote(&catalog, &hosting("basic", 24, false)).is_ok());
        assert!(compute_hosting_quote(&catalog, &hosting("basic", 1, false)).is_ok());
    }

    #[test]
    fn test_invalid_page_count() {
        let catalog = fixtures::catalog();
        for page_count in [0, -1, -50] {
            let err = compute_quote(&catalog, &QuoteRequest::new("basic", page_count)).unwrap_err();
            assert_eq!(err.kind(), "INVALID_PAGE_COUNT");
        }
    }

    #[test]
    fn test_engine_rejects_invalid_catalog() {
        let mut catalog = fixtures::catalog();
        catalog.packages.clear();
        assert!(PricingEngine::new(catalog).is_err());

        // A sub-grosz page price would make the rounded total drift from the lines
        let mut catalog = fixtures::catalog();
        catalog.extra_page_price = dec!(0.005);
        assert!(matches!(
            PricingEngine::new(catalog),
            Err(CatalogError::TooPrecise { .. })
        ));

        let engine = PricingEngine::new(fixtures::catalog()).unwrap();
        let quote = engine.quote(&QuoteRequest::new("basic", 7).with_add_on("seo")).unwrap();
        assert_eq!(quote.grand_total(), dec!(2700));
    }
}
