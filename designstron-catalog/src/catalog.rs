use designstron_shared::money::MAX_PRECISION;
use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Currency the catalog is priced in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencySettings {
    /// ISO 4217 code, e.g. "PLN"
    pub code: String,

    /// Fractional digits used when rounding hosting lines and totals
    pub precision: u32,
}

impl Default for CurrencySettings {
    fn default() -> Self {
        Self {
            code: "PLN".to_string(),
            precision: 2,
        }
    }
}

/// A website package (e.g. "basic", "professional", "premium")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Package {
    pub name: String,
    pub base_price: Decimal,
    pub included_pages: u32,
    #[serde(default)]
    pub description: Option<String>,
}

/// A flat, one-time add-on service (SEO, blog, shop module...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddOn {
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostingTier {
    pub name: String,
    pub monthly_price: Decimal,
}

/// Subscription-length discount: periods of at least `min_months` get
/// `fraction` off the hosting price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiscountBand {
    pub min_months: u32,
    pub fraction: Decimal,
}

/// Static price table the quote calculator consumes.
///
/// Loaded once at startup and never mutated; call [`PriceCatalog::validate`]
/// before handing it to the calculator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceCatalog {
    #[serde(default)]
    pub currency: CurrencySettings,
    pub packages: IndexMap<String, Package>,
    pub extra_page_price: Decimal,
    #[serde(default)]
    pub add_ons: IndexMap<String, AddOn>,
    #[serde(default)]
    pub hosting_tiers: IndexMap<String, HostingTier>,
    /// Ordered from the longest to the shortest threshold
    #[serde(default)]
    pub hosting_discount_bands: Vec<DiscountBand>,
    #[serde(default)]
    pub ssl_one_time_price: Decimal,
}

impl PriceCatalog {
    /// Check the catalog invariants.
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.packages.is_empty() {
            return Err(CatalogError::EmptyPackages);
        }

        if self.currency.precision > MAX_PRECISION {
            return Err(CatalogError::PrecisionTooLarge(self.currency.precision));
        }

        let precision = self.currency.precision;

        for (id, package) in &self.packages {
            check_price(&format!("package '{}'", id), package.base_price, precision)?;
            if package.included_pages < 1 {
                return Err(CatalogError::NoIncludedPages(id.clone()));
            }
        }

        check_price("extra page", self.extra_page_price, precision)?;
        check_price("SSL certificate", self.ssl_one_time_price, precision)?;

        for (id, add_on) in &self.add_ons {
            check_price(&format!("add-on '{}'", id), add_on.price, precision)?;
        }

        for (id, tier) in &self.hosting_tiers {
            check_price(&format!("hosting tier '{}'", id), tier.monthly_price, precision)?;
        }

        for pair in self.hosting_discount_bands.windows(2) {
            if pair[1].min_months >= pair[0].min_months {
                return Err(CatalogError::BandsNotDecreasing {
                    previous: pair[0].min_months,
                    next: pair[1].min_months,
                });
            }
        }

        for band in &self.hosting_discount_bands {
            if band.fraction < Decimal::ZERO || band.fraction >= Decimal::ONE {
                return Err(CatalogError::FractionOutOfRange {
                    min_months: band.min_months,
                    fraction: band.fraction,
                });
            }
        }

        Ok(())
    }

    /// Discount for a hosting period. Bands are scanned from the longest
    /// threshold down; the first one reached wins.
    pub fn hosting_discount(&self, period_months: u32) -> Decimal {
        self.hosting_discount_bands
            .iter()
            .find(|band| period_months >= band.min_months)
            .map(|band| band.fraction)
            .unwrap_or(Decimal::ZERO)
    }
}

/// Prices must be non-negative and representable in the currency, so that
/// line totals and the grand total add up without rounding.
fn check_price(what: &str, price: Decimal, precision: u32) -> Result<(), CatalogError> {
    if price < Decimal::ZERO {
        return Err(CatalogError::NegativePrice {
            what: what.to_string(),
            price,
        });
    }
    if price.normalize().scale() > precision {
        return Err(CatalogError::TooPrecise {
            what: what.to_string(),
            price,
            precision,
        });
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CatalogError {
    #[error("Catalog defines no packages")]
    EmptyPackages,

    #[error("Negative price for {what}: {price}")]
    NegativePrice { what: String, price: Decimal },

    #[error("Price for {what} has more than {precision} fractional digits: {price}")]
    TooPrecise {
        what: String,
        price: Decimal,
        precision: u32,
    },

    #[error("Package '{0}' must include at least one page")]
    NoIncludedPages(String),

    #[error("Discount bands must be strictly decreasing: {previous} months followed by {next}")]
    BandsNotDecreasing { previous: u32, next: u32 },

    #[error("Discount for {min_months}+ months must be in [0, 1), got {fraction}")]
    FractionOutOfRange { min_months: u32, fraction: Decimal },

    #[error("Currency precision {0} is not supported")]
    PrecisionTooLarge(u32),
}

/// Sample catalog shared by the workspace's tests.
#[cfg(any(test, feature = "test-util"))]
pub mod fixtures {
    use super::*;

    fn price(units: i64, scale: u32) -> Decimal {
        Decimal::new(units, scale)
    }

    /// Basic (1500, 5 pages) and Professional (2500, 10 pages) packages,
    /// extra pages at 200, SEO 800 and Blog 600 add-ons, Basic (19.99) and
    /// Premium (400) hosting with 12/6/3-month bands of 15/10/5 %, SSL 100.
    pub fn catalog() -> PriceCatalog {
        let mut packages = IndexMap::new();
        packages.insert(
            "basic".to_string(),
            Package {
                name: "Basic".to_string(),
                base_price: price(1500, 0),
                included_pages: 5,
                description: None,
            },
        );
        packages.insert(
            "professional".to_string(),
            Package {
                name: "Professional".to_string(),
                base_price: price(2500, 0),
                included_pages: 10,
                description: Some("Business site with CMS".to_string()),
            },
        );

        let mut add_ons = IndexMap::new();
        add_ons.insert(
            "seo".to_string(),
            AddOn {
                name: "SEO".to_string(),
                price: price(800, 0),
                description: None,
            },
        );
        add_ons.insert(
            "blog".to_string(),
            AddOn {
                name: "Blog".to_string(),
                price: price(600, 0),
                description: None,
            },
        );

        let mut hosting_tiers = IndexMap::new();
        hosting_tiers.insert(
            "basic".to_string(),
            HostingTier {
                name: "Basic".to_string(),
                monthly_price: price(1999, 2),
            },
        );
        hosting_tiers.insert(
            "premium".to_string(),
            HostingTier {
                name: "Premium".to_string(),
                monthly_price: price(400, 0),
            },
        );

        PriceCatalog {
            currency: CurrencySettings::default(),
            packages,
            extra_page_price: price(200, 0),
            add_ons,
            hosting_tiers,
            hosting_discount_bands: vec![
                DiscountBand {
                    min_months: 12,
                    fraction: price(15, 2),
                },
                DiscountBand {
                    min_months: 6,
                    fraction: price(10, 2),
                },
                DiscountBand {
                    min_months: 3,
                    fraction: price(5, 2),
                },
            ],
            ssl_one_time_price: price(100, 0),
        }
    }
}
