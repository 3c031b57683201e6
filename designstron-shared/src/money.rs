use rust_decimal::Decimal;

/// Largest precision accepted for a currency (fractional digits).
pub const MAX_PRECISION: u32 = 6;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoneyError {
    #[error("Amount {amount} has more than {precision} fractional digits")]
    TooPrecise { amount: Decimal, precision: u32 },

    #[error("Amount {0} does not fit into minor units")]
    Overflow(Decimal),

    #[error("Currency precision {0} is not supported")]
    UnsupportedPrecision(u32),
}

/// Convert a major-unit amount (e.g. 2700.00 PLN) into integer minor units
/// (270000 grosze), the shape payment gateways expect.
///
/// Amounts carrying more fractional digits than `precision` are rejected
/// instead of being rounded: callers hand in already-rounded quote totals.
pub fn to_minor_units(amount: Decimal, precision: u32) -> Result<i64, MoneyError> {
    if precision > MAX_PRECISION {
        return Err(MoneyError::UnsupportedPrecision(precision));
    }

    let normalized = amount.normalize();
    if normalized.scale() > precision {
        return Err(MoneyError::TooPrecise { amount, precision });
    }

    let factor = Decimal::from(10i64.pow(precision));
    let minor = amount
        .checked_mul(factor)
        .ok_or(MoneyError::Overflow(amount))?;

    i64::try_from(minor.trunc()).map_err(|_| MoneyError::Overflow(amount))
}

/// Inverse of [`to_minor_units`].
pub fn from_minor_units(minor: i64, precision: u32) -> Decimal {
    Decimal::new(minor, precision.min(MAX_PRECISION))
}
