//! Monthly payment calculation: level-payment amortisation plus escrowed
//! property tax and home insurance.
//!
//! The amortisation formula is undefined when the rate or the number of
//! payments is zero; each degenerate case resolves to an explicit
//! [`PaymentFallback`] instead of propagating a non-numeric value.

use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use crate::error::MortgageError;
use crate::inputs::LoanInputs;
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::MortgageResult;

const MONTHS_PER_YEAR: Decimal = dec!(12);

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// Monthly payment breakdown. Recomputed on every edit, never stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentBreakdown {
    /// Level monthly payment covering principal and interest.
    pub monthly_principal_and_interest: Money,
    /// Property tax and home insurance, each spread over 12 months.
    pub monthly_tax_and_insurance: Money,
    /// Sum of the two components.
    pub total_monthly_payment: Money,
}

/// Explicit resolution of a case where the amortisation formula is undefined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentFallback {
    /// Zero (or negative) number of payments: principal & interest is 0.
    NoPayments,
    /// Zero interest: principal is repaid in equal instalments.
    ZeroRate,
    /// `(1+r)^n` exceeds Decimal range: payment converges to interest-only.
    GrowthOverflow,
    /// Formula not computable for these inputs: principal & interest is 0.
    Undefined,
}

impl PaymentFallback {
    pub fn describe(self) -> &'static str {
        match self {
            PaymentFallback::NoPayments => {
                "Loan term is zero; principal and interest set to 0"
            }
            PaymentFallback::ZeroRate => {
                "Interest rate is zero; principal divided evenly across payments"
            }
            PaymentFallback::GrowthOverflow => {
                "Compounding factor exceeds decimal range; payment approximated as interest-only"
            }
            PaymentFallback::Undefined => {
                "Amortisation formula undefined for these inputs; principal and interest set to 0"
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Compute the monthly payment breakdown for `inputs`.
///
/// Fails only when the down payment exceeds the home price.
pub fn calculate_payment(inputs: &LoanInputs) -> MortgageResult<PaymentBreakdown> {
    compute_breakdown(inputs).map(|(breakdown, _)| breakdown)
}

/// [`calculate_payment`] wrapped in the standard output envelope, with a
/// warning for every fallback taken.
pub fn analyze_payment(inputs: &LoanInputs) -> MortgageResult<ComputationOutput<PaymentBreakdown>> {
    let start = Instant::now();
    let (breakdown, fallback) = compute_breakdown(inputs)?;

    let mut warnings = Vec::new();
    if let Some(fb) = fallback {
        warnings.push(fb.describe().to_string());
    }
    if inputs.loan_term_years.fract() != Decimal::ZERO {
        warnings.push(format!(
            "Loan term of {} years is not a whole number of years",
            inputs.loan_term_years
        ));
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Level-payment amortisation with monthly escrow",
        inputs,
        warnings,
        elapsed,
        breakdown,
    ))
}

/// Annual percentage (6 = 6%) to monthly decimal rate (0.005).
pub fn monthly_rate(annual_percent: Decimal) -> Rate {
    annual_percent / dec!(100) / MONTHS_PER_YEAR
}

/// Loan term in years to number of monthly payments.
pub fn payment_count(term_years: Decimal) -> Decimal {
    term_years.saturating_mul(MONTHS_PER_YEAR)
}

/// Level payment that amortises `principal` over `num_payments` at `rate`
/// per period, together with the fallback used, if any.
pub fn level_payment(
    principal: Money,
    rate: Rate,
    num_payments: Decimal,
) -> (Money, Option<PaymentFallback>) {
    if num_payments <= Decimal::ZERO {
        return (Decimal::ZERO, Some(PaymentFallback::NoPayments));
    }
    if rate.is_zero() {
        return match principal.checked_div(num_payments) {
            Some(p) => (p, Some(PaymentFallback::ZeroRate)),
            None => (Decimal::ZERO, Some(PaymentFallback::Undefined)),
        };
    }

    let base = Decimal::ONE + rate;
    if base <= Decimal::ZERO && !num_payments.fract().is_zero() {
        // no real power of a non-positive base for a fractional exponent
        return (Decimal::ZERO, Some(PaymentFallback::Undefined));
    }

    let growth = match base.checked_powd(num_payments) {
        Some(g) => g,
        None if rate > Decimal::ZERO => {
            // lim n→∞ of r(1+r)^n / ((1+r)^n − 1) is r
            return match principal.checked_mul(rate) {
                Some(p) => (p, Some(PaymentFallback::GrowthOverflow)),
                None => (Decimal::ZERO, Some(PaymentFallback::Undefined)),
            };
        }
        None => return (Decimal::ZERO, Some(PaymentFallback::Undefined)),
    };

    let denom = match growth.checked_sub(Decimal::ONE) {
        Some(d) if !d.is_zero() => d,
        _ => return (Decimal::ZERO, Some(PaymentFallback::Undefined)),
    };

    // growth / denom first keeps the intermediate near 1 for long terms
    match principal
        .checked_mul(rate)
        .and_then(|p| growth.checked_div(denom).and_then(|f| p.checked_mul(f)))
    {
        Some(payment) => (payment, None),
        None => (Decimal::ZERO, Some(PaymentFallback::Undefined)),
    }
}

// ---------------------------------------------------------------------------
// Internals
// ---------------------------------------------------------------------------

fn compute_breakdown(
    inputs: &LoanInputs,
) -> MortgageResult<(PaymentBreakdown, Option<PaymentFallback>)> {
    validate_down_payment(inputs)?;

    let loan_amount = inputs.home_price.saturating_sub(inputs.down_payment);
    let rate = monthly_rate(inputs.interest_rate_annual_percent);
    let num_payments = payment_count(inputs.loan_term_years);

    let (principal_and_interest, fallback) = level_payment(loan_amount, rate, num_payments);

    let monthly_tax_and_insurance = (inputs.property_tax_annual / MONTHS_PER_YEAR)
        .saturating_add(inputs.home_insurance_annual / MONTHS_PER_YEAR);
    let total_monthly_payment = principal_and_interest.saturating_add(monthly_tax_and_insurance);

    debug!(
        %loan_amount,
        monthly_rate = %rate,
        %num_payments,
        %total_monthly_payment,
        fallback = ?fallback,
        "computed monthly payment"
    );

    Ok((
        PaymentBreakdown {
            monthly_principal_and_interest: principal_and_interest,
            monthly_tax_and_insurance,
            total_monthly_payment,
        },
        fallback,
    ))
}

pub(crate) fn validate_down_payment(inputs: &LoanInputs) -> MortgageResult<()> {
    if inputs.down_payment > inputs.home_price {
        debug!(
            down_payment = %inputs.down_payment,
            home_price = %inputs.home_price,
            "down payment exceeds home price"
        );
        return Err(MortgageError::DownPaymentExceedsPrice {
            down_payment: inputs.down_payment,
            home_price: inputs.home_price,
        });
    }
    Ok(())
}
