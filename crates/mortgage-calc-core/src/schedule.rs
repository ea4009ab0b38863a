//! Month-by-month amortisation schedule for the level payment.
//!
//! Payments and interest are rounded to cents each month; the final row
//! absorbs the accumulated rounding so the balance closes at zero.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::MortgageError;
use crate::format::round_cents;
use crate::inputs::LoanInputs;
use crate::payment::{level_payment, monthly_rate, payment_count, validate_down_payment};
use crate::types::{with_metadata, ComputationOutput, Money};
use crate::MortgageResult;

/// Upper bound on schedule length (100 years of monthly payments).
const MAX_SCHEDULE_MONTHS: u32 = 1200;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmortizationRow {
    pub month: u32,
    pub payment: Money,
    pub interest: Money,
    pub principal: Money,
    pub balance: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationSchedule {
    pub loan_amount: Money,
    /// Level principal-and-interest payment, rounded to cents.
    pub monthly_payment: Money,
    pub num_payments: u32,
    pub total_interest: Money,
    pub total_principal: Money,
    pub total_paid: Money,
    pub rows: Vec<AmortizationRow>,
}

/// Build the amortisation schedule for `inputs`.
///
/// Requires a whole, positive number of monthly payments no greater than
/// 1200, and a down payment no larger than the home price.
pub fn amortization_schedule(
    inputs: &LoanInputs,
) -> MortgageResult<ComputationOutput<AmortizationSchedule>> {
    let start = Instant::now();
    validate_down_payment(inputs)?;
    let num_payments = validate_payment_count(inputs.loan_term_years)?;

    let mut warnings = Vec::new();
    let loan_amount = inputs.home_price.saturating_sub(inputs.down_payment);
    let rate = monthly_rate(inputs.interest_rate_annual_percent);

    let (raw_payment, fallback) = level_payment(loan_amount, rate, Decimal::from(num_payments));
    if let Some(fb) = fallback {
        warnings.push(fb.describe().to_string());
    }
    let monthly_payment = round_cents(raw_payment);

    let mut rows = Vec::with_capacity(num_payments as usize);
    let mut balance = loan_amount;
    let mut total_interest = Decimal::ZERO;
    let mut total_principal = Decimal::ZERO;

    for month in 1..=num_payments {
        let interest = round_cents(balance.checked_mul(rate).ok_or_else(schedule_overflow)?);
        let mut principal = monthly_payment
            .checked_sub(interest)
            .ok_or_else(schedule_overflow)?;
        if month == num_payments || principal > balance {
            principal = balance;
        }
        let payment = principal.checked_add(interest).ok_or_else(schedule_overflow)?;
        balance = balance.checked_sub(principal).ok_or_else(schedule_overflow)?;

        total_interest = total_interest
            .checked_add(interest)
            .ok_or_else(schedule_overflow)?;
        total_principal = total_principal
            .checked_add(principal)
            .ok_or_else(schedule_overflow)?;
        rows.push(AmortizationRow {
            month,
            payment,
            interest,
            principal,
            balance,
        });
    }

    if let Some(last) = rows.last() {
        if last.payment.saturating_sub(monthly_payment).abs() > dec!(1) {
            warnings.push(format!(
                "Final payment of {} differs from the level payment of {}",
                last.payment, monthly_payment
            ));
        }
    }

    let schedule = AmortizationSchedule {
        loan_amount,
        monthly_payment,
        num_payments,
        total_interest,
        total_principal,
        total_paid: total_interest
            .checked_add(total_principal)
            .ok_or_else(schedule_overflow)?,
        rows,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Level-payment amortisation schedule (monthly, cent-rounded)",
        inputs,
        warnings,
        elapsed,
        schedule,
    ))
}

fn schedule_overflow() -> MortgageError {
    MortgageError::InvalidInput {
        field: "interest_rate".into(),
        reason: "Loan amount and interest rate are too large to amortise".into(),
    }
}

fn validate_payment_count(term_years: Decimal) -> MortgageResult<u32> {
    let count = payment_count(term_years);
    if count <= Decimal::ZERO {
        return Err(MortgageError::InvalidInput {
            field: "loan_term_years".into(),
            reason: "Loan term must be greater than zero".into(),
        });
    }
    if count.fract() != Decimal::ZERO {
        return Err(MortgageError::InvalidInput {
            field: "loan_term_years".into(),
            reason: format!("Loan term of {term_years} years is not a whole number of months"),
        });
    }
    if count > Decimal::from(MAX_SCHEDULE_MONTHS) {
        return Err(MortgageError::InvalidInput {
            field: "loan_term_years".into(),
            reason: format!("Schedules are limited to {MAX_SCHEDULE_MONTHS} monthly payments"),
        });
    }
    count.to_u32().ok_or_else(|| MortgageError::InvalidInput {
        field: "loan_term_years".into(),
        reason: format!("Loan term of {term_years} years is out of range"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn loan(price: Decimal, down: Decimal, years: Decimal, rate: Decimal) -> LoanInputs {
        LoanInputs {
            home_price: price,
            down_payment: down,
            loan_term_years: years,
            interest_rate_annual_percent: rate,
            ..LoanInputs::default()
        }
    }

    #[test]
    fn test_thirty_year_schedule_closes_at_zero() {
        let out = amortization_schedule(&loan(dec!(300000), dec!(60000), dec!(30), dec!(6)))
            .unwrap();
        let s = &out.result;
        assert_eq!(s.num_payments, 360);
        assert_eq!(s.rows.len(), 360);
        assert_eq!(s.monthly_payment, dec!(1438.92));
        assert_eq!(s.rows.last().unwrap().balance, Decimal::ZERO);
        assert_eq!(s.total_principal, dec!(240000));
        assert_eq!(s.total_paid, s.total_interest + s.total_principal);
    }

    #[test]
    fn test_first_row_split() {
        let out = amortization_schedule(&loan(dec!(300000), dec!(60000), dec!(30), dec!(6)))
            .unwrap();
        let first = &out.result.rows[0];
        // 240000 * 0.005 = 1200 interest
        assert_eq!(first.month, 1);
        assert_eq!(first.interest, dec!(1200));
        assert_eq!(first.principal, dec!(238.92));
        assert_eq!(first.balance, dec!(239761.08));
    }

    #[test]
    fn test_zero_rate_schedule() {
        let out =
            amortization_schedule(&loan(dec!(12000), Decimal::ZERO, dec!(1), Decimal::ZERO))
                .unwrap();
        let s = &out.result;
        assert_eq!(s.monthly_payment, dec!(1000));
        assert_eq!(s.total_interest, Decimal::ZERO);
        assert!(s.rows.iter().all(|r| r.payment == dec!(1000)));
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_rejects_zero_term() {
        let err = amortization_schedule(&loan(dec!(100000), Decimal::ZERO, Decimal::ZERO, dec!(5)))
            .unwrap_err();
        assert!(matches!(err, MortgageError::InvalidInput { ref field, .. } if field == "loan_term_years"));
    }

    #[test]
    fn test_rejects_partial_month_term() {
        let err = amortization_schedule(&loan(dec!(100000), Decimal::ZERO, dec!(0.01), dec!(5)))
            .unwrap_err();
        assert!(matches!(err, MortgageError::InvalidInput { .. }));
    }

    #[test]
    fn test_accepts_half_year_term() {
        let out = amortization_schedule(&loan(dec!(6000), Decimal::ZERO, dec!(0.5), dec!(12)))
            .unwrap();
        assert_eq!(out.result.num_payments, 6);
    }

    #[test]
    fn test_rejects_down_payment_over_price() {
        let err = amortization_schedule(&loan(dec!(100000), dec!(150000), dec!(30), dec!(5)))
            .unwrap_err();
        assert!(matches!(err, MortgageError::DownPaymentExceedsPrice { .. }));
    }

    #[test]
    fn test_interest_total_beyond_decimal_range_is_rejected() {
        // 50%/month on 1e27 accrues ~6e29 of interest over 1200 months
        let price = Decimal::from_scientific("1e27").unwrap();
        let err = amortization_schedule(&loan(price, Decimal::ZERO, dec!(100), dec!(600)))
            .unwrap_err();
        assert!(
            matches!(err, MortgageError::InvalidInput { ref field, .. } if field == "interest_rate"),
            "got {err:?}"
        );
    }

    #[test]
    fn test_validate_payment_count_bounds() {
        assert_eq!(validate_payment_count(dec!(100)).unwrap(), 1200);
        assert_eq!(validate_payment_count(dec!(30.0)).unwrap(), 360);
        assert!(validate_payment_count(dec!(100.25)).is_err());
    }
}
