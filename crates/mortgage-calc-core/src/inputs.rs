//! Loan input state and the down-payment / percentage synchronisation rules.
//!
//! `LoanInputs` is an explicit value object: every field edit goes through a
//! setter, and the two synced fields (`down_payment`, `down_payment_percent`)
//! re-derive each other on edit. Text coming from a form is parsed with
//! [`parse_amount`], which maps empty or non-numeric text to zero.

use std::fmt;
use std::str::FromStr;

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::MortgageError;
use crate::format::round_cents;
use crate::types::{Money, Percent, Years};

// ---------------------------------------------------------------------------
// Fields
// ---------------------------------------------------------------------------

/// One editable field of the loan form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanField {
    #[serde(alias = "homePrice")]
    HomePrice,
    #[serde(alias = "downPayment")]
    DownPayment,
    #[serde(alias = "downPaymentPerc", alias = "downPaymentPercent")]
    DownPaymentPercent,
    #[serde(alias = "loanTerm", alias = "loanTermYears")]
    LoanTermYears,
    #[serde(alias = "interestRate")]
    InterestRate,
    #[serde(alias = "propertyTax")]
    PropertyTax,
    #[serde(alias = "homeInsurance")]
    HomeInsurance,
}

impl LoanField {
    /// Form order.
    pub const ALL: [LoanField; 7] = [
        LoanField::HomePrice,
        LoanField::DownPayment,
        LoanField::DownPaymentPercent,
        LoanField::LoanTermYears,
        LoanField::InterestRate,
        LoanField::PropertyTax,
        LoanField::HomeInsurance,
    ];

    pub fn name(self) -> &'static str {
        match self {
            LoanField::HomePrice => "home_price",
            LoanField::DownPayment => "down_payment",
            LoanField::DownPaymentPercent => "down_payment_percent",
            LoanField::LoanTermYears => "loan_term_years",
            LoanField::InterestRate => "interest_rate",
            LoanField::PropertyTax => "property_tax",
            LoanField::HomeInsurance => "home_insurance",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for LoanField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LoanField {
    type Err = MortgageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalised = s.trim().to_ascii_lowercase().replace('-', "_");
        LoanField::ALL
            .into_iter()
            .find(|f| f.name() == normalised)
            .or(match normalised.as_str() {
                "homeprice" => Some(LoanField::HomePrice),
                "downpayment" => Some(LoanField::DownPayment),
                "downpaymentperc" | "downpaymentpercent" | "down_payment_perc" => {
                    Some(LoanField::DownPaymentPercent)
                }
                "loan_term" | "loanterm" | "loantermyears" => Some(LoanField::LoanTermYears),
                "interestrate" => Some(LoanField::InterestRate),
                "propertytax" => Some(LoanField::PropertyTax),
                "homeinsurance" => Some(LoanField::HomeInsurance),
                _ => None,
            })
            .ok_or_else(|| MortgageError::InvalidInput {
                field: "field".into(),
                reason: format!("Unknown loan field '{s}'"),
            })
    }
}

/// Number of form fields; sized for per-field arrays.
pub(crate) const FIELD_COUNT: usize = LoanField::ALL.len();

pub(crate) fn field_slot(field: LoanField) -> usize {
    field.index()
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse form text into a Decimal, treating empty or non-numeric text as zero.
///
/// Accepts plain (`"300000"`, `"6.5"`) and scientific (`"3e5"`) notation.
/// Numbers beyond Decimal range saturate to `Decimal::MAX` / `Decimal::MIN`;
/// numbers too small to represent become zero.
pub fn parse_amount(text: &str) -> Decimal {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Decimal::ZERO;
    }
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .unwrap_or_else(|_| out_of_range_amount(trimmed))
}

fn out_of_range_amount(text: &str) -> Decimal {
    match text.parse::<f64>() {
        Ok(v) if v.is_finite() => match Decimal::from_f64(v) {
            Some(d) => d,
            None if v.abs() < 1.0 => Decimal::ZERO,
            None if v < 0.0 => Decimal::MIN,
            None => Decimal::MAX,
        },
        // non-numeric, "inf", "NaN"
        _ => Decimal::ZERO,
    }
}

// ---------------------------------------------------------------------------
// LoanInputs
// ---------------------------------------------------------------------------

/// The loan form's numeric state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanInputs {
    /// Purchase price of the home.
    #[serde(default)]
    pub home_price: Money,
    /// Cash paid up front.
    #[serde(default)]
    pub down_payment: Money,
    /// Down payment as a percentage of home price (20 = 20%). Derived.
    #[serde(default)]
    pub down_payment_percent: Percent,
    /// Loan term in years.
    #[serde(default)]
    pub loan_term_years: Years,
    /// Annual interest rate as a percentage (6 = 6%).
    #[serde(default)]
    pub interest_rate_annual_percent: Percent,
    /// Annual property tax.
    #[serde(default)]
    pub property_tax_annual: Money,
    /// Annual home insurance premium.
    #[serde(default)]
    pub home_insurance_annual: Money,
}

impl LoanInputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Home price edits do not re-sync the down payment or its percentage.
    pub fn set_home_price(&mut self, value: Money) {
        self.home_price = value;
    }

    /// Sets the down payment and re-derives the percentage, rounded to 2 dp.
    /// A zero home price (or a ratio outside Decimal range) yields zero.
    pub fn set_down_payment(&mut self, value: Money) {
        self.down_payment = value;
        self.down_payment_percent = value
            .checked_div(self.home_price)
            .and_then(|ratio| ratio.checked_mul(dec!(100)))
            .map(round_cents)
            .unwrap_or(Decimal::ZERO);
        debug!(
            down_payment = %self.down_payment,
            down_payment_percent = %self.down_payment_percent,
            "derived down payment percentage"
        );
    }

    /// Sets the percentage and re-derives the down payment, rounded to 2 dp.
    pub fn set_down_payment_percent(&mut self, value: Percent) {
        self.down_payment_percent = value;
        self.down_payment = round_cents((value / dec!(100)).saturating_mul(self.home_price));
        debug!(
            down_payment = %self.down_payment,
            down_payment_percent = %self.down_payment_percent,
            "derived down payment amount"
        );
    }

    pub fn set_loan_term_years(&mut self, value: Years) {
        self.loan_term_years = value;
    }

    pub fn set_interest_rate(&mut self, value: Percent) {
        self.interest_rate_annual_percent = value;
    }

    pub fn set_property_tax(&mut self, value: Money) {
        self.property_tax_annual = value;
    }

    pub fn set_home_insurance(&mut self, value: Money) {
        self.home_insurance_annual = value;
    }

    /// Field-keyed setter; runs the same cross-field rules as the named setters.
    pub fn set(&mut self, field: LoanField, value: Decimal) {
        match field {
            LoanField::HomePrice => self.set_home_price(value),
            LoanField::DownPayment => self.set_down_payment(value),
            LoanField::DownPaymentPercent => self.set_down_payment_percent(value),
            LoanField::LoanTermYears => self.set_loan_term_years(value),
            LoanField::InterestRate => self.set_interest_rate(value),
            LoanField::PropertyTax => self.set_property_tax(value),
            LoanField::HomeInsurance => self.set_home_insurance(value),
        }
    }

    pub fn get(&self, field: LoanField) -> Decimal {
        match field {
            LoanField::HomePrice => self.home_price,
            LoanField::DownPayment => self.down_payment,
            LoanField::DownPaymentPercent => self.down_payment_percent,
            LoanField::LoanTermYears => self.loan_term_years,
            LoanField::InterestRate => self.interest_rate_annual_percent,
            LoanField::PropertyTax => self.property_tax_annual,
            LoanField::HomeInsurance => self.home_insurance_annual,
        }
    }

    /// Parse `text` with [`parse_amount`] and apply it to `field`.
    /// Returns the value that was stored.
    pub fn apply_text(&mut self, field: LoanField, text: &str) -> Decimal {
        let value = parse_amount(text);
        self.set(field, value);
        value
    }

    /// The field whose value is re-derived when `field` is edited, if any.
    pub fn synced_counterpart(field: LoanField) -> Option<LoanField> {
        match field {
            LoanField::DownPayment => Some(LoanField::DownPaymentPercent),
            LoanField::DownPaymentPercent => Some(LoanField::DownPayment),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn priced(home_price: Decimal) -> LoanInputs {
        let mut inputs = LoanInputs::new();
        inputs.set_home_price(home_price);
        inputs
    }

    #[test]
    fn test_default_is_all_zero() {
        let inputs = LoanInputs::default();
        for field in LoanField::ALL {
            assert_eq!(inputs.get(field), Decimal::ZERO, "{field}");
        }
    }

    #[test]
    fn test_parse_amount_plain_and_scientific() {
        assert_eq!(parse_amount("300000"), dec!(300000));
        assert_eq!(parse_amount(" 6.5 "), dec!(6.5));
        assert_eq!(parse_amount("3e5"), dec!(300000));
    }

    #[test]
    fn test_parse_amount_invalid_is_zero() {
        assert_eq!(parse_amount(""), Decimal::ZERO);
        assert_eq!(parse_amount("   "), Decimal::ZERO);
        assert_eq!(parse_amount("abc"), Decimal::ZERO);
        assert_eq!(parse_amount("12,000"), Decimal::ZERO);
        assert_eq!(parse_amount("inf"), Decimal::ZERO);
        assert_eq!(parse_amount("NaN"), Decimal::ZERO);
    }

    #[test]
    fn test_parse_amount_saturates_beyond_decimal_range() {
        assert_eq!(parse_amount("1e30"), Decimal::MAX);
        assert_eq!(parse_amount("-1e30"), Decimal::MIN);
        assert_eq!(parse_amount("12345678901234567890123456789012"), Decimal::MAX);
        assert_eq!(parse_amount("1e-40"), Decimal::ZERO);
    }

    #[test]
    fn test_down_payment_edit_derives_percent() {
        let mut inputs = priced(dec!(300000));
        inputs.set_down_payment(dec!(60000));
        assert_eq!(inputs.down_payment_percent, dec!(20));
    }

    #[test]
    fn test_down_payment_percent_rounded_to_two_places() {
        let mut inputs = priced(dec!(300000));
        inputs.set_down_payment(dec!(1000));
        // 1000 / 300000 * 100 = 0.3333...
        assert_eq!(inputs.down_payment_percent, dec!(0.33));
    }

    #[test]
    fn test_percent_edit_derives_down_payment() {
        let mut inputs = priced(dec!(250000));
        inputs.set_down_payment_percent(dec!(12.5));
        assert_eq!(inputs.down_payment, dec!(31250));
    }

    #[test]
    fn test_percent_edit_rounds_down_payment() {
        let mut inputs = priced(dec!(123456.78));
        inputs.set_down_payment_percent(dec!(3.33));
        // 0.0333 * 123456.78 = 4111.110774
        assert_eq!(inputs.down_payment, dec!(4111.11));
    }

    #[test]
    fn test_zero_home_price_percent_falls_back_to_zero() {
        let mut inputs = LoanInputs::new();
        inputs.set_down_payment(Decimal::ZERO);
        assert_eq!(inputs.down_payment_percent, Decimal::ZERO);

        inputs.set_down_payment(dec!(5000));
        assert_eq!(inputs.down_payment_percent, Decimal::ZERO);
        assert_eq!(inputs.down_payment, dec!(5000));
    }

    #[test]
    fn test_home_price_edit_does_not_resync() {
        let mut inputs = priced(dec!(200000));
        inputs.set_down_payment(dec!(40000));
        assert_eq!(inputs.down_payment_percent, dec!(20));

        inputs.set_home_price(dec!(400000));
        assert_eq!(inputs.down_payment, dec!(40000));
        assert_eq!(inputs.down_payment_percent, dec!(20));
    }

    #[test]
    fn test_last_writer_wins() {
        let mut inputs = priced(dec!(100000));
        inputs.set_down_payment(dec!(10000));
        inputs.set_down_payment_percent(dec!(25));
        assert_eq!(inputs.down_payment, dec!(25000));
        inputs.set_down_payment(dec!(5000));
        assert_eq!(inputs.down_payment_percent, dec!(5));
    }

    #[test]
    fn test_round_trip_within_rounding() {
        for (price, down) in [
            (dec!(300000), dec!(60000)),
            (dec!(487250), dec!(33333.33)),
            (dec!(99999.99), dec!(1234.56)),
            (dec!(1000000), dec!(7)),
        ] {
            let mut inputs = priced(price);
            inputs.set_down_payment(down);
            let pct = inputs.down_payment_percent;
            inputs.set_down_payment_percent(pct);
            // 2-dp percentage carries at most 0.005% of price in error
            let tolerance = price * dec!(0.00005) + dec!(0.01);
            assert!(
                (inputs.down_payment - down).abs() <= tolerance,
                "price {price}, down {down}: got {}",
                inputs.down_payment
            );
        }
    }

    #[test]
    fn test_apply_text_coerces_and_syncs() {
        let mut inputs = priced(dec!(500000));
        let stored = inputs.apply_text(LoanField::DownPaymentPercent, "10");
        assert_eq!(stored, dec!(10));
        assert_eq!(inputs.down_payment, dec!(50000));

        inputs.apply_text(LoanField::InterestRate, "not a number");
        assert_eq!(inputs.interest_rate_annual_percent, Decimal::ZERO);
    }

    #[test]
    fn test_field_from_str_accepts_form_names() {
        assert_eq!("home_price".parse::<LoanField>().unwrap(), LoanField::HomePrice);
        assert_eq!("homePrice".parse::<LoanField>().unwrap(), LoanField::HomePrice);
        assert_eq!(
            "downPaymentPerc".parse::<LoanField>().unwrap(),
            LoanField::DownPaymentPercent
        );
        assert_eq!("loan-term".parse::<LoanField>().unwrap(), LoanField::LoanTermYears);
        assert!("hoa".parse::<LoanField>().is_err());
    }

    #[test]
    fn test_field_serde_aliases() {
        let f: LoanField = serde_json::from_str("\"homeInsurance\"").unwrap();
        assert_eq!(f, LoanField::HomeInsurance);
        let f: LoanField = serde_json::from_str("\"down_payment_percent\"").unwrap();
        assert_eq!(f, LoanField::DownPaymentPercent);
    }
}
