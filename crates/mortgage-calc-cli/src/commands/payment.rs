use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::debug;

use mortgage_calc_core::payment;
use mortgage_calc_core::LoanInputs;

use crate::input;

/// Loan parameters shared by `payment` and `schedule`
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct LoanArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Home price
    #[arg(long)]
    pub home_price: Option<Decimal>,

    /// Down payment amount
    #[arg(long, conflicts_with = "down_payment_percent")]
    pub down_payment: Option<Decimal>,

    /// Down payment as a percentage of home price (20 = 20%)
    #[arg(long, alias = "down-pct")]
    pub down_payment_percent: Option<Decimal>,

    /// Loan term in years
    #[arg(long, alias = "term")]
    pub loan_term_years: Option<Decimal>,

    /// Annual interest rate as a percentage (6 = 6%)
    #[arg(long, alias = "rate")]
    pub interest_rate: Option<Decimal>,

    /// Annual property tax
    #[arg(long)]
    pub property_tax: Option<Decimal>,

    /// Annual home insurance premium
    #[arg(long)]
    pub home_insurance: Option<Decimal>,
}

/// Arguments for the monthly payment breakdown
#[derive(Args)]
pub struct PaymentArgs {
    #[command(flatten)]
    pub loan: LoanArgs,
}

/// Resolve loan inputs from a JSON file, piped stdin, or flags, in that order.
pub fn resolve_inputs(args: &LoanArgs) -> Result<LoanInputs, Box<dyn std::error::Error>> {
    if let Some(ref path) = args.input {
        debug!(path = %path, "reading loan inputs from file");
        return input::file::read_json(path);
    }
    if let Some(data) = input::stdin::read_stdin()? {
        debug!("reading loan inputs from stdin");
        return Ok(serde_json::from_value(data)?);
    }

    Ok(inputs_from_flags(args))
}

/// Build inputs from individual flags. Missing flags count as zero.
fn inputs_from_flags(args: &LoanArgs) -> LoanInputs {
    let mut inputs = LoanInputs::new();
    inputs.set_home_price(args.home_price.unwrap_or_default());
    if let Some(pct) = args.down_payment_percent {
        inputs.set_down_payment_percent(pct);
    } else {
        inputs.set_down_payment(args.down_payment.unwrap_or_default());
    }
    inputs.set_loan_term_years(args.loan_term_years.unwrap_or_default());
    inputs.set_interest_rate(args.interest_rate.unwrap_or_default());
    inputs.set_property_tax(args.property_tax.unwrap_or_default());
    inputs.set_home_insurance(args.home_insurance.unwrap_or_default());
    inputs
}

pub fn run_payment(args: PaymentArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let inputs = resolve_inputs(&args.loan)?;
    let result = payment::analyze_payment(&inputs)?;
    Ok(serde_json::to_value(result)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn no_flags() -> LoanArgs {
        LoanArgs {
            input: None,
            home_price: None,
            down_payment: None,
            down_payment_percent: None,
            loan_term_years: None,
            interest_rate: None,
            property_tax: None,
            home_insurance: None,
        }
    }

    #[test]
    fn test_missing_flags_are_zero() {
        assert_eq!(inputs_from_flags(&no_flags()), LoanInputs::default());
    }

    #[test]
    fn test_percent_flag_derives_down_payment() {
        let args = LoanArgs {
            home_price: Some(dec!(400000)),
            down_payment_percent: Some(dec!(25)),
            ..no_flags()
        };
        let inputs = inputs_from_flags(&args);
        assert_eq!(inputs.down_payment, dec!(100000));
        assert_eq!(inputs.down_payment_percent, dec!(25));
    }

    #[test]
    fn test_amount_flag_derives_percent() {
        let args = LoanArgs {
            home_price: Some(dec!(300000)),
            down_payment: Some(dec!(60000)),
            ..no_flags()
        };
        assert_eq!(inputs_from_flags(&args).down_payment_percent, dec!(20));
    }
}
