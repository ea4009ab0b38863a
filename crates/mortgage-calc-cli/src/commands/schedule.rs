use clap::Args;
use serde_json::Value;

use mortgage_calc_core::schedule;

use crate::commands::payment::{resolve_inputs, LoanArgs};

/// Arguments for the amortisation schedule
#[derive(Args)]
pub struct ScheduleArgs {
    #[command(flatten)]
    pub loan: LoanArgs,

    /// Only emit the first N months
    #[arg(long)]
    pub months: Option<usize>,
}

pub fn run_schedule(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let inputs = resolve_inputs(&args.loan)?;
    let mut result = schedule::amortization_schedule(&inputs)?;
    if let Some(n) = args.months {
        result.result.rows.truncate(n);
    }
    Ok(serde_json::to_value(result)?)
}
