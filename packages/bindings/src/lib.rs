use napi::Result as NapiResult;
use napi_derive::napi;

use mortgage_calc_core::session::{CalculatorSession, FieldEdit};
use mortgage_calc_core::LoanInputs;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Calculator
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_payment(input_json: String) -> NapiResult<String> {
    let input: LoanInputs = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = mortgage_calc_core::payment::analyze_payment(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn amortization_schedule(input_json: String) -> NapiResult<String> {
    let input: LoanInputs = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        mortgage_calc_core::schedule::amortization_schedule(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Form session
// ---------------------------------------------------------------------------

/// Replay `[{field, value}, ...]` edits on a fresh form and return the
/// resulting snapshot. A rejected edit is reported in the snapshot's
/// `error` field, not as a thrown error.
#[napi]
pub fn apply_edits(edits_json: String) -> NapiResult<String> {
    let edits: Vec<FieldEdit> = serde_json::from_str(&edits_json).map_err(to_napi_error)?;
    let mut session = CalculatorSession::new();
    session.apply_edits(&edits);
    serde_json::to_string(&session.snapshot()).map_err(to_napi_error)
}

#[napi]
pub fn format_currency(amount: String) -> String {
    mortgage_calc_core::format::format_currency(mortgage_calc_core::parse_amount(&amount))
}
